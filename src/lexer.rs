use crate::source_location::{SourceLocation, SourceSpan};
use crate::token::{Token, TokenKind, TokenValue};
use miette::Diagnostic;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum LexError {
    #[error("unexpected character '{character}' at {span}")]
    #[diagnostic(code(lex::unexpected_character))]
    UnexpectedCharacter {
        character: char,
        #[label("unexpected character")]
        span: SourceSpan,
    },

    #[error("unterminated comment starting at {span}")]
    #[diagnostic(code(lex::unterminated_comment))]
    UnterminatedComment {
        #[label("comment is never closed")]
        span: SourceSpan,
    },

    #[error("integer literal '{lexeme}' is out of range at {span}")]
    #[diagnostic(code(lex::integer_out_of_range))]
    IntegerOutOfRange {
        lexeme: String,
        #[label("does not fit in a 64-bit integer")]
        span: SourceSpan,
    },

    #[error("malformed real literal '{lexeme}' at {span}")]
    #[diagnostic(code(lex::malformed_real))]
    MalformedReal {
        lexeme: String,
        #[label("not a valid real number")]
        span: SourceSpan,
    },
}

impl LexError {
    pub fn span(&self) -> SourceSpan {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedComment { span }
            | LexError::IntegerOutOfRange { span, .. }
            | LexError::MalformedReal { span, .. } => *span,
        }
    }
}

/// Converts source text into tokens on demand.
///
/// `next_token` keeps returning `EOF` once the input is exhausted. The
/// `Iterator` implementation yields a single `EOF` and then stops, which is
/// what callers collecting a token list want.
pub struct Lexer<'a> {
    source: &'a str,
    loc: SourceLocation,
    emitted_eof: bool,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            loc: SourceLocation::new(),
            emitted_eof: false,
            failed: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.loc.offset..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the character after the current one without consuming anything.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current_char()?;
        self.loc.advance(c);
        Some(c)
    }

    fn span_from(&self, start: SourceLocation) -> SourceSpan {
        SourceSpan::new(start, self.loc)
    }

    fn lexeme_from(&self, start: SourceLocation) -> &'a str {
        &self.source[start.offset..self.loc.offset]
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.loc;
        self.advance();
        Token::new(kind, self.lexeme_from(start), self.span_from(start))
    }

    // comments are not nested: the first '}' closes the comment
    fn skip_comment(&mut self) -> Result<(), LexError> {
        let start = self.loc;
        self.advance();
        loop {
            match self.advance() {
                Some('}') => return Ok(()),
                Some(_) => continue,
                None => {
                    let mut brace_end = start;
                    brace_end.advance('{');
                    return Err(LexError::UnterminatedComment {
                        span: SourceSpan::new(start, brace_end),
                    });
                }
            }
        }
    }

    fn consume_digits(&mut self) {
        while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_number(&mut self) -> Result<Token, LexError> {
        let start = self.loc;
        self.consume_digits();

        // a '.' only belongs to the number when a digit follows it
        let is_real = self.current_char() == Some('.')
            && matches!(self.peek(), Some(c) if c.is_ascii_digit());

        if is_real {
            self.advance();
            self.consume_digits();
        }

        let lexeme = self.lexeme_from(start);
        let span = self.span_from(start);

        if is_real {
            let value: f64 = lexeme.parse().map_err(|_| LexError::MalformedReal {
                lexeme: lexeme.to_string(),
                span,
            })?;
            Ok(Token::with_value(TokenKind::RealConst, lexeme, TokenValue::Real(value), span))
        } else {
            let value: i64 = lexeme.parse().map_err(|_| LexError::IntegerOutOfRange {
                lexeme: lexeme.to_string(),
                span,
            })?;
            Ok(Token::with_value(TokenKind::IntegerConst, lexeme, TokenValue::Integer(value), span))
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.loc;
        while matches!(self.current_char(), Some(c) if c.is_ascii_alphanumeric()) {
            self.advance();
        }

        let lexeme = self.lexeme_from(start);
        let kind = TokenKind::from_keyword_lexeme(lexeme).unwrap_or(TokenKind::Id);

        Token::with_value(kind, lexeme, TokenValue::Text(lexeme.to_string()), self.span_from(start))
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        // consume characters until either eof or the next lexeme has been found
        while let Some(c) = self.current_char() {
            let token = match c {
                c if c.is_whitespace() => {
                    self.advance();
                    continue;
                }
                '{' => {
                    self.skip_comment()?;
                    continue;
                }

                ':' if self.peek() == Some('=') => {
                    let start = self.loc;
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::Assign, ":=", self.span_from(start))
                }
                ':' => self.single(TokenKind::Colon),

                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Mul),
                '/' => self.single(TokenKind::FloatDiv),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                ';' => self.single(TokenKind::Semi),
                ',' => self.single(TokenKind::Comma),
                '.' => self.single(TokenKind::Dot),

                c if c.is_ascii_digit() => self.scan_number()?,
                c if c.is_ascii_alphabetic() => self.scan_identifier(),

                character => {
                    let start = self.loc;
                    let mut end = start;
                    end.advance(character);
                    return Err(LexError::UnexpectedCharacter {
                        character,
                        span: SourceSpan::new(start, end),
                    });
                }
            };

            trace!(kind = token.kind.name(), lexeme = %token.lexeme, "token");
            return Ok(token);
        }

        Ok(Token::eof(SourceSpan::empty_at(self.loc)))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted_eof || self.failed {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(token) if token.kind == TokenKind::Eof => self.emitted_eof = true,
            Err(_) => self.failed = true,
            _ => (),
        }
        Some(result)
    }
}

/// Lexes all of `source`, ending with the `EOF` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("source should lex")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation() {
        let expected_kinds = [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Mul,
            TokenKind::FloatDiv,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Semi,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Colon,
            TokenKind::Assign,
            TokenKind::Eof,
        ];

        assert_eq!(kinds("+-*/();,.: :="), expected_kinds);
    }

    #[test]
    fn test_colon_is_disambiguated_by_peek() {
        let mut lexer = Lexer::new(":=");
        assert_eq!(lexer.peek(), Some('='));
        use TokenKind::*;
        assert_eq!(kinds("a:=1"), [Id, Assign, IntegerConst, Eof]);
        assert_eq!(kinds("a : b"), [Id, Colon, Id, Eof]);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Assign);
    }

    #[test]
    fn test_number_literals() {
        let tokens = tokenize("123 2.75").unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::IntegerConst);
        assert_eq!(tokens[0].value, TokenValue::Integer(123));
        assert_eq!(tokens[1].kind, TokenKind::RealConst);
        assert_eq!(tokens[1].lexeme, "2.75");
        assert_eq!(tokens[1].value, TokenValue::Real(2.75));
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_number() {
        use TokenKind::*;
        assert_eq!(kinds("END 1."), [End, IntegerConst, Dot, Eof]);
        assert_eq!(kinds("1.x"), [IntegerConst, Dot, Id, Eof]);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("BEGIN END PROGRAM VAR DIV INTEGER REAL begin Div"),
            [
                TokenKind::Begin,
                TokenKind::End,
                TokenKind::Program,
                TokenKind::Var,
                TokenKind::IntegerDiv,
                TokenKind::Integer,
                TokenKind::Real,
                TokenKind::Id,
                TokenKind::Id,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        let tokens = tokenize("foo x1 BEGINNING").unwrap();

        assert_eq!(tokens.len(), 4);
        for token in &tokens[..3] {
            assert_eq!(token.kind, TokenKind::Id);
        }
        assert_eq!(tokens[1].value, TokenValue::Text("x1".to_string()));
    }

    #[test]
    fn test_comments_produce_no_tokens() {
        assert_eq!(kinds("{ c1 } BEGIN x := 1; END ."), kinds("BEGIN x:=1;END."));
        assert_eq!(kinds("{ a { b }"), [TokenKind::Eof]);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("BEGIN { never closed").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
        assert_eq!(err.span().start.column, 7);
    }

    #[test]
    fn test_unexpected_character_reports_position() {
        let err = tokenize("x := 1;\n  y := @").unwrap_err();
        match err {
            LexError::UnexpectedCharacter { character, span } => {
                assert_eq!(character, '@');
                assert_eq!(span.start.line, 2);
                assert_eq!(span.start.column, 8);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_underscore_is_not_an_identifier_character() {
        assert!(tokenize("a_b").is_err());
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, LexError::IntegerOutOfRange { .. }));
    }

    #[test]
    fn test_eof_repeats_after_exhaustion() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Id);
        for _ in 0..3 {
            let eof = lexer.next_token().unwrap();
            assert_eq!(eof.kind, TokenKind::Eof);
            assert!(eof.span.is_empty());
        }
    }

    #[test]
    fn test_spans_slice_the_source() {
        let source = "BEGIN alpha := 42 END";
        let tokens = tokenize(source).unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.span.as_str(source)).collect();
        assert_eq!(lexemes, ["BEGIN", "alpha", ":=", "42", "END", ""]);
    }
}
