use crate::source_location::SourceSpan;
use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Begin,
    End,
    IntegerDiv,
    Program,
    Var,

    // Built-in type keywords
    Integer,
    Real,

    // Single-character tokens
    Colon,
    Comma,
    Dot,
    FloatDiv,
    LParen,
    Minus,
    Mul,
    Plus,
    RParen,
    Semi,

    // Two-character tokens
    Assign,

    // Literals
    Id,
    IntegerConst,
    RealConst,

    // Special
    Eof,
}

// Reserved words are matched case-sensitively: `BEGIN` is a keyword, `begin` is an identifier.
macro_rules! define_TokenKind_from_keyword_lexeme {
    ($($variant:ident => $str:expr),* $(,)?) => {
        impl TokenKind {
            pub fn from_keyword_lexeme(lexeme: &str) -> Option<TokenKind> {
                match lexeme {
                    $($str => Some(TokenKind::$variant),)*
                    _ => None
                }
            }
        }
    }
}

define_TokenKind_from_keyword_lexeme! {
    Begin => "BEGIN",
    End => "END",
    IntegerDiv => "DIV",
    Integer => "INTEGER",
    Program => "PROGRAM",
    Real => "REAL",
    Var => "VAR",
}

impl TokenKind {
    /// The upper-case name used in diagnostics and AST renderings.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Assign => "ASSIGN",
            TokenKind::Begin => "BEGIN",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::End => "END",
            TokenKind::Eof => "EOF",
            TokenKind::FloatDiv => "FLOAT_DIV",
            TokenKind::Id => "ID",
            TokenKind::Integer => "INTEGER",
            TokenKind::IntegerConst => "INTEGER_CONST",
            TokenKind::IntegerDiv => "INTEGER_DIV",
            TokenKind::LParen => "LPAREN",
            TokenKind::Minus => "MINUS",
            TokenKind::Mul => "MUL",
            TokenKind::Plus => "PLUS",
            TokenKind::Program => "PROGRAM",
            TokenKind::RParen => "RPAREN",
            TokenKind::Real => "REAL",
            TokenKind::RealConst => "REAL_CONST",
            TokenKind::Semi => "SEMI",
            TokenKind::Var => "VAR",
        }
    }

    /// The operator symbol for arithmetic kinds.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            TokenKind::Plus => Some("+"),
            TokenKind::Minus => Some("-"),
            TokenKind::Mul => Some("*"),
            TokenKind::FloatDiv => Some("/"),
            TokenKind::IntegerDiv => Some("DIV"),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Assign => write!(f, "':='"),
            TokenKind::Begin => write!(f, "'BEGIN'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::End => write!(f, "'END'"),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::FloatDiv => write!(f, "'/'"),
            TokenKind::Id => write!(f, "identifier"),
            TokenKind::Integer => write!(f, "'INTEGER'"),
            TokenKind::IntegerConst => write!(f, "integer constant"),
            TokenKind::IntegerDiv => write!(f, "'DIV'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Mul => write!(f, "'*'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Program => write!(f, "'PROGRAM'"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Real => write!(f, "'REAL'"),
            TokenKind::RealConst => write!(f, "real constant"),
            TokenKind::Semi => write!(f, "';'"),
            TokenKind::Var => write!(f, "'VAR'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Integer(i64),
    Real(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Display)]
#[display(fmt = "{lexeme}")]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub lexeme: String,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: SourceSpan) -> Self {
        Token {
            kind,
            value: TokenValue::None,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn with_value(
        kind: TokenKind,
        lexeme: impl Into<String>,
        value: TokenValue,
        span: SourceSpan,
    ) -> Self {
        Token {
            kind,
            value,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn eof(span: SourceSpan) -> Self {
        Token::new(TokenKind::Eof, "", span)
    }
}
