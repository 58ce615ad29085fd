use crate::lexer::{LexError, Lexer};
use crate::source_location::SourceSpan;
use crate::syntax::*;
use crate::token::*;
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ParseError {
    // the parser pulls tokens lazily, so lexing failures surface here
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at {span}")]
    #[diagnostic(code(parse::unexpected_token))]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("expected an expression, found {found} at {span}")]
    #[diagnostic(code(parse::expected_expression))]
    ExpectedExpression {
        found: TokenKind,
        #[label("expression expected here")]
        span: SourceSpan,
    },

    #[error("expected ';' before '{lexeme}' at {span}")]
    #[diagnostic(code(parse::missing_semicolon), help("separate statements with ';'"))]
    MissingSemicolon {
        lexeme: String,
        #[label("statement starts here")]
        span: SourceSpan,
    },

    #[error("unexpected trailing input at {span}")]
    #[diagnostic(code(parse::trailing_input))]
    TrailingInput {
        found: TokenKind,
        #[label("nothing may follow the end of the program")]
        span: SourceSpan,
    },
}

impl ParseError {
    pub fn span(&self) -> SourceSpan {
        match self {
            ParseError::Lex(e) => e.span(),
            ParseError::UnexpectedToken { span, .. }
            | ParseError::ExpectedExpression { span, .. }
            | ParseError::MissingSemicolon { span, .. }
            | ParseError::TrailingInput { span, .. } => *span,
        }
    }
}

/// Recursive-descent parser with one token of lookahead.
///
/// Each grammar rule below is one method. Tokens are pulled from the lexer one
/// at a time and dropped as soon as the rule that consumed them returns.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Parser<'a>, ParseError> {
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consumes the current token if it has the given kind and returns it.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if !self.at(kind) {
            return Err(ParseError::UnexpectedToken {
                expected: kind,
                found: self.current.kind,
                span: self.current.span,
            });
        }

        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.at(TokenKind::Eof) {
            Ok(())
        } else {
            Err(ParseError::TrailingInput {
                found: self.current.kind,
                span: self.current.span,
            })
        }
    }

    /// Parses a whole program; the input must end right after the closing '.'.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let program = self.program()?;
        self.expect_eof()?;

        debug!(
            declarations = program.declarations.len(),
            statements = program.body.children.len(),
            "parsed program"
        );
        Ok(program)
    }

    /// Parses a single bare expression followed by end of input.
    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let expr = self.expr()?;
        self.expect_eof()?;
        Ok(expr)
    }

    // program := ( PROGRAM variable SEMI )? block DOT
    fn program(&mut self) -> Result<Program, ParseError> {
        let name = if self.at(TokenKind::Program) {
            self.expect(TokenKind::Program)?;
            let name = self.variable()?;
            self.expect(TokenKind::Semi)?;
            Some(name)
        } else {
            None
        };

        let (declarations, body) = self.block()?;
        self.expect(TokenKind::Dot)?;

        Ok(Program {
            name,
            declarations,
            body,
        })
    }

    // block := declarations compound_statement
    fn block(&mut self) -> Result<(Vec<VarDecl>, Compound), ParseError> {
        let declarations = self.declarations()?;
        let body = self.compound_statement()?;
        Ok((declarations, body))
    }

    // declarations := VAR ( variable_declaration SEMI )+ | empty
    fn declarations(&mut self) -> Result<Vec<VarDecl>, ParseError> {
        let mut result = Vec::new();
        if !self.at(TokenKind::Var) {
            return Ok(result);
        }

        self.expect(TokenKind::Var)?;
        loop {
            result.extend(self.variable_declaration()?);
            self.expect(TokenKind::Semi)?;
            if !self.at(TokenKind::Id) {
                break;
            }
        }

        Ok(result)
    }

    // variable_declaration := ID ( COMMA ID )* COLON type_spec
    fn variable_declaration(&mut self) -> Result<Vec<VarDecl>, ParseError> {
        let mut vars = vec![self.variable()?];
        while self.at(TokenKind::Comma) {
            self.expect(TokenKind::Comma)?;
            vars.push(self.variable()?);
        }

        self.expect(TokenKind::Colon)?;
        let type_spec = self.type_spec()?;

        Ok(vars
            .into_iter()
            .map(|var| VarDecl { var, type_spec })
            .collect())
    }

    // type_spec := INTEGER | REAL
    fn type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let kind = if self.at(TokenKind::Real) {
            TokenKind::Real
        } else {
            TokenKind::Integer
        };
        let token = self.expect(kind)?;
        Ok(TypeSpec {
            kind,
            span: token.span,
        })
    }

    // compound_statement := BEGIN statement_list END
    fn compound_statement(&mut self) -> Result<Compound, ParseError> {
        let begin = self.expect(TokenKind::Begin)?;
        let children = self.statement_list()?;
        let end = self.expect(TokenKind::End)?;

        Ok(Compound {
            children,
            span: begin.span.merge(&end.span),
        })
    }

    // statement_list := statement ( SEMI statement )*
    fn statement_list(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![self.statement()?];

        while self.at(TokenKind::Semi) {
            self.expect(TokenKind::Semi)?;
            statements.push(self.statement()?);
        }

        // an identifier right after a statement means a ';' was left out
        if self.at(TokenKind::Id) {
            return Err(ParseError::MissingSemicolon {
                lexeme: self.current.lexeme.clone(),
                span: self.current.span,
            });
        }

        Ok(statements)
    }

    // statement := compound_statement | assignment_statement | empty
    fn statement(&mut self) -> Result<Statement, ParseError> {
        match self.current.kind {
            TokenKind::Begin => self.compound_statement().map(Statement::Compound),
            TokenKind::Id => self.assignment_statement().map(Statement::Assign),
            _ => Ok(self.empty()),
        }
    }

    // assignment_statement := variable ASSIGN expr
    fn assignment_statement(&mut self) -> Result<Assign, ParseError> {
        let target = self.variable()?;
        self.expect(TokenKind::Assign)?;
        let value = self.expr()?;
        Ok(Assign { target, value })
    }

    // variable := ID
    fn variable(&mut self) -> Result<Var, ParseError> {
        let token = self.expect(TokenKind::Id)?;
        Ok(Var::new(&token.lexeme, token.span))
    }

    // empty :=
    fn empty(&self) -> Statement {
        Statement::NoOp
    }

    // expr := term ( ( PLUS | MINUS ) term )*
    fn expr(&mut self) -> Result<Expression, ParseError> {
        let mut result = self.term()?;

        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.expect(self.current.kind)?;
            let right = self.term()?;

            result = Expression::BinOp(BinOp {
                left: Box::new(result),
                op: op.kind,
                op_span: op.span,
                right: Box::new(right),
            });
        }

        Ok(result)
    }

    // term := factor ( ( MUL | INTEGER_DIV | FLOAT_DIV ) factor )*
    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut result = self.factor()?;

        while matches!(
            self.current.kind,
            TokenKind::Mul | TokenKind::IntegerDiv | TokenKind::FloatDiv
        ) {
            let op = self.expect(self.current.kind)?;
            let right = self.factor()?;

            result = Expression::BinOp(BinOp {
                left: Box::new(result),
                op: op.kind,
                op_span: op.span,
                right: Box::new(right),
            });
        }

        Ok(result)
    }

    // factor := ( PLUS | MINUS ) factor | INTEGER_CONST | REAL_CONST
    //         | LPAREN expr RPAREN | variable
    fn factor(&mut self) -> Result<Expression, ParseError> {
        match self.current.kind {
            TokenKind::Plus | TokenKind::Minus => {
                let op = self.expect(self.current.kind)?;
                let operand = self.factor()?;
                Ok(Expression::UnaryOp(UnaryOp {
                    op: op.kind,
                    op_span: op.span,
                    operand: Box::new(operand),
                }))
            }
            TokenKind::IntegerConst | TokenKind::RealConst => {
                let token = self.expect(self.current.kind)?;
                let value = match token.value {
                    TokenValue::Integer(i) => Number::Integer(i),
                    TokenValue::Real(r) => Number::Real(r),
                    other => unreachable!("numeric token carries {other:?}"),
                };
                Ok(Expression::Num(Num {
                    value,
                    span: token.span,
                }))
            }
            TokenKind::LParen => {
                self.expect(TokenKind::LParen)?;
                let expr = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Id => self.variable().map(Expression::Var),
            found => Err(ParseError::ExpectedExpression {
                found,
                span: self.current.span,
            }),
        }
    }
}

pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(Lexer::new(source))?.parse()
}

pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    Parser::new(Lexer::new(source))?.parse_expression()
}
