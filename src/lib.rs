pub mod diagnostics;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod semantic_analyzer;
pub mod source_location;
pub mod symbol_table;
pub mod syntax;
pub mod token;

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

pub use interpreter::{interpret, Error as RuntimeError, GlobalScope, Interpreter, Value};
pub use lexer::LexError;
pub use parser::ParseError;
pub use semantic_analyzer::Error as SemanticError;
pub use source_location::{SourceLocation, SourceSpan};
pub use symbol_table::SymbolTable;

use lexer::Lexer;
use syntax::{Expression, Program};
use token::TokenKind;

/// Any failure of the lex → parse → check → interpret pipeline.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Lex(e) => Error::Lex(e),
            other => Error::Parse(other),
        }
    }
}

impl Error {
    pub fn span(&self) -> SourceSpan {
        match self {
            Error::Lex(e) => e.span(),
            Error::Parse(e) => e.span(),
            Error::Semantic(e) => e.span(),
            Error::Runtime(e) => e.span(),
        }
    }

    /// Short name of the stage that failed, used as a message prefix.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Lex(_) => "lexical error",
            Error::Parse(_) => "syntax error",
            Error::Semantic(_) => "semantic error",
            Error::Runtime(_) => "runtime error",
        }
    }
}

/// When the declared-name check runs before a program is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SemanticCheck {
    /// Only for programs that declare variables in a `VAR` section.
    #[default]
    Auto,
    Always,
    Never,
}

impl SemanticCheck {
    pub fn applies_to(&self, program: &Program) -> bool {
        match self {
            SemanticCheck::Auto => program.has_declarations(),
            SemanticCheck::Always => true,
            SemanticCheck::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub semantic_check: SemanticCheck,
}

pub fn parse_program(source: &str) -> Result<Program, Error> {
    Ok(parser::parse_program(source)?)
}

pub fn parse_expression(source: &str) -> Result<Expression, Error> {
    Ok(parser::parse_expression(source)?)
}

pub fn check_program(program: &Program) -> Result<SymbolTable, Error> {
    Ok(semantic_analyzer::analyze(program)?)
}

/// Runs a whole program and returns its final global scope.
///
/// Nothing is evaluated when lexing, parsing or the semantic check fails.
pub fn run(source: &str, options: &Options) -> Result<GlobalScope, Error> {
    let program = parse_program(source)?;

    if options.semantic_check.applies_to(&program) {
        let symbols = check_program(&program)?;
        debug!(%symbols, "checked program");
    }

    match interpret(&program) {
        (globals, None) => Ok(globals),
        (_, Some(error)) => Err(error.into()),
    }
}

/// Whether `source` opens like a program rather than a bare expression,
/// looking at its first token after any whitespace and comments.
pub fn starts_program(source: &str) -> bool {
    matches!(
        Lexer::new(source).next_token().map(|token| token.kind),
        Ok(TokenKind::Program | TokenKind::Var | TokenKind::Begin)
    )
}

/// Evaluates a bare expression. Any variable reference fails, since the
/// scope is empty.
pub fn evaluate(source: &str) -> Result<Value, Error> {
    let expr = parse_expression(source)?;
    Ok(interpreter::interpret_expression(&expr)?)
}
