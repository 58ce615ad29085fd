use crate::source_location::SourceSpan;
use crate::symbol_table::{Symbol, SymbolTable, VarSymbol};
use crate::syntax::*;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Error {
    #[error("undeclared variable '{name}' at {span}")]
    #[diagnostic(code(semantic::undeclared), help("declare it in the VAR section"))]
    Undeclared {
        name: String,
        #[label("not declared")]
        span: SourceSpan,
    },
}

impl Error {
    pub fn span(&self) -> SourceSpan {
        match self {
            Error::Undeclared { span, .. } => *span,
        }
    }
}

/// Resolves every variable reference in a program against its declarations
/// before anything is evaluated.
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
        }
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    pub fn analyze_program(&mut self, program: &Program) -> Result<(), Error> {
        for decl in &program.declarations {
            self.analyze_variable_declaration(decl);
        }
        self.analyze_compound_statement(&program.body)?;

        debug!(symbols = %self.symbols, "semantic analysis finished");
        Ok(())
    }

    fn analyze_variable_declaration(&mut self, decl: &VarDecl) {
        // the parser only produces INTEGER and REAL, both seeded as builtins
        let builtin = self.symbols.lookup(decl.type_spec.name());
        let type_ = match builtin.and_then(|s| s.as_builtin_type()) {
            Some(type_) => type_,
            None => unreachable!("type '{}' is not a builtin", decl.type_spec.name()),
        };

        let symbol = VarSymbol {
            name: decl.var.name,
            type_,
        };

        if let Some(previous) = self.symbols.define(symbol) {
            warn!(name = decl.var.name(), previous = %previous, "variable redeclared");
        }
        trace!(symbol = %symbol, "defined");
    }

    fn analyze_compound_statement(&mut self, compound: &Compound) -> Result<(), Error> {
        for stmt in &compound.children {
            self.analyze_statement(stmt)?;
        }
        Ok(())
    }

    fn analyze_statement(&mut self, stmt: &Statement) -> Result<(), Error> {
        match stmt {
            Statement::Compound(compound) => self.analyze_compound_statement(compound),
            Statement::Assign(assign) => self.analyze_assignment(assign),
            Statement::NoOp => Ok(()),
        }
    }

    fn analyze_assignment(&mut self, assign: &Assign) -> Result<(), Error> {
        self.analyze_variable(&assign.target)?;
        self.analyze_expression(&assign.value)
    }

    fn analyze_expression(&mut self, expr: &Expression) -> Result<(), Error> {
        match expr {
            Expression::BinOp(b) => {
                self.analyze_expression(&b.left)?;
                self.analyze_expression(&b.right)
            }
            Expression::UnaryOp(u) => self.analyze_expression(&u.operand),
            Expression::Num(_) => Ok(()),
            Expression::Var(var) => self.analyze_variable(var),
        }
    }

    fn analyze_variable(&self, var: &Var) -> Result<(), Error> {
        match self.symbols.lookup_name(var.name) {
            Some(Symbol::Var(_)) => Ok(()),
            _ => Err(Error::Undeclared {
                name: var.name().to_string(),
                span: var.span,
            }),
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the semantic pass over `program` and returns the populated symbol table.
pub fn analyze(program: &Program) -> Result<SymbolTable, Error> {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze_program(program)?;
    Ok(analyzer.into_symbols())
}
