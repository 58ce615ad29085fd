use super::environment::*;
use crate::source_location::SourceSpan;
use crate::syntax::*;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Error {
    #[error("variable '{name}' is used before it is assigned at {span}")]
    #[diagnostic(code(runtime::unassigned))]
    Unassigned {
        name: String,
        #[label("no value has been assigned")]
        span: SourceSpan,
    },

    #[error("division by zero at {span}")]
    #[diagnostic(code(runtime::division_by_zero))]
    DivisionByZero {
        #[label("right operand is zero")]
        span: SourceSpan,
    },

    #[error("integer overflow at {span}")]
    #[diagnostic(code(runtime::overflow))]
    Overflow {
        #[label("result does not fit in a 64-bit integer")]
        span: SourceSpan,
    },

    #[error("DIV requires integer operands at {span}")]
    #[diagnostic(code(runtime::non_integer_division), help("use '/' to divide reals"))]
    NonIntegerDivision {
        #[label("operand is a real")]
        span: SourceSpan,
    },
}

impl Error {
    pub fn span(&self) -> SourceSpan {
        match self {
            Error::Unassigned { span, .. }
            | Error::DivisionByZero { span }
            | Error::Overflow { span }
            | Error::NonIntegerDivision { span } => *span,
        }
    }
}

/// Tree-walking evaluator.
///
/// The interpreter owns no state of its own; every binding goes into the
/// `GlobalScope` it was handed, so a caller can inspect whatever was committed
/// before a failure.
pub struct Interpreter<'s> {
    globals: &'s mut GlobalScope,
}

impl<'s> Interpreter<'s> {
    pub fn new(globals: &'s mut GlobalScope) -> Self {
        Self { globals }
    }

    pub fn interpret_program(&mut self, program: &Program) -> Result<(), Error> {
        self.interpret_compound_statement(&program.body)?;
        debug!(bindings = self.globals.len(), "interpreted program");
        Ok(())
    }

    pub fn interpret_statement(&mut self, stmt: &Statement) -> Result<(), Error> {
        match stmt {
            Statement::Compound(compound) => self.interpret_compound_statement(compound),
            Statement::Assign(assign) => self.interpret_assignment(assign),
            Statement::NoOp => Ok(()),
        }
    }

    fn interpret_compound_statement(&mut self, compound: &Compound) -> Result<(), Error> {
        for stmt in &compound.children {
            self.interpret_statement(stmt)?;
        }
        Ok(())
    }

    fn interpret_assignment(&mut self, assign: &Assign) -> Result<(), Error> {
        // evaluate first: a failing right-hand side leaves the target untouched
        let value = self.interpret_expression(&assign.value)?;
        trace!(name = assign.target.name(), %value, "assign");
        self.globals.set(assign.target.name, value);
        Ok(())
    }

    pub fn interpret_expression(&self, expr: &Expression) -> Result<Value, Error> {
        match expr {
            Expression::BinOp(b) => self.interpret_binary_expression(b),
            Expression::UnaryOp(u) => self.interpret_unary_expression(u),
            Expression::Num(n) => Ok(Value::from(n.value)),
            Expression::Var(var) => self.interpret_variable(var),
        }
    }

    fn interpret_binary_expression(&self, expr: &BinOp) -> Result<Value, Error> {
        // both sides are always evaluated, left first
        let left = self.interpret_expression(&expr.left)?;
        let right = self.interpret_expression(&expr.right)?;
        left.evaluate_binary_operation(expr.op, &right, expr.op_span)
    }

    fn interpret_unary_expression(&self, expr: &UnaryOp) -> Result<Value, Error> {
        let operand = self.interpret_expression(&expr.operand)?;
        operand.evaluate_unary_operation(expr.op, expr.op_span)
    }

    fn interpret_variable(&self, var: &Var) -> Result<Value, Error> {
        self.globals.get_name(var.name).ok_or_else(|| Error::Unassigned {
            name: var.name().to_string(),
            span: var.span,
        })
    }
}

/// Runs `program` in a fresh global scope.
///
/// The scope is returned even when evaluation fails; it then holds the
/// bindings committed by the statements that completed before the error.
pub fn interpret(program: &Program) -> (GlobalScope, Option<Error>) {
    let mut globals = GlobalScope::new();
    let result = Interpreter::new(&mut globals).interpret_program(program);
    (globals, result.err())
}

/// Evaluates a bare expression against an empty scope.
pub fn interpret_expression(expr: &Expression) -> Result<Value, Error> {
    let mut globals = GlobalScope::new();
    Interpreter::new(&mut globals).interpret_expression(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_expression, parse_program};
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> Result<Value, Error> {
        interpret_expression(&parse_expression(source).expect("expression should parse"))
    }

    fn run(source: &str) -> (GlobalScope, Option<Error>) {
        interpret(&parse_program(source).expect("program should parse"))
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(eval("2 + 3 * 4"), Ok(Value::Integer(14)));
        assert_eq!(eval("(1+2)*(3+4)"), Ok(Value::Integer(21)));
        assert_eq!(eval("10 - 4 - 3"), Ok(Value::Integer(3)));
        assert_eq!(eval("100 DIV 10 DIV 5"), Ok(Value::Integer(2)));
        assert_eq!(eval("2 * 3 - 8 DIV 2 + 1"), Ok(Value::Integer(3)));
    }

    #[test]
    fn test_unary_chains() {
        assert_eq!(eval("--5"), Ok(Value::Integer(5)));
        assert_eq!(eval("+-5"), Ok(Value::Integer(-5)));
        assert_eq!(eval("- - - 5"), Ok(Value::Integer(-5)));
        assert_eq!(eval("5 - - - + - 3"), Ok(Value::Integer(8)));
        assert_eq!(eval("-2.5"), Ok(Value::Real(-2.5)));
    }

    #[test]
    fn test_real_promotion() {
        assert_eq!(eval("1 + 2"), Ok(Value::Integer(3)));
        assert_eq!(eval("1 + 2.5"), Ok(Value::Real(3.5)));
        assert_eq!(eval("2.0 * 3"), Ok(Value::Real(6.0)));
    }

    #[test]
    fn test_float_division_always_yields_real() {
        assert_eq!(eval("7 / 2"), Ok(Value::Real(3.5)));
        assert_eq!(eval("8 / 2"), Ok(Value::Real(4.0)));
    }

    #[test]
    fn test_integer_division_floors() {
        assert_eq!(eval("7 DIV 2"), Ok(Value::Integer(3)));
        assert_eq!(eval("-7 DIV 2"), Ok(Value::Integer(-4)));
        assert_eq!(eval("7 DIV -2"), Ok(Value::Integer(-4)));
    }

    #[test]
    fn test_integer_division_rejects_reals() {
        assert!(matches!(eval("7.0 DIV 2"), Err(Error::NonIntegerDivision { .. })));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(eval("5 DIV 0"), Err(Error::DivisionByZero { .. })));
        assert!(matches!(eval("5 / 0"), Err(Error::DivisionByZero { .. })));
        assert!(matches!(eval("5 / 0.0"), Err(Error::DivisionByZero { .. })));
        assert!(matches!(eval("1 + 5 / (2 - 2)"), Err(Error::DivisionByZero { .. })));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(eval("9223372036854775807 + 1"), Err(Error::Overflow { .. })));
        assert!(matches!(eval("-9223372036854775807 - 2"), Err(Error::Overflow { .. })));
    }

    #[test]
    fn test_assignments_bind_in_global_scope() {
        let (scope, error) = run("BEGIN y := 10; z := y - 20; END.");
        assert_eq!(error, None);
        assert_eq!(scope.sorted(), vec![("y", Value::Integer(10)), ("z", Value::Integer(-10))]);
    }

    #[test]
    fn test_reassignment_overwrites() {
        let (scope, _) = run("BEGIN x := 1; x := x + 1.5 END.");
        assert_eq!(scope.get("x"), Some(Value::Real(2.5)));
    }

    #[test]
    fn test_nested_compound() {
        let (scope, error) = run("BEGIN a := 1; BEGIN b := a + 1; END; END.");
        assert_eq!(error, None);
        assert_eq!(scope.get("a"), Some(Value::Integer(1)));
        assert_eq!(scope.get("b"), Some(Value::Integer(2)));
    }

    #[test]
    fn test_unassigned_read_fails() {
        let (scope, error) = run("BEGIN x := y END.");
        assert!(matches!(error, Some(Error::Unassigned { ref name, .. }) if name == "y"));
        assert!(scope.is_empty());
    }

    #[test]
    fn test_failure_keeps_earlier_bindings_only() {
        let (scope, error) = run("BEGIN a := 1; x := 5 DIV 0; b := 2 END.");
        assert!(matches!(error, Some(Error::DivisionByZero { .. })));
        assert_eq!(scope.get("a"), Some(Value::Integer(1)));
        assert!(!scope.contains("x"));
        assert!(!scope.contains("b"));
    }

    #[test]
    fn test_division_by_zero_points_at_operator() {
        let source = "BEGIN x := 5 DIV 0 END.";
        let (_, error) = run(source);
        let span = error.expect("division should fail").span();
        assert_eq!(span.as_str(source), "DIV");
    }
}
