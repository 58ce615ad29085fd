use super::interpreter::Error;
use crate::source_location::SourceSpan;
use crate::syntax::{Name, Number};
use crate::token::TokenKind;
use derive_more::Display;
use internment::Intern;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum Value {
    #[display(fmt = "{}", _0)]
    Integer(i64),
    // Debug formatting keeps the fractional part, so 14.0 prints as "14.0"
    #[display(fmt = "{:?}", _0)]
    Real(f64),
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(i) => Value::Integer(i),
            Number::Real(r) => Value::Real(r),
        }
    }
}

impl Value {
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Integer(i) => *i as f64,
            Value::Real(r) => *r,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(i) => *i == 0,
            Value::Real(r) => *r == 0.0,
        }
    }

    pub fn evaluate_unary_operation(&self, op: TokenKind, span: SourceSpan) -> Result<Self, Error> {
        use Value::*;

        match (op, self) {
            (TokenKind::Plus, v) => Ok(*v),
            (TokenKind::Minus, Integer(i)) => {
                i.checked_neg().map(Integer).ok_or(Error::Overflow { span })
            }
            (TokenKind::Minus, Real(r)) => Ok(Real(-r)),
            _ => unreachable!("{op} is not a unary operator"),
        }
    }

    /// Applies an arithmetic operator. Integer operands stay integers except
    /// under '/', which always produces a real; mixing in a real promotes.
    pub fn evaluate_binary_operation(
        &self,
        op: TokenKind,
        rhs: &Self,
        span: SourceSpan,
    ) -> Result<Self, Error> {
        use Value::*;

        let checked = |result: Option<i64>| result.map(Integer).ok_or(Error::Overflow { span });

        match (op, self, rhs) {
            (TokenKind::Plus, Integer(a), Integer(b)) => checked(a.checked_add(*b)),
            (TokenKind::Minus, Integer(a), Integer(b)) => checked(a.checked_sub(*b)),
            (TokenKind::Mul, Integer(a), Integer(b)) => checked(a.checked_mul(*b)),
            (TokenKind::Plus, a, b) => Ok(Real(a.as_f64() + b.as_f64())),
            (TokenKind::Minus, a, b) => Ok(Real(a.as_f64() - b.as_f64())),
            (TokenKind::Mul, a, b) => Ok(Real(a.as_f64() * b.as_f64())),

            (TokenKind::IntegerDiv, Integer(a), Integer(b)) => {
                if *b == 0 {
                    return Err(Error::DivisionByZero { span });
                }
                checked(floor_div(*a, *b))
            }
            (TokenKind::IntegerDiv, _, _) => Err(Error::NonIntegerDivision { span }),

            (TokenKind::FloatDiv, a, b) => {
                if b.is_zero() {
                    return Err(Error::DivisionByZero { span });
                }
                Ok(Real(a.as_f64() / b.as_f64()))
            }

            _ => unreachable!("{op} is not a binary operator"),
        }
    }
}

// rounds toward negative infinity; None on overflow or a zero divisor
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

/// The single global variable scope of one program run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalScope {
    values: HashMap<Name, Value>,
}

impl GlobalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.get_name(Intern::new(name.to_string()))
    }

    pub fn get_name(&self, name: Name) -> Option<Value> {
        self.values.get(&name).copied()
    }

    /// Binds `value` to `name`, returning the previous binding.
    pub fn set(&mut self, name: Name, value: Value) -> Option<Value> {
        self.values.insert(name, value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Bindings ordered by name.
    pub fn sorted(&self) -> Vec<(&str, Value)> {
        let mut bindings: Vec<(&str, Value)> = self.iter().collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));
        bindings
    }
}

impl std::fmt::Display for GlobalScope {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (name, value) in self.sorted() {
            writeln!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}
