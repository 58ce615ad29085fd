mod environment;
#[allow(clippy::module_inception)]
mod interpreter;

pub use environment::{GlobalScope, Value};
pub use interpreter::{interpret, interpret_expression, Error, Interpreter};
