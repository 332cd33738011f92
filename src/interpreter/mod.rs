mod environment;
mod lox_callable;
mod lox_value;
mod tree_walker;

pub use environment::Environment;
pub use lox_value::LoxValue;
pub use tree_walker::{Interpreter, RuntimeError};
