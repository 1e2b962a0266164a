//! Tree-walking evaluation of parsed programs.

pub mod interpreter;

pub use interpreter::{Completion, Interpreter, RuntimeError, RuntimeResult};
