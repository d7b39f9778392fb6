//! Runtime system
//!
//! Values, the scope chain they live in, and operator semantics.

pub mod env;
pub mod operations;
pub mod value;

pub use env::Environment;
pub use value::{Arity, Builtin, Value};

#[cfg(test)]
mod tests;
