//! Core runtime types for Sluice
//!
//! This module provides the value types the VM pushes around and the
//! builtins expose.

pub mod runtime_value;
pub use runtime_value::*;

#[cfg(test)]
mod tests;
