//! Intermediate Representation (IR) and code generation
//!
//! This module handles the transformation from AST to bytecode:
//! [`translate`] lowers the AST to [`ir::Ir`], [`codegen`] flattens that
//! into an [`bytecode::Artifact`], and [`compiler::Compiler`] drives the
//! whole pipeline.

pub mod bytecode;
pub mod codegen;
pub mod compiler;
pub mod ir;
pub mod opcode;
pub mod translate;

pub use bytecode::{Artifact, ArtifactError};
pub use compiler::Compiler;
pub use translate::{NodeRef, Translator};

use crate::frontend::parser::Category;

/// Lowering and code generation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("no lowering registered for {0}")]
    MissingLowering(Category),

    #[error("expected {expected}, found {found}")]
    UnexpectedNode {
        expected: &'static str,
        found: Category,
    },

    #[error("{0} does not fit the artifact format")]
    TooLarge(&'static str),
}

#[cfg(test)]
mod tests;
