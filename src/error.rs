//! Crate-level error type

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::frontend::lexer::LexError;
use crate::frontend::parser::ParseError;
use crate::frontend::SyntaxError;
use crate::middle::{ArtifactError, CompileError};
use crate::vm::RuntimeError;

/// Any failure between source text and a finished run
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no dump target given and the program has no source path")]
    NoDumpTarget,
}

impl Error {
    /// Render for a terminal: syntax errors get a source snippet
    pub fn render(
        &self,
        source_name: &str,
    ) -> String {
        match self {
            Error::Syntax(e) => e.render(source_name),
            other => format!("error: {}\n", other),
        }
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Syntax(e.into())
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Syntax(e.into())
    }
}
