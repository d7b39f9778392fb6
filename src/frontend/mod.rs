//! Frontend compilation pipeline
//!
//! Source text → tokens → AST.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub mod lexer;
pub mod parser;

use lexer::LexError;
use parser::ast::{Node, Program};
use parser::{Category, ParseError};

/// Lexical or syntactic failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("Lexical error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// Render a caret diagnostic
    pub fn render(
        &self,
        source_name: &str,
    ) -> String {
        match self {
            SyntaxError::Lex(e) => e.render(source_name),
            SyntaxError::Parse(e) => e.render(source_name),
        }
    }
}

/// Tokenize and parse a complete program
pub fn parse_program(
    code: &str,
    path: Option<&Path>,
) -> Result<Program, SyntaxError> {
    debug!("Parsing source code ({} bytes)", code.len());
    let tokens = lexer::tokenize_all(code)?;
    let program = parser::parse(tokens, code, path)?;
    debug!(
        "Parsing successful, got {} statements",
        program.instructions.len()
    );
    Ok(program)
}

/// Tokenize and parse `code` as a single node of `category`
pub fn parse_fragment(
    code: &str,
    category: Category,
) -> Result<Node, SyntaxError> {
    let tokens = lexer::tokenize_all(code)?;
    Ok(parser::parse_tokens(tokens, code, category)?)
}
