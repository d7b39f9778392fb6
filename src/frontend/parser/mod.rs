//! Parser module
//!
//! A backtracking recursive-descent engine driven by a [`RuleRegistry`].
//! Each grammar rule is registered for a [`Category`]; asking the engine
//! for a category tries every matching rule in priority order, rewinding
//! the token stream after each failure.

pub mod ast;
pub mod grammar;
pub mod registry;
pub mod state;

pub use grammar::standard_rules;
pub use registry::{Category, Rule, RuleEntry, RuleRegistry};
pub use state::{ParseError, ParseErrorKind, ParseResult, Parser, Snapshot, TokenStream};

use std::path::Path;

use crate::frontend::lexer::Token;
use ast::{Node, Program};

/// Parse a whole token stream as one `category`
pub fn parse_tokens(
    tokens: Vec<Token>,
    code: &str,
    category: Category,
) -> ParseResult<Node> {
    Parser::from_tokens(tokens, code, standard_rules()).parse(category)
}

/// Parse a complete program from tokens
pub fn parse(
    tokens: Vec<Token>,
    code: &str,
    path: Option<&Path>,
) -> ParseResult<Program> {
    let mut parser = Parser::from_tokens(tokens, code, standard_rules())
        .with_path(path.map(Path::to_path_buf));
    let node = parser.parse(Category::Program)?;
    let found = node.category();
    node.into_program().ok_or_else(|| {
        parser.error(ParseErrorKind::UnexpectedNode {
            expected: Category::Program,
            found,
        })
    })
}

#[cfg(test)]
mod tests;
