//! Shell line classification
//!
//! ```text
//! <blank>            nothing
//! :!ls -l            OS command
//! :name arg arg      shell command, each arg an expression
//! (x + 1 litre)      expression, result bound to `_`
//! declare y is x     statement
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::frontend::parser::ast::{Expr, Node, Stmt};
use crate::frontend::parser::{standard_rules, Category, ParseErrorKind, Parser};
use crate::frontend::SyntaxError;

static SHELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:!(?P<cmd>.*)$").unwrap_or_else(|e| panic!("invalid shell pattern: {}", e))
});

static COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:(?P<name>\w+)\s*(?P<args>.*)$")
        .unwrap_or_else(|e| panic!("invalid command pattern: {}", e))
});

/// One classified line of shell input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplLine {
    Blank,
    /// Passed to the operating system shell
    Shell(String),
    Command { name: String, args: Vec<Expr> },
    Expression(Expr),
    Statement(Stmt),
}

/// Classify `line`. Expressions are preferred over statements.
pub fn parse_line(line: &str) -> Result<ReplLine, SyntaxError> {
    if line.trim().is_empty() {
        return Ok(ReplLine::Blank);
    }

    if let Some(caps) = SHELL.captures(line) {
        return Ok(ReplLine::Shell(caps["cmd"].to_string()));
    }

    if let Some(caps) = COMMAND.captures(line) {
        return Ok(ReplLine::Command {
            name: caps["name"].to_string(),
            args: parse_args(&caps["args"])?,
        });
    }

    let err = match fragment(line, Category::Expression, Node::into_expr) {
        Ok(expr) => return Ok(ReplLine::Expression(expr)),
        Err(err) => err,
    };

    // statements need their terminating line break
    fragment(&format!("{}\n", line), Category::Statement, Node::into_stmt)
        .map(ReplLine::Statement)
        .map_err(|stmt_err| deeper(err, stmt_err))
}

/// Parse all of `code` as one node of `category`
fn fragment<T>(
    code: &str,
    category: Category,
    convert: fn(Node) -> Option<T>,
) -> Result<T, SyntaxError> {
    let mut parser = Parser::new(code, standard_rules())?;
    let node = parser.parse(category)?;
    let found = node.category();
    convert(node).ok_or_else(|| {
        parser
            .error(ParseErrorKind::UnexpectedNode {
                expected: category,
                found,
            })
            .into()
    })
}

/// Zero or more expressions filling the whole argument text
fn parse_args(text: &str) -> Result<Vec<Expr>, SyntaxError> {
    let mut parser = Parser::new(text, standard_rules())?;
    let args = parser.expressions()?;

    if let Some(token) = parser.stream().peek() {
        let kind = ParseErrorKind::TrailingInput(
            format!("{} `{}`", token.kind, token.text),
            Category::Expression,
        );
        return Err(parser.error(kind).into());
    }
    Ok(args)
}

/// Of two failures, the one that got further into the line
fn deeper(
    first: SyntaxError,
    second: SyntaxError,
) -> SyntaxError {
    let first_is_deeper = matches!(
        (&first, &second),
        (SyntaxError::Parse(a), SyntaxError::Parse(b)) if a.progress > b.progress
    );
    if first_is_deeper {
        first
    } else {
        second
    }
}
