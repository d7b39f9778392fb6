//! Parser state and token stream management
//!
//! The [`TokenStream`] is an immutable token array plus a cursor. Saving
//! and restoring the cursor ([`Snapshot`]) is all the engine needs to
//! backtrack: every candidate rule runs against a snapshot and the stream
//! is rewound when it fails.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::ast::{Expr, Node, Stmt};
use super::registry::{Category, RuleRegistry};
use crate::frontend::lexer::literals::LiteralError;
use crate::frontend::lexer::{tokenize_all, LexError, Token, TokenKind};
use crate::util::diagnostic::render_snippet;
use crate::util::span::{Position, Span};

/// Parse result type
pub type ParseResult<T> = Result<T, ParseError>;

/// Reason a rule failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found} `{text}`")]
    Mismatch {
        expected: TokenKind,
        found: TokenKind,
        text: String,
    },
    #[error("expected {0}, found end of input")]
    UnexpectedEof(TokenKind),
    #[error("no rules registered for {0}")]
    NoRules(Category),
    #[error("unexpected {0} after a complete {1}")]
    TrailingInput(String, Category),
    #[error("expected {expected}, got {found}")]
    UnexpectedNode {
        expected: Category,
        found: Category,
    },
    #[error("program has no statements")]
    EmptyProgram,
    #[error("{0}")]
    Literal(#[from] LiteralError),
}

/// Parse error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
    /// Token index the failing rule had reached
    pub progress: usize,
    code: Arc<str>,
}

impl ParseError {
    pub fn source_text(&self) -> &str {
        &self.code
    }

    /// Render a caret diagnostic for this error
    pub fn render(
        &self,
        source_name: &str,
    ) -> String {
        render_snippet(source_name, &self.code, self.position, &self.kind.to_string())
    }
}

/// Saved stream position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot(usize);

/// Token array with a cursor
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cursor: 0 }
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.cursor)
    }

    #[inline]
    pub fn restore(
        &mut self,
        snapshot: Snapshot,
    ) {
        self.cursor = snapshot.0;
    }

    /// Index of the next token
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// Last consumed token
    #[inline]
    pub fn previous(&self) -> Option<&Token> {
        self.cursor.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    pub fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Memo key: category, start cursor, whole-stream flag
type MemoKey = (Category, usize, bool);

/// Backtracking parser over a token stream
///
/// Outcomes of [`Parser::consume`] / [`Parser::parse`] are memoized per
/// start position. Rules only read the immutable token array, so a category
/// tried twice at one cursor always ends the same way; the memo keeps
/// sibling rules sharing a prefix (`(` expression ...) linear.
pub struct Parser<'r> {
    code: Arc<str>,
    path: Option<PathBuf>,
    stream: TokenStream,
    rules: &'r RuleRegistry,
    end_position: Position,
    memo: HashMap<MemoKey, (ParseResult<Node>, Snapshot)>,
}

impl<'r> Parser<'r> {
    /// Tokenize `code` and prepare to parse it
    pub fn new(
        code: &str,
        rules: &'r RuleRegistry,
    ) -> Result<Self, LexError> {
        let tokens = tokenize_all(code)?;
        Ok(Self::from_tokens(tokens, code, rules))
    }

    pub fn from_tokens(
        tokens: Vec<Token>,
        code: &str,
        rules: &'r RuleRegistry,
    ) -> Self {
        let mut end_position = Position::start();
        end_position.feed(code);
        Self {
            code: Arc::from(code),
            path: None,
            stream: TokenStream::new(tokens),
            rules,
            end_position,
            memo: HashMap::new(),
        }
    }

    /// Record the file the tokens came from
    pub fn with_path(
        mut self,
        path: Option<PathBuf>,
    ) -> Self {
        self.path = path;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut TokenStream {
        &mut self.stream
    }

    // ---- errors ----

    /// Error located at the next token (or the end of input)
    pub fn error(
        &self,
        kind: ParseErrorKind,
    ) -> ParseError {
        let position = self
            .stream
            .peek()
            .map(|t| t.span.start)
            .unwrap_or(self.end_position);
        self.error_at(kind, position)
    }

    pub fn error_at(
        &self,
        kind: ParseErrorKind,
        position: Position,
    ) -> ParseError {
        ParseError {
            kind,
            position,
            progress: self.stream.cursor(),
            code: self.code.clone(),
        }
    }

    // ---- token level ----

    #[inline]
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.stream.peek().map(|t| t.kind)
    }

    #[inline]
    pub fn at(
        &self,
        kind: TokenKind,
    ) -> bool {
        self.peek_kind() == Some(kind)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.stream.is_at_end()
    }

    /// Span of the last consumed token
    pub fn previous_span(&self) -> Span {
        self.stream
            .previous()
            .map(|t| t.span)
            .unwrap_or_default()
    }

    /// Pop one token of `kind`. The stream does not move on failure.
    pub fn expect(
        &mut self,
        kind: TokenKind,
    ) -> ParseResult<Token> {
        match self.stream.peek() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.stream.advance();
                Ok(token)
            }
            Some(token) => {
                let kind = ParseErrorKind::Mismatch {
                    expected: kind,
                    found: token.kind,
                    text: token.text.clone(),
                };
                Err(self.error(kind))
            }
            None => Err(self.error(ParseErrorKind::UnexpectedEof(kind))),
        }
    }

    /// Pop every consecutive token of `kind`
    pub fn skip(
        &mut self,
        kind: TokenKind,
    ) -> usize {
        let mut count = 0;
        while self.at(kind) {
            self.stream.advance();
            count += 1;
        }
        count
    }

    /// One or more line breaks, or the end of input
    pub fn line_break(&mut self) -> ParseResult<()> {
        if self.at_end() {
            return Ok(());
        }
        self.expect(TokenKind::Newline)?;
        self.skip(TokenKind::Newline);
        Ok(())
    }

    // ---- rule level ----

    /// Parse one node of `category`, trying candidates in priority order
    pub fn consume(
        &mut self,
        category: Category,
    ) -> ParseResult<Node> {
        self.attempt(category, false)
    }

    /// Parse a node of `category` that spans the entire stream
    pub fn parse(
        &mut self,
        category: Category,
    ) -> ParseResult<Node> {
        self.attempt(category, true)
    }

    fn attempt(
        &mut self,
        category: Category,
        whole: bool,
    ) -> ParseResult<Node> {
        let key = (category, self.stream.cursor(), whole);
        if let Some((outcome, end)) = self.memo.get(&key) {
            let (outcome, end) = (outcome.clone(), *end);
            tracing::trace!("memo hit for {} at token {}", category, key.1);
            self.stream.restore(end);
            return outcome;
        }

        let outcome = self.try_candidates(category, whole);
        self.memo
            .insert(key, (outcome.clone(), self.stream.snapshot()));
        outcome
    }

    fn try_candidates(
        &mut self,
        category: Category,
        whole: bool,
    ) -> ParseResult<Node> {
        let rules = self.rules;
        let candidates = rules.candidates(category);
        let mut deepest: Option<ParseError> = None;

        for entry in candidates {
            let snapshot = self.stream.snapshot();
            tracing::trace!("trying rule {} for {} at token {}", entry.name, category, snapshot.0);

            let outcome = (entry.rule)(self).and_then(|node| match self.stream.peek() {
                Some(token) if whole => Err(self.error(ParseErrorKind::TrailingInput(
                    format!("{} `{}`", token.kind, token.text),
                    node.category(),
                ))),
                _ => Ok(node),
            });

            match outcome {
                Ok(node) => return Ok(node),
                Err(err) => {
                    tracing::trace!("rule {} failed: {}", entry.name, err.kind);
                    self.stream.restore(snapshot);
                    deepest = match deepest {
                        Some(best) if best.progress > err.progress => Some(best),
                        _ => Some(err),
                    };
                }
            }
        }

        Err(deepest.unwrap_or_else(|| self.error(ParseErrorKind::NoRules(category))))
    }

    /// Repeat [`Parser::consume`] until it fails. Never fails itself.
    pub fn many(
        &mut self,
        category: Category,
    ) -> Vec<Node> {
        let mut nodes = Vec::new();
        while let Ok(node) = self.consume(category) {
            nodes.push(node);
        }
        nodes
    }

    /// Items of `category` separated by `separator` tokens
    ///
    /// A separator not followed by an item is left in the stream.
    pub fn sep_by(
        &mut self,
        category: Category,
        separator: TokenKind,
    ) -> Vec<Node> {
        let mut nodes = Vec::new();
        match self.consume(category) {
            Ok(node) => nodes.push(node),
            Err(_) => return nodes,
        }

        loop {
            let snapshot = self.stream.snapshot();
            let pair = self
                .expect(separator)
                .and_then(|_| self.consume(category));
            match pair {
                Ok(node) => nodes.push(node),
                Err(_) => {
                    self.stream.restore(snapshot);
                    return nodes;
                }
            }
        }
    }

    // ---- typed helpers ----

    pub fn expression(&mut self) -> ParseResult<Expr> {
        let node = self.consume(Category::Expression)?;
        self.typed(node, Category::Expression, Node::into_expr)
    }

    pub fn statement(&mut self) -> ParseResult<Stmt> {
        let node = self.consume(Category::Statement)?;
        self.typed(node, Category::Statement, Node::into_stmt)
    }

    /// Zero or more statements
    pub fn statements(&mut self) -> ParseResult<Vec<Stmt>> {
        self.many(Category::Statement)
            .into_iter()
            .map(|node| self.typed(node, Category::Statement, Node::into_stmt))
            .collect()
    }

    /// Zero or more expressions
    pub fn expressions(&mut self) -> ParseResult<Vec<Expr>> {
        self.many(Category::Expression)
            .into_iter()
            .map(|node| self.typed(node, Category::Expression, Node::into_expr))
            .collect()
    }

    /// Expressions separated by `separator`, see [`Parser::sep_by`]
    pub fn expression_list(
        &mut self,
        separator: TokenKind,
    ) -> ParseResult<Vec<Expr>> {
        self.sep_by(Category::Expression, separator)
            .into_iter()
            .map(|node| self.typed(node, Category::Expression, Node::into_expr))
            .collect()
    }

    /// Convert a node a rule returned, rejecting the wrong kind
    fn typed<T>(
        &self,
        node: Node,
        expected: Category,
        convert: fn(Node) -> Option<T>,
    ) -> ParseResult<T> {
        let found = node.category();
        convert(node).ok_or_else(|| self.error(ParseErrorKind::UnexpectedNode { expected, found }))
    }
}
