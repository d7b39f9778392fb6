//! Lazy, priority-ordered tokenizer

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::{Token, TokenKind};
use crate::util::diagnostic::render_snippet;
use crate::util::span::{Position, Span};

/// Compiled pattern table, anchored at the cursor
static PATTERNS: Lazy<Vec<(TokenKind, Regex)>> = Lazy::new(|| {
    TokenKind::ALL
        .iter()
        .map(|&kind| {
            let anchored = format!(r"\A(?:{})", kind.pattern());
            let regex = Regex::new(&anchored)
                .unwrap_or_else(|e| panic!("invalid pattern for {:?}: {}", kind, e));
            (kind, regex)
        })
        .collect()
});

static BLOCK_COMMENT_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(TokenKind::BlockCommentEnd.pattern())
        .unwrap_or_else(|e| panic!("invalid block comment pattern: {}", e))
});

/// Reason a lexical scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("no token matches the input")]
    NoMatch,
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// Lexical error
///
/// Carries the unconsumed remainder of the input together with the full
/// source text so it can be rendered with a caret under the failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub remaining: String,
    pub position: Position,
    code: Arc<str>,
}

impl LexError {
    /// Full source text the error was raised against
    pub fn source_text(&self) -> &str {
        &self.code
    }

    /// Render a caret diagnostic for this error
    pub fn render(
        &self,
        source_name: &str,
    ) -> String {
        let found: String = self.remaining.chars().take(12).collect();
        let message = match self.kind {
            LexErrorKind::NoMatch => format!("{} near {:?}", self.kind, found),
            LexErrorKind::UnterminatedComment => self.kind.to_string(),
        };
        render_snippet(source_name, &self.code, self.position, &message)
    }
}

/// Tokenizer over a source string
///
/// Yields tokens lazily. After the first error the iterator is exhausted.
pub struct Tokenizer<'a> {
    code: &'a str,
    shared: Option<Arc<str>>,
    rest: &'a str,
    position: Position,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self {
            code,
            shared: None,
            rest: code,
            position: Position::start(),
            failed: false,
        }
    }

    /// Position of the next unconsumed character
    pub fn position(&self) -> Position {
        self.position
    }

    /// Unconsumed input
    pub fn remaining(&self) -> &'a str {
        self.rest
    }

    fn error(
        &mut self,
        kind: LexErrorKind,
        at: Position,
    ) -> LexError {
        self.failed = true;
        let code = self
            .shared
            .get_or_insert_with(|| Arc::from(self.code))
            .clone();
        LexError {
            kind,
            remaining: self.code[at.offset..].to_string(),
            position: at,
            code,
        }
    }

    /// Advance the cursor over `len` bytes of the remaining input
    fn advance(
        &mut self,
        len: usize,
    ) -> &'a str {
        let (taken, rest) = self.rest.split_at(len);
        self.position.feed(taken);
        self.rest = rest;
        taken
    }

    /// Skip the body of a block comment, up to and including its terminator
    fn skip_block_comment(
        &mut self,
        opened_at: Position,
    ) -> Result<(), LexError> {
        match BLOCK_COMMENT_END.find(self.rest) {
            Some(found) => {
                self.advance(found.end());
                Ok(())
            }
            None => Err(self.error(LexErrorKind::UnterminatedComment, opened_at)),
        }
    }

    /// Skip to the end of the line, leaving the line break in place
    fn skip_line_comment(&mut self) {
        let len = self.rest.find(['\r', '\n']).unwrap_or(self.rest.len());
        self.advance(len);
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while !self.rest.is_empty() {
            let matched = PATTERNS
                .iter()
                .find_map(|(kind, regex)| regex.find(self.rest).map(|m| (*kind, m.end())))
                .filter(|&(_, len)| len > 0);

            let Some((kind, len)) = matched else {
                let at = self.position;
                return Some(Err(self.error(LexErrorKind::NoMatch, at)));
            };

            let start = self.position;
            let text = self.advance(len);

            match kind {
                TokenKind::LineComment => self.skip_line_comment(),
                TokenKind::BlockCommentStart => {
                    if let Err(err) = self.skip_block_comment(start) {
                        return Some(Err(err));
                    }
                }
                kind if kind.is_trivia() => {}
                kind => {
                    let span = Span::new(start, self.position);
                    return Some(Ok(Token::new(kind, text, span)));
                }
            }
        }

        None
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}
