//! Lexer module
//!
//! Splits source text into [`Token`]s. Patterns are tried in a fixed
//! priority order (see [`TokenKind::ALL`]) rather than by longest match.

pub mod literals;
pub mod tokenizer;
pub mod tokens;

pub use tokenizer::{LexError, LexErrorKind, Tokenizer};
pub use tokens::{Token, TokenKind};

/// Tokenize source code lazily
pub fn tokenize(code: &str) -> Tokenizer<'_> {
    Tokenizer::new(code)
}

/// Tokenize source code, stopping at the first error
pub fn tokenize_all(code: &str) -> Result<Vec<Token>, LexError> {
    let tokens = tokenize(code)
        .inspect(|token| {
            if let Ok(token) = token {
                tracing::trace!("token {}", token);
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("tokenized {} tokens", tokens.len());
    Ok(tokens)
}
