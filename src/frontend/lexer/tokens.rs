//! Token types

use std::fmt;

use crate::util::span::Span;

/// Token kind
///
/// The declaration order of [`TokenKind::ALL`] is the matching priority:
/// the tokenizer tries each pattern in turn and keeps the first match, so
/// keywords sit before identifiers and comment openers before `/` and `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Trivia
    LineComment,
    BlockCommentStart,
    BlockCommentEnd,

    // Keywords
    ProgramStart,
    ProgramEnd,
    ElseIf,
    Else,
    End,
    While,
    Done,
    Declare,
    Is,
    If,

    // Delimiters
    Comma,
    LParen,
    RParen,

    // Operators
    CmpOp,
    BinOp,

    // Literals
    CharLiteral,
    StringLiteral,
    FloatLiteral,
    IntLiteral,

    // Identifiers
    Identifier,

    // Layout
    Newline,
    Whitespace,
}

impl TokenKind {
    /// Every kind, in matching priority order
    pub const ALL: [TokenKind; 25] = [
        TokenKind::LineComment,
        TokenKind::BlockCommentStart,
        TokenKind::BlockCommentEnd,
        TokenKind::ProgramStart,
        TokenKind::ProgramEnd,
        TokenKind::ElseIf,
        TokenKind::Else,
        TokenKind::End,
        TokenKind::While,
        TokenKind::Done,
        TokenKind::Declare,
        TokenKind::Is,
        TokenKind::If,
        TokenKind::Comma,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::CmpOp,
        TokenKind::BinOp,
        TokenKind::CharLiteral,
        TokenKind::StringLiteral,
        TokenKind::FloatLiteral,
        TokenKind::IntLiteral,
        TokenKind::Identifier,
        TokenKind::Newline,
        TokenKind::Whitespace,
    ];

    /// Regular expression recognising this kind (unanchored)
    pub fn pattern(self) -> &'static str {
        match self {
            TokenKind::LineComment => r"//",
            TokenKind::BlockCommentStart => r"/\*",
            TokenKind::BlockCommentEnd => r"\*/",
            TokenKind::ProgramStart => r"open[ \t]+sluice\b",
            TokenKind::ProgramEnd => r"close[ \t]+sluice\b",
            TokenKind::ElseIf => r"elseif\b",
            TokenKind::Else => r"else\b",
            TokenKind::End => r"end\b",
            TokenKind::While => r"while\b",
            TokenKind::Done => r"done\b",
            TokenKind::Declare => r"declare\b",
            TokenKind::Is => r"is\b",
            TokenKind::If => r"if\b",
            TokenKind::Comma => r",",
            TokenKind::LParen => r"\(",
            TokenKind::RParen => r"\)",
            TokenKind::CmpOp => r"==|!=|<=|>=|<|>",
            TokenKind::BinOp => r"\+|-|\*|/|\^",
            TokenKind::CharLiteral => r"'(?:[^'\\\r\n]|\\[^\r\n])+'",
            TokenKind::StringLiteral => r#""(?:[^"\\\r\n]|\\.)*""#,
            TokenKind::FloatLiteral => r"[0-9]+\.[0-9]+[ \t]+litres?\b",
            TokenKind::IntLiteral => r"[0-9]+[ \t]+litres?\b",
            TokenKind::Identifier => r"[A-Za-z_]\w*",
            TokenKind::Newline => r"[\r\n]+",
            TokenKind::Whitespace => r"[^\S\r\n]+",
        }
    }

    /// Human readable name used in diagnostics
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::LineComment => "`//`",
            TokenKind::BlockCommentStart => "`/*`",
            TokenKind::BlockCommentEnd => "`*/`",
            TokenKind::ProgramStart => "`open sluice`",
            TokenKind::ProgramEnd => "`close sluice`",
            TokenKind::ElseIf => "`elseif`",
            TokenKind::Else => "`else`",
            TokenKind::End => "`end`",
            TokenKind::While => "`while`",
            TokenKind::Done => "`done`",
            TokenKind::Declare => "`declare`",
            TokenKind::Is => "`is`",
            TokenKind::If => "`if`",
            TokenKind::Comma => "`,`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::CmpOp => "comparison operator",
            TokenKind::BinOp => "arithmetic operator",
            TokenKind::CharLiteral => "char literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Newline => "line break",
            TokenKind::Whitespace => "whitespace",
        }
    }

    /// Kinds that are matched but never emitted
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockCommentStart | TokenKind::Whitespace
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact text consumed by the match
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{:<20} {:<24} {}:{}",
            format!("{:?}", self.kind),
            format!("{:?}", self.text),
            self.span.start.line,
            self.span.start.column
        )
    }
}
