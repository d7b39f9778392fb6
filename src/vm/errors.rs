//! VM errors

use thiserror::Error;

/// VM result
pub type VMResult<T> = Result<T, RuntimeError>;

/// What went wrong while executing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("name `{0}` is not defined")]
    UnresolvedName(String),

    #[error("`{name}` is a {type_name}, not a function")]
    NotCallable {
        name: String,
        type_name: &'static str,
    },

    #[error("{name}() takes {expected} argument(s), {found} given")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("unsupported operand types for {op}: {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {0}")]
    Overflow(&'static str),

    #[error("string of {0} bytes is too large")]
    StringTooLarge(u128),

    #[error("{0}")]
    Builtin(String),

    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Invalid operand: {0}")]
    InvalidOperand(u32),
}

/// Runtime error with the source line it happened on
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}", .line.map(|l| format!(" (line {})", l)).unwrap_or_default())]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: Option<usize>,
}

impl RuntimeError {
    pub fn new(
        kind: RuntimeErrorKind,
        line: Option<usize>,
    ) -> Self {
        Self { kind, line }
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        Self { kind, line: None }
    }
}
