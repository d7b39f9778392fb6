//! Operator semantics
//!
//! Integers stay integers where the result is exact and fits; `/` always
//! produces a float. Bools count as integers. Chars join strings.

use std::cmp::Ordering;

use crate::frontend::parser::ast::{BinOp, CmpOp};
use crate::runtime::value::Value;
use crate::vm::errors::RuntimeErrorKind;

/// Longest string `*` may build, in bytes
pub const MAX_STRING_LEN: usize = 1 << 28;

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Bool(b) => Some(Number::Int(*b as i64)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

/// Text view of strings and chars
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.to_string()),
        Value::Char(c) => Some(c.to_string()),
        _ => None,
    }
}

fn mismatch(
    op: &'static str,
    lhs: &Value,
    rhs: &Value,
) -> RuntimeErrorKind {
    RuntimeErrorKind::TypeMismatch {
        op,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

/// Apply an arithmetic operator
pub fn binary(
    op: BinOp,
    lhs: &Value,
    rhs: &Value,
) -> Result<Value, RuntimeErrorKind> {
    if let (Some(a), Some(b)) = (Number::of(lhs), Number::of(rhs)) {
        return arithmetic(op, a, b);
    }

    match op {
        BinOp::Add => match (text(lhs), text(rhs)) {
            (Some(a), Some(b)) => Ok(Value::from(a + &b)),
            _ => Err(mismatch(op.symbol(), lhs, rhs)),
        },
        BinOp::Mul => {
            let (s, times) = match (text(lhs), Number::of(rhs), Number::of(lhs), text(rhs)) {
                (Some(s), Some(Number::Int(n)), _, _) | (_, _, Some(Number::Int(n)), Some(s)) => (s, n),
                _ => return Err(mismatch(op.symbol(), lhs, rhs)),
            };
            repeat(&s, times)
        }
        _ => Err(mismatch(op.symbol(), lhs, rhs)),
    }
}

/// `s` repeated `times` times; negative counts give an empty string
fn repeat(
    s: &str,
    times: i64,
) -> Result<Value, RuntimeErrorKind> {
    let times = usize::try_from(times).unwrap_or(0);
    match s.len().checked_mul(times) {
        Some(len) if len <= MAX_STRING_LEN => Ok(Value::from(s.repeat(times))),
        _ => Err(RuntimeErrorKind::StringTooLarge(
            s.len() as u128 * times as u128,
        )),
    }
}

fn arithmetic(
    op: BinOp,
    a: Number,
    b: Number,
) -> Result<Value, RuntimeErrorKind> {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        let checked = match op {
            BinOp::Add => x.checked_add(y),
            BinOp::Sub => x.checked_sub(y),
            BinOp::Mul => x.checked_mul(y),
            BinOp::Div => {
                if y == 0 {
                    return Err(RuntimeErrorKind::DivisionByZero);
                }
                return Ok(Value::Float(x as f64 / y as f64));
            }
            BinOp::Pow => {
                if y < 0 {
                    return Ok(Value::Float((x as f64).powf(y as f64)));
                }
                u32::try_from(y).ok().and_then(|e| x.checked_pow(e))
            }
        };
        return checked
            .map(Value::Int)
            .ok_or(RuntimeErrorKind::Overflow(op.symbol()));
    }

    let (x, y) = (a.as_f64(), b.as_f64());
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            if y == 0.0 {
                return Err(RuntimeErrorKind::DivisionByZero);
            }
            x / y
        }
        BinOp::Pow => x.powf(y),
    };
    Ok(Value::Float(result))
}

/// Apply a comparison operator
///
/// Equality never fails: values of unrelated types are simply unequal.
pub fn compare(
    op: CmpOp,
    lhs: &Value,
    rhs: &Value,
) -> Result<Value, RuntimeErrorKind> {
    let result = match op {
        CmpOp::Eq => equals(lhs, rhs),
        CmpOp::Ne => !equals(lhs, rhs),
        _ => {
            let Some(ordering) = order(lhs, rhs) else {
                return match (Number::of(lhs), Number::of(rhs)) {
                    // NaN involved
                    (Some(_), Some(_)) => Ok(Value::Bool(false)),
                    _ => Err(mismatch(op.symbol(), lhs, rhs)),
                };
            };
            match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::Gt => ordering == Ordering::Greater,
                CmpOp::Le => ordering != Ordering::Greater,
                CmpOp::Ge => ordering != Ordering::Less,
                CmpOp::Eq => ordering == Ordering::Equal,
                CmpOp::Ne => ordering != Ordering::Equal,
            }
        }
    };
    Ok(Value::Bool(result))
}

/// Structural equality with numeric and text coercion
pub fn equals(
    lhs: &Value,
    rhs: &Value,
) -> bool {
    if let (Some(a), Some(b)) = (Number::of(lhs), Number::of(rhs)) {
        return match (a, b) {
            (Number::Int(x), Number::Int(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        };
    }
    if let (Some(a), Some(b)) = (text(lhs), text(rhs)) {
        return a == b;
    }
    lhs == rhs
}

fn order(
    lhs: &Value,
    rhs: &Value,
) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (Number::of(lhs), Number::of(rhs)) {
        return match (a, b) {
            (Number::Int(x), Number::Int(y)) => Some(x.cmp(&y)),
            _ => a.as_f64().partial_cmp(&b.as_f64()),
        };
    }
    match (text(lhs), text(rhs)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => None,
    }
}
