//! Conversions

use super::{NativeContext, NativeExport, StdModule};
use crate::runtime::{Arity, Builtin, Value};
use crate::vm::errors::RuntimeErrorKind;

pub struct ConvertModule;

impl StdModule for ConvertModule {
    fn module_path(&self) -> &str {
        "convert"
    }

    fn exports(
        &self,
        _ctx: &NativeContext,
    ) -> Vec<NativeExport> {
        let number = Builtin::new("number", Arity::Exact(1), |args| to_number(&args[0]));
        vec![NativeExport::new("number(value)", number)]
    }
}

/// Integer where possible. Text with a fractional part becomes a float,
/// floats are truncated toward zero.
pub fn to_number(value: &Value) -> Result<Value, RuntimeErrorKind> {
    match value {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Float(f) => truncate(*f),
        Value::Str(s) => parse(s),
        Value::Char(c) => parse(&c.to_string()),
        other => Err(RuntimeErrorKind::Builtin(format!(
            "number(): cannot convert {} to a number",
            other.type_name()
        ))),
    }
}

fn truncate(f: f64) -> Result<Value, RuntimeErrorKind> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Ok(Value::Int(t as i64))
    } else {
        Err(RuntimeErrorKind::Builtin(format!(
            "number(): {} does not fit an int",
            f
        )))
    }
}

fn parse(text: &str) -> Result<Value, RuntimeErrorKind> {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Int(n));
    }
    match trimmed.parse::<f64>() {
        Ok(f) if trimmed.chars().any(|c| c.is_ascii_digit()) => Ok(Value::Float(f)),
        _ => Err(RuntimeErrorKind::Builtin(format!(
            "number(): invalid literal {:?}",
            text
        ))),
    }
}
