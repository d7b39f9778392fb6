//! Random numbers

use std::rc::Rc;

use rand::Rng;

use super::{NativeContext, NativeExport, StdModule};
use crate::runtime::{Arity, Builtin, Value};
use crate::vm::errors::RuntimeErrorKind;

pub struct MathModule;

impl StdModule for MathModule {
    fn module_path(&self) -> &str {
        "math"
    }

    fn exports(
        &self,
        ctx: &NativeContext,
    ) -> Vec<NativeExport> {
        let rng = Rc::clone(&ctx.rng);
        let random = Builtin::new("random", Arity::Exact(2), move |args| {
            let (low, high) = bounds(args)?;
            Ok(Value::Int(rng.borrow_mut().random_range(low..=high)))
        });
        vec![NativeExport::new("random(low, high)", random)]
    }
}

/// Integer bounds of an inclusive range
fn bounds(args: &[Value]) -> Result<(i64, i64), RuntimeErrorKind> {
    match args {
        [Value::Int(low), Value::Int(high)] if low <= high => Ok((*low, *high)),
        [Value::Int(low), Value::Int(high)] => Err(RuntimeErrorKind::Builtin(format!(
            "random(): empty range {}..{}",
            low, high
        ))),
        [low, high] => Err(RuntimeErrorKind::Builtin(format!(
            "random(): bounds must be int, got {} and {}",
            low.type_name(),
            high.type_name()
        ))),
        _ => Err(RuntimeErrorKind::Builtin(
            "random(): expected two bounds".to_string(),
        )),
    }
}
