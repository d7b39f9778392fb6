//! Console input and output

use std::io::{BufRead, Write};
use std::rc::Rc;

use super::{Input, NativeContext, NativeExport, Output, StdModule};
use crate::runtime::{Arity, Builtin, Value};
use crate::vm::errors::RuntimeErrorKind;

/// IO module implementation.
pub struct IoModule;

impl StdModule for IoModule {
    fn module_path(&self) -> &str {
        "io"
    }

    fn exports(
        &self,
        ctx: &NativeContext,
    ) -> Vec<NativeExport> {
        let output = Rc::clone(&ctx.output);
        let print = Builtin::new("print", Arity::Variadic, move |args| {
            native_print(&output, args)
        });

        let output = Rc::clone(&ctx.output);
        let input = Rc::clone(&ctx.input);
        let read = Builtin::new("input", Arity::Range(0, 1), move |args| {
            native_input(&output, &input, args)
        });

        vec![
            NativeExport::new("print(...values)", print),
            NativeExport::new("input(prompt?)", read),
        ]
    }
}

fn failure(
    name: &str,
    err: std::io::Error,
) -> RuntimeErrorKind {
    RuntimeErrorKind::Builtin(format!("{}(): {}", name, err))
}

/// Values joined by a space, one line per call
fn native_print(
    output: &Output,
    args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<String>>()
        .join(" ");
    let mut out = output.borrow_mut();
    writeln!(out, "{}", line)
        .and_then(|_| out.flush())
        .map_err(|e| failure("print", e))?;
    Ok(Value::Nil)
}

/// One line from the input source, without its terminator
fn native_input(
    output: &Output,
    input: &Input,
    args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    if let Some(prompt) = args.first() {
        let mut out = output.borrow_mut();
        write!(out, "{}", prompt)
            .and_then(|_| out.flush())
            .map_err(|e| failure("input", e))?;
    }

    let mut line = String::new();
    let read = read_line(input, &mut line).map_err(|e| failure("input", e))?;
    if read == 0 {
        return Err(RuntimeErrorKind::Builtin(
            "input(): end of input".to_string(),
        ));
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::from(line))
}

fn read_line(
    input: &Input,
    line: &mut String,
) -> std::io::Result<usize> {
    input.borrow_mut().read_line(line)
}
