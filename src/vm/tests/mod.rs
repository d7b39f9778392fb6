//! VM tests

use std::cell::Cell;
use std::rc::Rc;

use crate::middle::bytecode::Artifact;
use crate::middle::compiler::Compiler;
use crate::middle::ir::ConstValue;
use crate::middle::opcode::Instruction;
use crate::prelude::{Capture, Prelude};
use crate::runtime::{Arity, Builtin, Environment, Value};
use crate::vm::{
    call_entry_point, execute, execute_artifact_file, EnvMode, RuntimeError, RuntimeErrorKind,
    VMConfig, VM,
};
use crate::Error;

fn prelude() -> (Environment, Capture) {
    let out = Capture::new();
    let env = Prelude::new().with_output(out.clone()).with_seed(3).environment();
    (env, out)
}

fn run(
    code: &str,
    env: &mut Environment,
) -> Result<(), Error> {
    Compiler::from_source(code, None)?.execute(env, EnvMode::Alias)
}

fn runtime_error(
    code: &str,
    env: &mut Environment,
) -> RuntimeError {
    match run(code, env) {
        Err(Error::Runtime(err)) => err,
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

/// `main` that counts its calls
fn counting_main(calls: &Rc<Cell<usize>>) -> Value {
    let calls = Rc::clone(calls);
    Builtin::new("main", Arity::Exact(0), move |_| {
        calls.set(calls.get() + 1);
        Ok(Value::Nil)
    })
    .into()
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_declaration_binds_silently() {
        let (mut env, out) = prelude();
        run("open sluice\ndeclare x is 3 litres\nclose sluice\n", &mut env).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Int(3)));
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_countdown_prints_three_lines() {
        let (mut env, out) = prelude();
        let code = "open sluice
declare x is 3 litres
while (x > 0 litres)
    print(x)
    declare x is (x - 1 litre)
done
close sluice
";
        run(code, &mut env).unwrap();
        assert_eq!(out.lines(), vec!["3", "2", "1"]);
        assert_eq!(env.get("x"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_elseif_chain() {
        let (mut env, out) = prelude();
        let code = "open sluice
declare n is 2 litres
if (n == 1 litre)
    print(\"one\")
elseif (n == 2 litres)
    print(\"two\")
else
    print(\"many\")
end
close sluice
";
        run(code, &mut env).unwrap();
        assert_eq!(out.contents(), "two\n");
    }

    #[test]
    fn test_every_literal_kind() {
        let (mut env, _) = prelude();
        let code = "open sluice
declare i is 7 litres
declare f is 2.5 litres
declare c is 'q'
declare s is \"a\\tb\"
close sluice
";
        run(code, &mut env).unwrap();
        assert_eq!(env.get("i"), Some(&Value::Int(7)));
        assert_eq!(env.get("f"), Some(&Value::Float(2.5)));
        assert_eq!(env.get("c"), Some(&Value::Char('q')));
        assert_eq!(env.get("s"), Some(&Value::str("a\tb")));
        assert!(matches!(env.get("s"), Some(Value::Str(s)) if s.chars().count() == 3));
    }

    #[test]
    fn test_builtins_compose() {
        let (mut env, out) = prelude();
        run(
            "open sluice\nprint((number(\"40\") + 2 litres), random(5 litres, 5 litres))\nclose sluice\n",
            &mut env,
        )
        .unwrap();
        assert_eq!(out.contents(), "42 5\n");
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_unresolved_name_reports_line() {
        let (mut env, _) = prelude();
        let err = runtime_error("open sluice\ndeclare a is 1 litre\nprint(missing)\nclose sluice\n", &mut env);
        assert_eq!(err.kind, RuntimeErrorKind::UnresolvedName("missing".to_string()));
        assert_eq!(err.line, Some(3));
        assert_eq!(err.to_string(), "name `missing` is not defined (line 3)");
    }

    #[test]
    fn test_not_callable() {
        let (mut env, _) = prelude();
        let err = runtime_error("open sluice\ndeclare f is 1 litre\nf()\nclose sluice\n", &mut env);
        assert!(matches!(err.kind, RuntimeErrorKind::NotCallable { ref name, type_name: "int" } if name == "f"));
    }

    #[test]
    fn test_wrong_arity() {
        let (mut env, _) = prelude();
        let err = runtime_error("open sluice\nrandom(1 litre)\nclose sluice\n", &mut env);
        assert!(matches!(err.kind, RuntimeErrorKind::Arity { found: 1, .. }));
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_operator_type_mismatch() {
        let (mut env, _) = prelude();
        let err = runtime_error("open sluice\n(\"a\" - 1 litre)\nclose sluice\n", &mut env);
        assert_eq!(
            err.kind,
            RuntimeErrorKind::TypeMismatch {
                op: "-",
                lhs: "string",
                rhs: "int"
            }
        );
    }

    #[test]
    fn test_division_by_zero() {
        let (mut env, _) = prelude();
        let err = runtime_error("open sluice\n\ndeclare z is (1 litre / 0 litres)\nclose sluice\n", &mut env);
        assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_huge_string_repetition() {
        let (mut env, _) = prelude();
        let err = runtime_error(
            "open sluice\ndeclare s is (\"ab\" * 9223372036854775807 litres)\nclose sluice\n",
            &mut env,
        );
        assert!(matches!(err.kind, RuntimeErrorKind::StringTooLarge(_)));
        assert_eq!(err.line, Some(2));
        assert!(env.get("s").is_none());
    }

    #[test]
    fn test_failed_run_keeps_earlier_bindings() {
        let (mut env, _) = prelude();
        runtime_error("open sluice\ndeclare a is 1 litre\nnope()\nclose sluice\n", &mut env);
        assert_eq!(env.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_stack_underflow_in_handmade_code() {
        let artifact = Artifact {
            code: vec![Instruction::Pop],
            lines: vec![9],
            ..Artifact::default()
        };
        let mut env = Environment::new();
        let err = VM::new(&mut env).run(&artifact).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::StackUnderflow);
        assert_eq!(err.line, Some(9));
    }
}

#[cfg(test)]
mod execution_tests {
    use super::*;

    fn store_one() -> Artifact {
        Artifact {
            constants: vec![ConstValue::Int(1)],
            names: vec!["one".to_string()],
            code: vec![Instruction::LoadConst(0), Instruction::StoreName(0)],
            lines: vec![1, 1],
            ..Artifact::default()
        }
    }

    #[test]
    fn test_copy_and_alias_modes() {
        let artifact = store_one();
        let mut env = Environment::new();

        execute(&artifact, &mut env, EnvMode::Copy).unwrap();
        assert!(env.get("one").is_none());

        execute(&artifact, &mut env, EnvMode::Alias).unwrap();
        assert_eq!(env.get("one"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_jumps_skip_code() {
        let artifact = Artifact {
            constants: vec![ConstValue::Int(0), ConstValue::Int(1)],
            names: vec!["x".to_string()],
            code: vec![
                Instruction::LoadConst(0),
                Instruction::JumpIfFalse(4),
                Instruction::LoadConst(1),
                Instruction::StoreName(0),
            ],
            lines: vec![1; 4],
            ..Artifact::default()
        };
        let mut env = Environment::new();
        VM::with_config(&mut env, VMConfig::default()).run(&artifact).unwrap();
        assert!(env.get("x").is_none());
    }

    #[test]
    fn test_entry_point_convention() {
        let calls = Rc::new(Cell::new(0));
        let mut env = Environment::new();
        assert_eq!(call_entry_point(&env), Ok(false));

        env.define("main", Value::Int(1));
        assert_eq!(call_entry_point(&env), Ok(false));

        env.define("main", counting_main(&calls));
        assert_eq!(call_entry_point(&env), Ok(true));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_artifact_file_runs_main() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.sluc");
        store_one().save(&path).unwrap();

        let calls = Rc::new(Cell::new(0));
        let mut env = Environment::new();
        env.define("main", counting_main(&calls));

        execute_artifact_file(&path, &mut env, EnvMode::Copy).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(env.get("one").is_none());

        execute_artifact_file(&path, &mut env, EnvMode::Alias).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(env.get("one"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_artifact_file_must_be_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.sluc");
        std::fs::write(&path, b"junk").unwrap();

        let mut env = Environment::new();
        let err = execute_artifact_file(&path, &mut env, EnvMode::Copy).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
    }
}
