//! Prelude tests

use std::io::Cursor;

use crate::prelude::convert::to_number;
use crate::prelude::{Capture, Prelude};
use crate::runtime::{Environment, Value};
use crate::vm::errors::RuntimeErrorKind;

fn call(
    env: &Environment,
    name: &str,
    args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    match env.get(name) {
        Some(Value::Builtin(builtin)) => builtin.call(args),
        other => panic!("{} is not a builtin: {:?}", name, other),
    }
}

#[cfg(test)]
mod environment_tests {
    use super::*;

    #[test]
    fn test_base_environment_names() {
        let env = Prelude::new().with_output(Capture::new()).environment();
        for name in ["print", "input", "random", "number"] {
            assert!(env.get(name).is_some_and(Value::is_callable), "{}", name);
        }
        assert_eq!(env.bindings().len(), 4);
    }

    #[test]
    fn test_export_signatures() {
        let exports = Prelude::new().exports();
        let print = exports.iter().find(|e| e.name == "print").unwrap();
        assert_eq!(print.signature, "print(...values)");
        assert_eq!(print.builtin.name(), "print");
    }
}

#[cfg(test)]
mod io_tests {
    use super::*;

    #[test]
    fn test_print_one_line_per_call() {
        let out = Capture::new();
        let env = Prelude::new().with_output(out.clone()).environment();

        assert_eq!(call(&env, "print", &[Value::Int(3)]), Ok(Value::Nil));
        call(&env, "print", &[Value::str("a"), Value::Float(2.0), Value::Char('c')]).unwrap();
        call(&env, "print", &[]).unwrap();

        assert_eq!(out.contents(), "3\na 2.0 c\n\n");
    }

    #[test]
    fn test_input_strips_terminator() {
        let env = Prelude::new()
            .with_output(Capture::new())
            .with_input(Cursor::new("first\r\nsecond\nlast"))
            .environment();

        assert_eq!(call(&env, "input", &[]), Ok(Value::str("first")));
        assert_eq!(call(&env, "input", &[]), Ok(Value::str("second")));
        assert_eq!(call(&env, "input", &[]), Ok(Value::str("last")));
        assert!(matches!(call(&env, "input", &[]), Err(RuntimeErrorKind::Builtin(_))));
    }

    #[test]
    fn test_input_prompt_goes_to_output() {
        let out = Capture::new();
        let env = Prelude::new()
            .with_output(out.clone())
            .with_input(Cursor::new("42\n"))
            .environment();

        assert_eq!(call(&env, "input", &[Value::str("? ")]), Ok(Value::str("42")));
        assert_eq!(out.contents(), "? ");
    }

    #[test]
    fn test_input_arity() {
        let env = Prelude::new().with_input(Cursor::new("")).environment();
        let err = call(&env, "input", &[Value::Int(1), Value::Int(2)]).unwrap_err();
        assert_eq!(err.to_string(), "input() takes 0 to 1 argument(s), 2 given");
    }
}

#[cfg(test)]
mod math_tests {
    use super::*;

    #[test]
    fn test_random_within_inclusive_bounds() {
        let env = Prelude::new().with_seed(7).environment();
        let mut seen = [false; 3];
        for _ in 0..200 {
            match call(&env, "random", &[Value::Int(1), Value::Int(3)]) {
                Ok(Value::Int(n)) => {
                    assert!((1..=3).contains(&n));
                    seen[(n - 1) as usize] = true;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_random_seed_is_reproducible() {
        let draw = |seed| {
            let env = Prelude::new().with_seed(seed).environment();
            (0..10)
                .map(|_| call(&env, "random", &[Value::Int(0), Value::Int(1000)]).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
    }

    #[test]
    fn test_random_single_point() {
        let env = Prelude::new().with_seed(1).environment();
        assert_eq!(call(&env, "random", &[Value::Int(5), Value::Int(5)]), Ok(Value::Int(5)));
    }

    #[test]
    fn test_random_rejects_bad_bounds() {
        let env = Prelude::new().with_seed(1).environment();
        assert!(call(&env, "random", &[Value::Int(3), Value::Int(1)]).is_err());
        assert!(call(&env, "random", &[Value::Float(1.0), Value::Int(3)]).is_err());
        assert!(matches!(
            call(&env, "random", &[Value::Int(1)]),
            Err(RuntimeErrorKind::Arity { found: 1, .. })
        ));
    }
}

#[cfg(test)]
mod convert_tests {
    use super::*;

    #[test]
    fn test_number_from_text() {
        assert_eq!(to_number(&Value::str("42")), Ok(Value::Int(42)));
        assert_eq!(to_number(&Value::str(" -7\n")), Ok(Value::Int(-7)));
        assert_eq!(to_number(&Value::str("2.5")), Ok(Value::Float(2.5)));
        assert_eq!(to_number(&Value::Char('9')), Ok(Value::Int(9)));
    }

    #[test]
    fn test_number_from_numbers() {
        assert_eq!(to_number(&Value::Int(3)), Ok(Value::Int(3)));
        assert_eq!(to_number(&Value::Float(3.9)), Ok(Value::Int(3)));
        assert_eq!(to_number(&Value::Float(-3.9)), Ok(Value::Int(-3)));
        assert_eq!(to_number(&Value::Bool(true)), Ok(Value::Int(1)));
    }

    #[test]
    fn test_number_rejects_garbage() {
        for bad in ["", "abc", "inf", "NaN", "1 2"] {
            assert!(to_number(&Value::str(bad)).is_err(), "{:?}", bad);
        }
        assert!(to_number(&Value::Float(f64::NAN)).is_err());
        assert!(to_number(&Value::Float(1e300)).is_err());
        assert!(to_number(&Value::Nil).is_err());
    }
}
