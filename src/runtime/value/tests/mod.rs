//! Runtime value tests

use crate::runtime::value::*;
use crate::vm::errors::RuntimeErrorKind;

#[cfg(test)]
mod display_tests {
    use super::*;

    #[test]
    fn test_float_display() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn test_display_and_repr() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::str("a\tb").to_string(), "a\tb");
        assert_eq!(Value::str("a\tb").repr(), "\"a\\tb\"");
        assert_eq!(Value::Char('x').repr(), "'x'");
        assert_eq!(Value::Bool(true).repr(), "true");
    }
}

#[cfg(test)]
mod truthiness_tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(Value::str("0").is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Char('\0').is_truthy());
    }
}

#[cfg(test)]
mod builtin_tests {
    use super::*;

    fn double() -> Builtin {
        Builtin::new("double", Arity::Exact(1), |args| match &args[0] {
            Value::Int(n) => Ok(Value::Int(n * 2)),
            other => Err(RuntimeErrorKind::Builtin(format!(
                "double() needs an int, got {}",
                other.type_name()
            ))),
        })
    }

    #[test]
    fn test_call_checks_arity() {
        let f = double();
        assert_eq!(f.call(&[Value::Int(4)]), Ok(Value::Int(8)));
        assert!(matches!(
            f.call(&[]),
            Err(RuntimeErrorKind::Arity { found: 0, .. })
        ));
    }

    #[test]
    fn test_variadic() {
        let count = Builtin::new("count", Arity::Variadic, |args| Ok(Value::Int(args.len() as i64)));
        assert_eq!(count.call(&[Value::Nil, Value::Nil]), Ok(Value::Int(2)));
    }

    #[test]
    fn test_builtin_identity() {
        let f = double();
        let g = double();
        assert_eq!(Value::Builtin(f.clone()), Value::Builtin(f));
        assert_ne!(Value::Builtin(g), Value::Builtin(double()));
        assert_eq!(Value::Builtin(double()).to_string(), "<builtin double>");
    }
}
