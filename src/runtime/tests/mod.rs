//! Runtime tests

use crate::frontend::parser::ast::{BinOp, CmpOp};
use crate::runtime::operations::{binary, compare, equals, MAX_STRING_LEN};
use crate::runtime::{Environment, Value};
use crate::vm::errors::RuntimeErrorKind;

#[cfg(test)]
mod arithmetic_tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(binary(BinOp::Add, &Value::Int(2), &Value::Int(3)), Ok(Value::Int(5)));
        assert_eq!(binary(BinOp::Sub, &Value::Int(2), &Value::Int(3)), Ok(Value::Int(-1)));
        assert_eq!(binary(BinOp::Mul, &Value::Int(4), &Value::Int(3)), Ok(Value::Int(12)));
        assert_eq!(binary(BinOp::Pow, &Value::Int(2), &Value::Int(10)), Ok(Value::Int(1024)));
    }

    #[test]
    fn test_division_is_float() {
        assert_eq!(binary(BinOp::Div, &Value::Int(7), &Value::Int(2)), Ok(Value::Float(3.5)));
        assert_eq!(binary(BinOp::Div, &Value::Int(6), &Value::Int(3)), Ok(Value::Float(2.0)));
        assert_eq!(
            binary(BinOp::Div, &Value::Int(1), &Value::Int(0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
        assert_eq!(
            binary(BinOp::Div, &Value::Float(1.0), &Value::Float(0.0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
    }

    #[test]
    fn test_mixed_numbers() {
        assert_eq!(binary(BinOp::Add, &Value::Int(1), &Value::Float(0.5)), Ok(Value::Float(1.5)));
        assert_eq!(binary(BinOp::Pow, &Value::Int(2), &Value::Int(-1)), Ok(Value::Float(0.5)));
        assert_eq!(binary(BinOp::Add, &Value::Bool(true), &Value::Int(1)), Ok(Value::Int(2)));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            binary(BinOp::Add, &Value::Int(i64::MAX), &Value::Int(1)),
            Err(RuntimeErrorKind::Overflow("+"))
        );
        assert_eq!(
            binary(BinOp::Pow, &Value::Int(10), &Value::Int(100)),
            Err(RuntimeErrorKind::Overflow("^"))
        );
    }

    #[test]
    fn test_text_operations() {
        assert_eq!(binary(BinOp::Add, &Value::str("ab"), &Value::Char('c')), Ok(Value::str("abc")));
        assert_eq!(binary(BinOp::Mul, &Value::str("ab"), &Value::Int(3)), Ok(Value::str("ababab")));
        assert_eq!(binary(BinOp::Mul, &Value::Int(2), &Value::Char('x')), Ok(Value::str("xx")));
        assert_eq!(binary(BinOp::Mul, &Value::str("ab"), &Value::Int(-2)), Ok(Value::str("")));
    }

    #[test]
    fn test_huge_repetition_is_an_error() {
        assert_eq!(
            binary(BinOp::Mul, &Value::str("ab"), &Value::Int(i64::MAX)),
            Err(RuntimeErrorKind::StringTooLarge(2 * i64::MAX as u128))
        );
        let limit = MAX_STRING_LEN as i64;
        assert!(matches!(
            binary(BinOp::Mul, &Value::Int(limit + 1), &Value::Char('x')),
            Err(RuntimeErrorKind::StringTooLarge(_))
        ));
        assert_eq!(binary(BinOp::Mul, &Value::str(""), &Value::Int(i64::MAX)), Ok(Value::str("")));
    }

    #[test]
    fn test_type_mismatch() {
        assert_eq!(
            binary(BinOp::Sub, &Value::str("a"), &Value::Int(1)),
            Err(RuntimeErrorKind::TypeMismatch {
                op: "-",
                lhs: "string",
                rhs: "int"
            })
        );
        assert!(binary(BinOp::Add, &Value::Nil, &Value::Int(1)).is_err());
    }
}

#[cfg(test)]
mod comparison_tests {
    use super::*;

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(compare(CmpOp::Lt, &Value::Int(1), &Value::Float(1.5)), Ok(Value::Bool(true)));
        assert_eq!(compare(CmpOp::Ge, &Value::Int(2), &Value::Int(2)), Ok(Value::Bool(true)));
        assert_eq!(compare(CmpOp::Gt, &Value::Float(f64::NAN), &Value::Int(0)), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_equality_across_types() {
        assert!(equals(&Value::Int(1), &Value::Float(1.0)));
        assert!(equals(&Value::Char('a'), &Value::str("a")));
        assert!(!equals(&Value::Int(1), &Value::str("1")));
        assert!(equals(&Value::Nil, &Value::Nil));
        assert_eq!(compare(CmpOp::Ne, &Value::Nil, &Value::Int(0)), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_text_ordering() {
        assert_eq!(compare(CmpOp::Lt, &Value::str("abc"), &Value::str("abd")), Ok(Value::Bool(true)));
        assert!(compare(CmpOp::Lt, &Value::str("a"), &Value::Int(1)).is_err());
    }
}

#[cfg(test)]
mod environment_tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1));
        env.define("x", Value::Int(2));
        assert_eq!(env.get("x"), Some(&Value::Int(2)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_inner_scope_shadows() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1));
        env.push_scope();
        env.define("x", Value::Int(2));
        env.define("y", Value::Int(3));
        assert_eq!(env.get("x"), Some(&Value::Int(2)));
        assert_eq!(env.bindings().len(), 2);

        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
        assert!(!env.contains("y"));
    }

    #[test]
    fn test_outermost_scope_stays() {
        let mut env = Environment::new();
        assert!(env.pop_scope().is_none());
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1));
        let mut copy = env.clone();
        copy.define("x", Value::Int(9));
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
    }
}
