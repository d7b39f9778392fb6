//! Runtime values
//!
//! Values are cheap to clone: strings and builtins are reference counted.

use std::fmt;
use std::rc::Rc;

use crate::middle::ir::ConstValue;
use crate::vm::errors::RuntimeErrorKind;

/// Native function body
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeErrorKind>>;

/// Accepted argument count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive bounds
    Range(usize, usize),
    Variadic,
}

impl Arity {
    pub fn accepts(
        self,
        count: usize,
    ) -> bool {
        match self {
            Arity::Exact(n) => n == count,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
            Arity::Variadic => write!(f, "any number of"),
        }
    }
}

/// Host function callable from Sluice
#[derive(Clone)]
pub struct Builtin {
    name: Rc<str>,
    arity: Arity,
    func: NativeFn,
}

impl Builtin {
    pub fn new(
        name: &str,
        arity: Arity,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeErrorKind> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            arity,
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Check the argument count, then run
    pub fn call(
        &self,
        args: &[Value],
    ) -> Result<Value, RuntimeErrorKind> {
        if !self.arity.accepts(args.len()) {
            return Err(RuntimeErrorKind::Arity {
                name: self.name.to_string(),
                expected: self.arity.to_string(),
                found: args.len(),
            });
        }
        (self.func)(args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(Rc<str>),
    Builtin(Builtin),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Zero, empty and nil are false
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Char(_) => true,
            Value::Str(s) => !s.is_empty(),
            Value::Builtin(_) => true,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Builtin(_))
    }

    /// Source-like rendering, used by the shell
    pub fn repr(&self) -> String {
        match self {
            Value::Char(c) => format!("{:?}", c),
            Value::Str(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name()),
        }
    }
}

impl From<&ConstValue> for Value {
    fn from(constant: &ConstValue) -> Self {
        match constant {
            ConstValue::Int(n) => Value::Int(*n),
            ConstValue::Float(f) => Value::Float(*f),
            ConstValue::Char(c) => Value::Char(*c),
            ConstValue::String(s) => Value::str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Builtin> for Value {
    fn from(b: Builtin) -> Self {
        Value::Builtin(b)
    }
}
