//! Runtime values of the miro language.

pub mod builtins;
pub mod env;
pub mod object;

pub use builtins::BuiltinVars;
pub use env::{Environment, SharedEnv};

use std::fmt;
use std::rc::Rc;

/// A runtime value: the closed sum of everything an expression can
/// evaluate to.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Nil,
    Object(Rc<object::Obj>),
}

impl Value {
    pub fn new_string(str: String) -> Self {
        Value::Object(Rc::new(object::Obj::new_string(str)))
    }

    pub fn new_fn(decl: Rc<miro_parser::ast::FnDecl>, closure: SharedEnv) -> Self {
        Value::Object(Rc::new(object::Obj::new_fn(decl, closure)))
    }

    /// Attempts to cast the `Value` into a `&str` or `None` if wrong type.
    pub fn cast_to_str(&self) -> Option<&str> {
        match self {
            Self::Object(obj) => match &obj.kind {
                object::ObjKind::Str(string) => Some(string),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn cast_to_number(&self) -> Option<f64> {
        match self {
            Self::Number(val) => Some(*val),
            _ => None,
        }
    }

    /// `nil` and `false` are falsy; every other value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(val) => *val,
            _ => true,
        }
    }

    fn print_obj(f: &mut fmt::Formatter<'_>, obj: &object::Obj) -> fmt::Result {
        use object::ObjKind;
        match &obj.kind {
            ObjKind::Str(str) => write!(f, "{}", str),
            ObjKind::Fn(func) => write!(f, "<fn {}>", func.decl.name.lexeme),
            ObjKind::NativeFn(object::NativeFn { ident, .. }) => {
                write!(f, "<native fn {}>", ident)
            }
        }
    }
}

/// Type-aware value equality: `nil` equals only `nil`, numbers follow
/// IEEE `==` (`NaN != NaN`), strings compare by content, functions by
/// identity; values of different runtime types are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Nil, Value::Nil) => true,
            (Value::Object(l), Value::Object(r)) => match (&l.kind, &r.kind) {
                (object::ObjKind::Str(l), object::ObjKind::Str(r)) => l == r,
                _ => Rc::ptr_eq(l, r),
            },
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(val) => write!(f, "{}", val),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Nil => write!(f, "nil"),
            Value::Object(val) => Self::print_obj(f, val),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::new_string("hi".to_string()).to_string(), "hi");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        // Zero and the empty string are truthy.
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::new_string(String::new()).is_truthy());
    }

    #[test]
    fn equality() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_eq!(
            Value::new_string("a".to_string()),
            Value::new_string("a".to_string())
        );

        // Cross-type comparisons are never equal, never an error.
        assert_ne!(Value::Number(0.0), Value::Bool(false));
        assert_ne!(Value::Number(0.0), Value::Nil);
        assert_ne!(Value::new_string("1".to_string()), Value::Number(1.0));

        // IEEE: NaN is not equal to itself.
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }
}
