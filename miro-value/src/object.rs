use crate::env::SharedEnv;
use crate::Value;
use log::trace;
use miro_parser::ast::FnDecl;
use std::rc::Rc;

/// A native (host-provided) function.
///
/// Natives perform their own side effects and never touch interpreter
/// environments; arity checking happens at the call site.
#[derive(Clone)]
pub struct NativeFn {
    pub ident: String,
    /// Number of arguments that the function accepts.
    pub arity: usize,
    pub func: &'static dyn Fn(&mut [Value]) -> Value,
}

/// A user-defined function: its declaration plus the environment captured
/// at the point of definition.
#[derive(Clone)]
pub struct Function {
    pub decl: Rc<FnDecl>,
    pub closure: SharedEnv,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }
}

#[derive(Clone)]
pub enum ObjKind {
    Str(String),
    Fn(Function),
    NativeFn(NativeFn),
}

#[derive(Clone)]
pub struct Obj {
    pub kind: ObjKind,
}

impl Obj {
    pub fn new_string(str: String) -> Self {
        Self {
            kind: ObjKind::Str(str),
        }
    }

    pub fn new_fn(decl: Rc<FnDecl>, closure: SharedEnv) -> Self {
        Self {
            kind: ObjKind::Fn(Function { decl, closure }),
        }
    }

    pub fn new_native_fn(
        ident: impl ToString,
        func: &'static dyn Fn(&mut [Value]) -> Value,
        arity: usize,
    ) -> Self {
        Self {
            kind: ObjKind::NativeFn(NativeFn {
                ident: ident.to_string(),
                arity,
                func,
            }),
        }
    }
}

/// `Drop` is implemented for `Obj` merely to ease gc debugging.
impl Drop for Obj {
    fn drop(&mut self) {
        match &self.kind {
            ObjKind::Str(string) => trace!("collecting object {:?}", string),
            ObjKind::Fn(func) => trace!("collecting function object {:?}", func.decl.name.lexeme),
            ObjKind::NativeFn(NativeFn { ident, .. }) => {
                trace!("collecting native function object {:?}", ident)
            }
        }
    }
}
