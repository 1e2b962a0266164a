use crate::object::Obj;
use crate::Value;
use std::rc::Rc;

/// Registry of host-provided bindings installed into the global
/// environment before any user code runs.
pub struct BuiltinVars {
    pub values: Vec<(String, Value)>,
}

impl BuiltinVars {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Registers a native function under `ident`.
    pub fn add_native_fn(
        &mut self,
        ident: &str,
        func: &'static dyn Fn(&mut [Value]) -> Value,
        arity: usize,
    ) {
        let value = Value::Object(Rc::new(Obj::new_native_fn(ident, func, arity)));
        self.values.push((ident.to_string(), value));
    }
}

impl Default for BuiltinVars {
    fn default() -> Self {
        Self::new()
    }
}
