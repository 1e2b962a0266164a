use miro_value::{BuiltinVars, Value};

/// Returns the default [`BuiltinVars`] that should be used.
pub fn default_builtin_vars() -> BuiltinVars {
    let mut builtin_vars = BuiltinVars::new();
    builtin_vars.add_native_fn("assert", &assert, 1);
    builtin_vars.add_native_fn("assert_eq", &assert_eq, 2);
    builtin_vars.add_native_fn("clock", &clock, 0);
    builtin_vars
}

pub fn assert(args: &mut [Value]) -> Value {
    let arg = &args[0];

    assert!(arg.is_truthy(), "assertion failed: {} is not truthy", arg);
    Value::Bool(true)
}

pub fn assert_eq(args: &mut [Value]) -> Value {
    let left = &args[0];
    let right = &args[1];

    assert_eq!(left, right);
    Value::Bool(true)
}

pub fn clock(_args: &mut [Value]) -> Value {
    let now = std::time::SystemTime::now();
    let since_the_epoch_secs = now
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs_f64();
    Value::Number(since_the_epoch_secs)
}
