use log::debug;
use miro_parser::ast::{Expr, Stmt};
use miro_parser::lexer::TokenKind;
use miro_parser::token::Token;
use miro_value::object::ObjKind;
use miro_value::{BuiltinVars, Environment, SharedEnv, Value};
use std::mem;
use std::rc::Rc;
use thiserror::Error;

/// A runtime error: aborts the remaining statements of the current
/// top-level `interpret` call, nothing more.
#[derive(Debug, Clone, Error)]
#[error("{message}\n[line {}]", .token.line)]
pub struct RuntimeError {
    /// The token the error is anchored to, for line/context reporting.
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    fn new(token: &Token, message: impl ToString) -> Self {
        Self {
            token: token.clone(),
            message: message.to_string(),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// How a statement finished executing.
///
/// `return` is control flow, not an error: it travels through blocks and
/// loops as a completion tag until a call boundary (or the top level)
/// consumes it.
#[derive(Debug)]
pub enum Completion {
    Normal,
    Return { keyword: Token, value: Value },
}

/// Walks the AST, evaluating expressions and executing statements against
/// the active environment chain.
pub struct Interpreter {
    globals: SharedEnv,
    /// The environment the currently executing code sees.
    env: SharedEnv,
}

impl Interpreter {
    pub fn new(builtin_vars: &BuiltinVars) -> Self {
        let globals = Environment::global();
        for (ident, value) in &builtin_vars.values {
            globals.borrow_mut().define(ident, value.clone());
        }

        Self {
            env: Rc::clone(&globals),
            globals,
        }
    }

    /// The root of the environment chain.
    pub fn globals(&self) -> &SharedEnv {
        &self.globals
    }

    /// Executes top-level statements in order.
    ///
    /// The first runtime error aborts the remaining statements and is
    /// returned to the host; the interpreter and its environments stay
    /// usable for the next input (REPL semantics).
    pub fn interpret(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        for stmt in statements {
            match self.execute(stmt)? {
                Completion::Normal => {}
                Completion::Return { keyword, .. } => {
                    return Err(RuntimeError::new(
                        &keyword,
                        "Cannot return from top-level code.",
                    ));
                }
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> RuntimeResult<Completion> {
        match stmt {
            Stmt::ExprStmt(expr) => {
                self.evaluate(expr)?;
                Ok(Completion::Normal)
            }
            Stmt::PrintStmt(expr) => {
                let value = self.evaluate(expr)?;
                println!("{}", value);
                Ok(Completion::Normal)
            }
            Stmt::VarDeclaration { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.env.borrow_mut().define(&name.lexeme, value);
                Ok(Completion::Normal)
            }
            Stmt::Block(body) => {
                let env = Environment::with_enclosing(Rc::clone(&self.env));
                self.execute_block(body, env)
            }
            Stmt::IfStmt {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Completion::Normal)
                }
            }
            Stmt::WhileStmt { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Completion::Normal => {}
                        // `return` unwinds through the loop.
                        ret => return Ok(ret),
                    }
                }
                Ok(Completion::Normal)
            }
            Stmt::FnDeclaration(decl) => {
                // The environment current at declaration is the closure.
                let function = Value::new_fn(Rc::clone(decl), Rc::clone(&self.env));
                self.env.borrow_mut().define(&decl.name.lexeme, function);
                Ok(Completion::Normal)
            }
            Stmt::ReturnStmt { keyword, value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Completion::Return {
                    keyword: keyword.clone(),
                    value,
                })
            }
            // Left behind by parser error recovery. Interpretation is
            // gated on a clean parse, so this is inert.
            Stmt::Error => Ok(Completion::Normal),
        }
    }

    /// Executes `body` inside `env`, restoring the previous environment on
    /// every exit path (normal completion, runtime error, return).
    fn execute_block(&mut self, body: &[Stmt], env: SharedEnv) -> RuntimeResult<Completion> {
        let previous = mem::replace(&mut self.env, env);

        let mut result = Ok(Completion::Normal);
        for stmt in body {
            match self.execute(stmt) {
                Ok(Completion::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.env = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::NumberLit(val) => Ok(Value::Number(*val)),
            Expr::StringLit(val) => Ok(Value::new_string(val.clone())),
            Expr::BoolLit(val) => Ok(Value::Bool(*val)),
            Expr::NilLit => Ok(Value::Nil),
            Expr::Identifier(name) => self
                .env
                .borrow()
                .get(&name.lexeme)
                .ok_or_else(|| undefined_variable(name)),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                if self.env.borrow_mut().assign(&name.lexeme, value.clone()) {
                    Ok(value)
                } else {
                    Err(undefined_variable(name))
                }
            }
            Expr::Logical { lhs, op, rhs } => {
                let left = self.evaluate(lhs)?;
                // The produced value is whichever operand decided the
                // result, not a coerced boolean.
                let short_circuits = match op.kind {
                    TokenKind::Or => left.is_truthy(),
                    _ => !left.is_truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(rhs)
                }
            }
            Expr::Unary { op, arg } => {
                let arg = self.evaluate(arg)?;
                match op.kind {
                    TokenKind::Bang => Ok(Value::Bool(!arg.is_truthy())),
                    TokenKind::Minus => match arg.cast_to_number() {
                        Some(val) => Ok(Value::Number(-val)),
                        None => Err(RuntimeError::new(op, "Operand must be a number.")),
                    },
                    _ => Err(RuntimeError::new(op, "Invalid unary operator.")),
                }
            }
            Expr::Binary { lhs, op, rhs } => {
                let left = self.evaluate(lhs)?;
                let right = self.evaluate(rhs)?;
                apply_binary(op, left, right)
            }
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::FnCall {
                callee,
                paren,
                args,
            } => {
                let callee = self.evaluate(callee)?;
                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.evaluate(arg)?);
                }
                self.call_value(callee, arguments, paren)
            }
            // Parser placeholder, inert for the same reason as `Stmt::Error`.
            Expr::Error => Ok(Value::Nil),
        }
    }

    fn call_value(
        &mut self,
        callee: Value,
        mut arguments: Vec<Value>,
        paren: &Token,
    ) -> RuntimeResult<Value> {
        let obj = match callee {
            Value::Object(obj) => obj,
            _ => return Err(RuntimeError::new(paren, "Can only call functions.")),
        };

        match &obj.kind {
            ObjKind::Fn(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;
                debug!("calling <fn {}>", function.decl.name.lexeme);

                // The frame is a child of the closure, not of the caller's
                // environment.
                let env = Environment::with_enclosing(Rc::clone(&function.closure));
                for (param, value) in function.decl.params.iter().zip(arguments) {
                    env.borrow_mut().define(&param.lexeme, value);
                }

                match self.execute_block(&function.decl.body, env)? {
                    Completion::Return { value, .. } => Ok(value),
                    Completion::Normal => Ok(Value::Nil),
                }
            }
            ObjKind::NativeFn(native) => {
                check_arity(native.arity, arguments.len(), paren)?;
                debug!("calling <native fn {}>", native.ident);
                Ok((native.func)(&mut arguments))
            }
            ObjKind::Str(_) => Err(RuntimeError::new(paren, "Can only call functions.")),
        }
    }
}

fn apply_binary(op: &Token, left: Value, right: Value) -> RuntimeResult<Value> {
    match op.kind {
        TokenKind::Plus => {
            if let (Some(l), Some(r)) = (left.cast_to_number(), right.cast_to_number()) {
                Ok(Value::Number(l + r))
            } else if let (Some(l), Some(r)) = (left.cast_to_str(), right.cast_to_str()) {
                Ok(Value::new_string(format!("{}{}", l, r)))
            } else {
                Err(RuntimeError::new(
                    op,
                    "Operands must be two numbers or two strings.",
                ))
            }
        }
        TokenKind::Minus => {
            let (l, r) = number_operands(op, &left, &right)?;
            Ok(Value::Number(l - r))
        }
        TokenKind::Star => {
            let (l, r) = number_operands(op, &left, &right)?;
            Ok(Value::Number(l * r))
        }
        TokenKind::Slash => {
            // Division by zero follows IEEE semantics: ±inf or NaN.
            let (l, r) = number_operands(op, &left, &right)?;
            Ok(Value::Number(l / r))
        }
        TokenKind::Greater => {
            let (l, r) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(l > r))
        }
        TokenKind::GreaterEqual => {
            let (l, r) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(l >= r))
        }
        TokenKind::Less => {
            let (l, r) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(l < r))
        }
        TokenKind::LessEqual => {
            let (l, r) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(l <= r))
        }
        TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
        TokenKind::BangEqual => Ok(Value::Bool(left != right)),
        _ => Err(RuntimeError::new(op, "Invalid binary operator.")),
    }
}

fn number_operands(op: &Token, left: &Value, right: &Value) -> RuntimeResult<(f64, f64)> {
    match (left.cast_to_number(), right.cast_to_number()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(RuntimeError::new(op, "Operands must be numbers.")),
    }
}

fn check_arity(arity: usize, got: usize, paren: &Token) -> RuntimeResult<()> {
    if arity == got {
        Ok(())
    } else {
        Err(RuntimeError::new(
            paren,
            format!("Expected {} arguments but got {}.", arity, got),
        ))
    }
}

fn undefined_variable(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use miro_parser::lexer::Scanner;
    use miro_parser::parser::Parser;
    use miro_source::Source;

    fn exec(interpreter: &mut Interpreter, source: &str) -> RuntimeResult<()> {
        let source: Source = source.into();
        let tokens = Scanner::new(&source).scan_tokens();
        let ast = Parser::new(&source, tokens).parse();
        assert!(source.has_no_errors());
        interpreter.interpret(&ast)
    }

    fn run(source: &str) -> (Interpreter, RuntimeResult<()>) {
        let mut interpreter = Interpreter::new(&BuiltinVars::new());
        let result = exec(&mut interpreter, source);
        (interpreter, result)
    }

    fn global(interpreter: &Interpreter, name: &str) -> Value {
        interpreter
            .globals()
            .borrow()
            .get(name)
            .unwrap_or_else(|| panic!("global {} is not defined", name))
    }

    #[test]
    fn arithmetic() {
        let (interpreter, result) = run("var x = 1 + 2 * 3 - 4 / 2;");
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "x"), Value::Number(5.0));
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        let (interpreter, result) = run("var a = 1 / 0; var b = -1 / 0; var c = 0 / 0;");
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "a"), Value::Number(f64::INFINITY));
        assert_eq!(global(&interpreter, "b"), Value::Number(f64::NEG_INFINITY));
        match global(&interpreter, "c") {
            Value::Number(val) => assert!(val.is_nan()),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn string_concatenation() {
        let (interpreter, result) = run(r#"var s = "a" + "b"; var eq = s == "ab";"#);
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "s"), Value::new_string("ab".to_string()));
        assert_eq!(global(&interpreter, "eq"), Value::Bool(true));
    }

    #[test]
    fn mixed_plus_is_an_error_both_ways() {
        let (_, result) = run(r#"1 + "a";"#);
        let err = result.unwrap_err();
        assert_eq!(err.message, "Operands must be two numbers or two strings.");
        assert_eq!(err.token.lexeme, "+");

        let (_, result) = run(r#""a" + 1;"#);
        assert!(result.is_err());
    }

    #[test]
    fn comparison_requires_numbers() {
        let (_, result) = run(r#"1 < "a";"#);
        assert_eq!(result.unwrap_err().message, "Operands must be numbers.");
    }

    #[test]
    fn equality_is_type_aware() {
        let (interpreter, result) = run(
            "var a = 1 == 1; var b = nil == nil; var c = 1 == \"1\"; var d = 0 == false; var e = 1 != 2;",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "a"), Value::Bool(true));
        assert_eq!(global(&interpreter, "b"), Value::Bool(true));
        assert_eq!(global(&interpreter, "c"), Value::Bool(false));
        assert_eq!(global(&interpreter, "d"), Value::Bool(false));
        assert_eq!(global(&interpreter, "e"), Value::Bool(true));
    }

    #[test]
    fn unary_operators() {
        let (interpreter, result) = run("var a = -(3); var b = !nil; var c = !0;");
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "a"), Value::Number(-3.0));
        assert_eq!(global(&interpreter, "b"), Value::Bool(true));
        // Zero is truthy, so !0 is false.
        assert_eq!(global(&interpreter, "c"), Value::Bool(false));

        let (_, result) = run(r#"-"a";"#);
        assert_eq!(result.unwrap_err().message, "Operand must be a number.");
    }

    #[test]
    fn logical_operators_short_circuit_and_yield_operands() {
        let (interpreter, result) = run(
            "var called = false;\n\
             fun mark() { called = true; return true; }\n\
             var a = false and mark();\n\
             var b = true or mark();\n\
             var c = nil or \"x\";\n\
             var d = true and 7;",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "called"), Value::Bool(false));
        assert_eq!(global(&interpreter, "a"), Value::Bool(false));
        assert_eq!(global(&interpreter, "b"), Value::Bool(true));
        assert_eq!(global(&interpreter, "c"), Value::new_string("x".to_string()));
        assert_eq!(global(&interpreter, "d"), Value::Number(7.0));
    }

    #[test]
    fn block_scoping_shadows_without_leaking() {
        let (interpreter, result) = run(
            "var a = 1; var first; var second;\n\
             { var a = 2; first = a; }\n\
             second = a;",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "first"), Value::Number(2.0));
        assert_eq!(global(&interpreter, "second"), Value::Number(1.0));
    }

    #[test]
    fn var_without_initializer_is_nil() {
        let (interpreter, result) = run("var x;");
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "x"), Value::Nil);
    }

    #[test]
    fn while_and_for_loops() {
        let (interpreter, result) = run(
            "var sum = 0;\n\
             for (var i = 1; i <= 4; i = i + 1) sum = sum + i;\n\
             var n = 3;\n\
             while (n > 0) n = n - 1;",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "sum"), Value::Number(10.0));
        assert_eq!(global(&interpreter, "n"), Value::Number(0.0));
    }

    #[test]
    fn functions_and_returns() {
        let (interpreter, result) = run(
            "fun add(a, b) { return a + b; }\n\
             fun nothing() { }\n\
             var x = add(2, 3);\n\
             var y = nothing();",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "x"), Value::Number(5.0));
        assert_eq!(global(&interpreter, "y"), Value::Nil);
    }

    #[test]
    fn return_unwinds_nested_blocks_and_loops() {
        let (interpreter, result) = run(
            "var after = false;\n\
             fun f() {\n\
                 while (true) {\n\
                     { if (true) { return 1; } }\n\
                 }\n\
                 after = true;\n\
                 return 2;\n\
             }\n\
             var x = f();",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "x"), Value::Number(1.0));
        assert_eq!(global(&interpreter, "after"), Value::Bool(false));
    }

    #[test]
    fn closures_capture_their_defining_scope() {
        let (interpreter, result) = run(
            "fun makeCounter() {\n\
                 var i = 0;\n\
                 fun count() { i = i + 1; return i; }\n\
                 return count;\n\
             }\n\
             var counter = makeCounter();\n\
             var first = counter();\n\
             var second = counter();",
        );
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "first"), Value::Number(1.0));
        assert_eq!(global(&interpreter, "second"), Value::Number(2.0));
    }

    #[test]
    fn closure_is_independent_of_the_caller_environment() {
        let (interpreter, result) = run(
            "var x = \"global\";\n\
             var observed;\n\
             fun outer() {\n\
                 var x = \"local\";\n\
                 fun inner() { observed = x; }\n\
                 inner();\n\
             }\n\
             outer();",
        );
        assert!(result.is_ok());
        assert_eq!(
            global(&interpreter, "observed"),
            Value::new_string("local".to_string())
        );
    }

    #[test]
    fn arity_mismatch_reports_before_running_the_body() {
        let (interpreter, result) = run(
            "var ran = false;\n\
             fun f(a, b) { ran = true; return a; }\n\
             f(1);",
        );
        let err = result.unwrap_err();
        assert_eq!(err.message, "Expected 2 arguments but got 1.");
        assert_eq!(global(&interpreter, "ran"), Value::Bool(false));

        let (_, result) = run("fun f(a, b) { return a; } f(1, 2, 3);");
        assert_eq!(
            result.unwrap_err().message,
            "Expected 2 arguments but got 3."
        );
    }

    #[test]
    fn calling_a_non_callable_is_an_error() {
        let (_, result) = run("var x = 1; x();");
        assert_eq!(result.unwrap_err().message, "Can only call functions.");

        let (_, result) = run(r#""hi"();"#);
        assert_eq!(result.unwrap_err().message, "Can only call functions.");
    }

    #[test]
    fn undefined_variables_are_named_in_errors() {
        let (_, result) = run("var x = missing;");
        assert_eq!(result.unwrap_err().message, "Undefined variable 'missing'.");

        let (_, result) = run("missing = 1;");
        assert_eq!(result.unwrap_err().message, "Undefined variable 'missing'.");

        let (interpreter, result) = run("var declared = 1; declared = declared + 1;");
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "declared"), Value::Number(2.0));
    }

    #[test]
    fn top_level_return_is_a_runtime_error() {
        let (_, result) = run("return 1;");
        assert_eq!(
            result.unwrap_err().message,
            "Cannot return from top-level code."
        );
    }

    #[test]
    fn interpreter_survives_runtime_errors() {
        // REPL semantics: one interpreter, successive inputs; the
        // environment is restored even when a block dies mid-flight.
        let mut interpreter = Interpreter::new(&BuiltinVars::new());
        assert!(exec(&mut interpreter, "var a = 1;").is_ok());
        assert!(exec(&mut interpreter, "{ var a = 2; print a + nil; }").is_err());
        assert!(exec(&mut interpreter, "var b = a;").is_ok());
        assert_eq!(global(&interpreter, "b"), Value::Number(1.0));
    }

    #[test]
    fn native_functions_are_called_with_arity_checked() {
        fn forty_two(_args: &mut [Value]) -> Value {
            Value::Number(42.0)
        }

        let mut builtin_vars = BuiltinVars::new();
        builtin_vars.add_native_fn("fortyTwo", &forty_two, 0);

        let mut interpreter = Interpreter::new(&builtin_vars);
        assert!(exec(&mut interpreter, "var x = fortyTwo();").is_ok());
        assert_eq!(global(&interpreter, "x"), Value::Number(42.0));

        let result = exec(&mut interpreter, "fortyTwo(1);");
        assert_eq!(
            result.unwrap_err().message,
            "Expected 0 arguments but got 1."
        );
    }

    #[test]
    fn function_values_display_by_name() {
        let (interpreter, result) = run("fun f() { } var s = f;");
        assert!(result.is_ok());
        assert_eq!(global(&interpreter, "s").to_string(), "<fn f>");
    }

    #[test]
    fn runtime_errors_carry_the_offending_line() {
        let (_, result) = run("var a = 1;\nvar b = a +\nnil;");
        let err = result.unwrap_err();
        assert_eq!(err.token.line, 2);
        assert!(err.to_string().contains("[line 2]"));
    }
}
