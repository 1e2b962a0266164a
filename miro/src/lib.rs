pub mod builtin_functions;

/// For testing purposes only.
///
/// Runs `source` through the whole pipeline with the default builtins and
/// panics on any syntax or runtime error.
pub fn interpret(source: &str) {
    use miro_interpreter::Interpreter;
    use miro_parser::lexer::Scanner;
    use miro_parser::parser::Parser;

    let builtin_vars = builtin_functions::default_builtin_vars();
    let mut interpreter = Interpreter::new(&builtin_vars);

    let source = source.into();
    let tokens = Scanner::new(&source).scan_tokens();
    let ast = Parser::new(&source, tokens).parse();

    eprintln!("{}", source.errors);
    assert!(source.has_no_errors());

    if let Err(err) = interpreter.interpret(&ast) {
        panic!("{}", err);
    }
}
