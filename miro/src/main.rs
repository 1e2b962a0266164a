use console::style;
use log::debug;
use miro::builtin_functions;
use miro_interpreter::Interpreter;
use miro_parser::lexer::Scanner;
use miro_parser::parser::Parser;
use miro_parser::printer;
use miro_source::Source;
use std::io::{self, Write};
use std::{env, fs, process};

enum RunOutcome {
    Ok,
    SyntaxError,
    RuntimeError,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => run_prompt(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: miro [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("{}", style(format!("could not read {}: {}", path, err)).red());
            process::exit(66);
        }
    };

    let mut interpreter = Interpreter::new(&builtin_functions::default_builtin_vars());
    match run(&content, &mut interpreter) {
        RunOutcome::Ok => {}
        RunOutcome::SyntaxError => process::exit(65),
        RunOutcome::RuntimeError => process::exit(70),
    }
}

fn run_prompt() {
    // One interpreter for the whole session: the global environment
    // persists from line to line.
    let mut interpreter = Interpreter::new(&builtin_functions::default_builtin_vars());

    let mut stdout = io::stdout();
    let stdin = io::stdin();
    loop {
        print!("> ");
        stdout.flush().unwrap();

        let mut input = String::new();
        if stdin.read_line(&mut input).unwrap() == 0 {
            break; // end of input
        }

        // Errors are reported and the session continues.
        run(&input, &mut interpreter);
    }
}

fn run(content: &str, interpreter: &mut Interpreter) -> RunOutcome {
    let source: Source = content.into();
    let tokens = Scanner::new(&source).scan_tokens();
    let ast = Parser::new(&source, tokens).parse();

    // Any static diagnostic suppresses interpretation of the partial AST.
    if !source.has_no_errors() {
        eprint!("{}", style(&source.errors).red());
        return RunOutcome::SyntaxError;
    }

    debug!("ast:\n{}", printer::print_program(&ast));

    match interpreter.interpret(&ast) {
        Ok(()) => RunOutcome::Ok,
        Err(err) => {
            eprintln!("{}", style(err).red());
            RunOutcome::RuntimeError
        }
    }
}
