//! Debug rendering of AST nodes as parenthesized prefix trees.
//!
//! `1 + 2 * 3` renders as `(+ 1 (* 2 3))`. Used for debug logging and for
//! asserting parse shapes in tests; the output is not part of the language.

use crate::ast::{Expr, Stmt};

/// Renders a whole program, one statement per line.
pub fn print_program(statements: &[Stmt]) -> String {
    statements
        .iter()
        .map(print_stmt)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::ExprStmt(expr) => parenthesize("expr", &[print_expr(expr)]),
        Stmt::PrintStmt(expr) => parenthesize("print", &[print_expr(expr)]),
        Stmt::VarDeclaration { name, initializer } => match initializer {
            Some(init) => parenthesize("var", &[name.lexeme.clone(), print_expr(init)]),
            None => parenthesize("var", &[name.lexeme.clone()]),
        },
        Stmt::Block(body) => {
            let parts: Vec<String> = body.iter().map(print_stmt).collect();
            parenthesize("block", &parts)
        }
        Stmt::IfStmt {
            condition,
            then_branch,
            else_branch,
        } => match else_branch {
            Some(else_branch) => parenthesize(
                "if-else",
                &[
                    print_expr(condition),
                    print_stmt(then_branch),
                    print_stmt(else_branch),
                ],
            ),
            None => parenthesize("if", &[print_expr(condition), print_stmt(then_branch)]),
        },
        Stmt::WhileStmt { condition, body } => {
            parenthesize("while", &[print_expr(condition), print_stmt(body)])
        }
        Stmt::FnDeclaration(decl) => {
            let params: Vec<String> = decl.params.iter().map(|param| param.lexeme.clone()).collect();
            let mut parts = vec![decl.name.lexeme.clone(), parenthesize_bare(&params)];
            parts.extend(decl.body.iter().map(print_stmt));
            parenthesize("fun", &parts)
        }
        Stmt::ReturnStmt { value, .. } => match value {
            Some(value) => parenthesize("return", &[print_expr(value)]),
            None => parenthesize("return", &[]),
        },
        Stmt::Error => "<error>".to_string(),
    }
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::NumberLit(val) => format!("{}", val),
        Expr::StringLit(val) => val.clone(),
        Expr::BoolLit(val) => format!("{}", val),
        Expr::NilLit => "nil".to_string(),
        Expr::Identifier(name) => name.lexeme.clone(),
        Expr::Assign { name, value } => {
            parenthesize("assign", &[name.lexeme.clone(), print_expr(value)])
        }
        Expr::Binary { lhs, op, rhs } | Expr::Logical { lhs, op, rhs } => {
            parenthesize(&op.lexeme, &[print_expr(lhs), print_expr(rhs)])
        }
        Expr::Unary { op, arg } => parenthesize(&op.lexeme, &[print_expr(arg)]),
        Expr::Grouping(inner) => parenthesize("group", &[print_expr(inner)]),
        Expr::FnCall { callee, args, .. } => {
            let mut parts = vec![print_expr(callee)];
            parts.extend(args.iter().map(print_expr));
            parenthesize("call", &parts)
        }
        Expr::Error => "<error>".to_string(),
    }
}

fn parenthesize(head: &str, parts: &[String]) -> String {
    let mut out = String::from("(");
    out.push_str(head);
    for part in parts {
        out.push(' ');
        out.push_str(part);
    }
    out.push(')');
    out
}

fn parenthesize_bare(parts: &[String]) -> String {
    format!("({})", parts.join(" "))
}
