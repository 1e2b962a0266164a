use super::*;
use crate::parser::expr::MAX_ARGS;

impl<'a> Parser<'a> {
    /// Parses a declaration (or statement).
    ///
    /// This is the error-recovery boundary: a failed declaration is
    /// answered with [`Stmt::Error`] after synchronizing, so parsing can
    /// keep collecting the remaining declarations.
    pub(crate) fn parse_declaration(&mut self) -> Stmt {
        let result = match self.peek().kind {
            TokenKind::Var => self.parse_var_declaration(),
            TokenKind::Fun => self.parse_fn_declaration(),
            _ => self.parse_stmt(),
        };

        match result {
            Ok(stmt) => stmt,
            Err(ParseError) => {
                self.synchronize();
                Stmt::Error
            }
        }
    }

    /// Parses a statement.
    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Print => self.parse_print_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => {
                // expression statement
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
                Ok(Stmt::ExprStmt(expr))
            }
        }
    }

    /// Parses a `{ ... }` block body. Erroring declarations inside the
    /// block synchronize on their own; only a missing `}` unwinds.
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::LeftBrace, "Expect '{'.")?;

        let mut body = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            body.push(self.parse_declaration());
        }

        self.expect(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(body)
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Var, "Expect 'var'.")?;
        let name = self.expect(TokenKind::Identifier, "Expect variable name.")?;

        let initializer = if self.eat(TokenKind::Equal) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::VarDeclaration { name, initializer })
    }

    fn parse_fn_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Fun, "Expect 'fun'.")?;
        let name = self.expect(TokenKind::Identifier, "Expect function name.")?;

        self.expect(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.report(
                        SyntaxErrorKind::TooManyParameters,
                        "Can't have more than 255 parameters.",
                    );
                }
                params.push(self.expect(TokenKind::Identifier, "Expect parameter name.")?);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "Expect ')' after parameters.")?;

        let body = self.parse_block()?;

        Ok(Stmt::FnDeclaration(Rc::new(FnDecl { name, params, body })))
    }

    fn parse_print_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Print, "Expect 'print'.")?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::PrintStmt(expr))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::Return, "Expect 'return'.")?;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::ReturnStmt { keyword, value })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::If, "Expect 'if'.")?;
        self.expect(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.parse_stmt()?);
        // `else` binds to the nearest enclosing `if`.
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::IfStmt {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::While, "Expect 'while'.")?;
        self.expect(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.parse_stmt()?);

        Ok(Stmt::WhileStmt { condition, body })
    }

    /// `for` has no AST node of its own: it desugars into `while` wrapped
    /// in blocks at parse time.
    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::For, "Expect 'for'.")?;
        self.expect(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.eat(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Var) {
            Some(self.parse_var_declaration()?)
        } else {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "Expect ';' after loop initializer.")?;
            Some(Stmt::ExprStmt(expr))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.parse_stmt()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::ExprStmt(increment)]);
        }

        let condition = condition.unwrap_or(Expr::BoolLit(true));
        body = Stmt::WhileStmt {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::printer::print_program;

    fn parse(source: &str) -> Vec<Stmt> {
        let source = source.into();
        let tokens = Scanner::new(&source).scan_tokens();
        let ast = Parser::new(&source, tokens).parse();
        assert!(source.has_no_errors());
        ast
    }

    fn printed(source: &str) -> String {
        print_program(&parse(source))
    }

    #[test]
    fn var_declarations() {
        assert_eq!(printed("var x = 1;"), "(var x 1)");
        assert_eq!(printed("var x;"), "(var x)");
    }

    #[test]
    fn blocks() {
        assert_eq!(
            printed("{ var x = 1; print x; }"),
            "(block (var x 1) (print x))"
        );
        assert_eq!(printed("{ }"), "(block)");
    }

    #[test]
    fn if_statements() {
        assert_eq!(printed("if (a) print 1;"), "(if a (print 1))");
        assert_eq!(
            printed("if (a) print 1; else print 2;"),
            "(if-else a (print 1) (print 2))"
        );
        // `else` binds to the nearest `if`.
        assert_eq!(
            printed("if (a) if (b) print 1; else print 2;"),
            "(if a (if-else b (print 1) (print 2)))"
        );
    }

    #[test]
    fn while_statements() {
        assert_eq!(
            printed("while (x < 3) x = x + 1;"),
            "(while (< x 3) (expr (assign x (+ x 1))))"
        );
    }

    #[test]
    fn for_desugars_to_while() {
        assert_eq!(
            printed("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0) (while (< i 3) (block (print i) (expr (assign i (+ i 1))))))"
        );
        // All clauses are optional; the condition defaults to `true`.
        assert_eq!(printed("for (;;) print 1;"), "(while true (print 1))");
    }

    #[test]
    fn fn_declarations() {
        assert_eq!(
            printed("fun add(a, b) { return a + b; }"),
            "(fun add (a b) (return (+ a b)))"
        );
        assert_eq!(printed("fun noop() { }"), "(fun noop ())");
        assert_eq!(
            printed("fun f() { return; }"),
            "(fun f () (return))"
        );
    }

    #[test]
    fn synchronize_recovers_at_statement_boundary() {
        let source = "var = 1; var x = 2; print +; var y = 3;".into();
        let tokens = Scanner::new(&source).scan_tokens();
        let ast = Parser::new(&source, tokens).parse();

        assert_eq!(source.errors.collected().len(), 2);
        // Both malformed statements left a placeholder; both healthy
        // declarations survived.
        let placeholders = ast.iter().filter(|stmt| **stmt == Stmt::Error).count();
        assert_eq!(placeholders, 2);
        assert_eq!(ast.len(), 4);
    }

    #[test]
    fn reserved_words_do_not_parse_as_expressions() {
        let source = "class;".into();
        let tokens = Scanner::new(&source).scan_tokens();
        let ast = Parser::new(&source, tokens).parse();

        assert!(!source.has_no_errors());
        assert_eq!(ast, vec![Stmt::Error]);
    }
}
