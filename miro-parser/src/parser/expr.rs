use super::*;

/// Binding power of prefix `!` and `-`: tighter than any binary operator,
/// looser than a call argument list.
const UNARY_BP: u8 = 15;

/// Maximum number of arguments a call (and parameters a declaration) may
/// carry. Exceeding it is reported but does not abort the parse.
pub(crate) const MAX_ARGS: usize = 255;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_expr_bp(0)
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression, use [`Self::parse_expr`].
    fn parse_expr_bp(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_primary_expr()?;

        loop {
            // Argument lists bind tightest and may repeat: `f(1)(2)`.
            if self.eat(TokenKind::LeftParen) {
                lhs = self.finish_call_expr(lhs)?;
                continue;
            }

            let (l_bp, r_bp) = match self.peek().kind.binop_bp() {
                Some(bp) => bp,
                None => break, // not a valid binop, stop parsing
            };
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }

            let op = self.advance().clone();
            let rhs = self.parse_expr_bp(r_bp)?;

            lhs = match op.kind {
                TokenKind::Equal => self.make_assign_expr(lhs, &op, rhs),
                TokenKind::And | TokenKind::Or => Expr::Logical {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                _ => Expr::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
            };
        }

        Ok(lhs)
    }

    /// Builds an assignment node. Only a bare variable reference is a
    /// valid target; anything else is reported at the `=` token, without
    /// abandoning the rest of the expression.
    fn make_assign_expr(&mut self, target: Expr, equals: &Token, value: Expr) -> Expr {
        match target {
            Expr::Identifier(name) => Expr::Assign {
                name,
                value: Box::new(value),
            },
            _ => {
                self.source.errors.add_error(
                    SyntaxError::new(
                        SyntaxErrorKind::InvalidAssignmentTarget,
                        equals.line,
                        "Invalid assignment target.",
                    )
                    .with_location(equals.location()),
                );
                Expr::Error
            }
        }
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        // NOTE: prefix operators are handled here
        match self.peek().kind {
            TokenKind::Number
            | TokenKind::Str
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil => self.parse_literal_expr(),
            TokenKind::Identifier => {
                let name = self.advance().clone();
                Ok(Expr::Identifier(name))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "Expect ')' after expression.")?;
                Ok(Expr::Grouping(Box::new(inner)))
            }
            TokenKind::Bang | TokenKind::Minus => {
                let op = self.advance().clone();
                let arg = self.parse_expr_bp(UNARY_BP)?;
                Ok(Expr::Unary {
                    op,
                    arg: Box::new(arg),
                })
            }
            _ => Err(self.error_at(SyntaxErrorKind::UnexpectedToken, "Expect expression.")),
        }
    }

    /* Expressions.Literals */
    /// Parses a literal expression.
    fn parse_literal_expr(&mut self) -> ParseResult<Expr> {
        let token = self.advance().clone();
        let expr = match (token.kind, token.literal) {
            (TokenKind::True, _) => Expr::BoolLit(true),
            (TokenKind::False, _) => Expr::BoolLit(false),
            (TokenKind::Nil, _) => Expr::NilLit,
            (TokenKind::Number, Some(Lit::Number(val))) => Expr::NumberLit(val),
            (TokenKind::Str, Some(Lit::Str(val))) => Expr::StringLit(val),
            _ => return Err(self.error_at(SyntaxErrorKind::UnexpectedToken, "Expect expression.")),
        };
        Ok(expr)
    }

    /// Parses the argument list of a call expression. The `(` is already
    /// eaten.
    fn finish_call_expr(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    self.report(
                        SyntaxErrorKind::TooManyArguments,
                        "Can't have more than 255 arguments.",
                    );
                }
                args.push(self.parse_expr()?);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.expect(TokenKind::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::FnCall {
            callee: Box::new(callee),
            paren,
            args,
        })
    }
}
