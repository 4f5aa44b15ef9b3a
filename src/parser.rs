// ABOUTME: Parser — builds the AST from a token stream using operator precedence and block markers

use crate::ast::{BinOp, Expr, IndexStep, Param, Sigil, Stmt, UnOp, Variable};
use crate::error::InterpreterError;
use crate::lexer::{Keyword, Op, Token};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: Token) -> Result<(), InterpreterError> {
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            other => Err(InterpreterError::parse(format!(
                "expected {expected:?}, got {other:?}"
            ))),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.current(), Some(Token::Newline)) {
            self.advance();
        }
    }

    // ---- statement-level parsing -----------------------------------

    /// Parses statements until `is_terminator` matches the current token
    /// (or there are no tokens left). Does not consume the terminator.
    fn parse_block(
        &mut self,
        is_terminator: impl Fn(Option<&Token>) -> bool,
    ) -> Result<Vec<Stmt>, InterpreterError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if is_terminator(self.current()) {
                break;
            }
            let stmt = self.parse_statement()?;
            stmts.push(stmt);
            match self.current() {
                Some(Token::Newline) => {
                    self.advance();
                }
                None => {}
                other if is_terminator(other) => {}
                _ => {
                    return Err(InterpreterError::parse(
                        "expected newline after statement",
                    ))
                }
            }
        }
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Stmt, InterpreterError> {
        match self.current() {
            Some(Token::Variable(_)) => self.parse_assignment_or_call_statement(),
            Some(Token::Keyword(Keyword::If)) => self.parse_if(),
            Some(Token::Keyword(Keyword::While)) => self.parse_while(),
            Some(Token::Keyword(Keyword::For)) => self.parse_for_in(),
            Some(Token::Keyword(Keyword::Return)) => self.parse_return(),
            other => Err(InterpreterError::parse(format!(
                "unexpected token {other:?} at start of statement"
            ))),
        }
    }

    fn parse_assignment_or_call_statement(&mut self) -> Result<Stmt, InterpreterError> {
        let target = self.parse_variable()?;
        match self.current() {
            Some(Token::Assign) => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::Assign { target, value })
            }
            Some(Token::LParen) => {
                self.advance();
                let args = self.parse_args()?;
                self.expect(Token::RParen)?;
                Ok(Stmt::Expression(Expr::Call {
                    callee: target,
                    args,
                }))
            }
            other => Err(InterpreterError::parse(format!(
                "expected '=' or '(' after variable, got {other:?}"
            ))),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, InterpreterError> {
        self.advance(); // 'if'
        let cond = self.parse_expr()?;
        self.expect(Token::Newline)?;
        let is_else_or_fi = |t: Option<&Token>| {
            matches!(
                t,
                Some(Token::Keyword(Keyword::El)) | Some(Token::Keyword(Keyword::Fi))
            )
        };
        let then_block = self.parse_block(is_else_or_fi)?;
        let else_block = match self.current() {
            Some(Token::Keyword(Keyword::El)) => {
                self.advance();
                self.expect(Token::Newline)?;
                let block =
                    self.parse_block(|t| matches!(t, Some(Token::Keyword(Keyword::Fi))))?;
                Some(block)
            }
            Some(Token::Keyword(Keyword::Fi)) => None,
            other => {
                return Err(InterpreterError::parse(format!(
                    "missing matching 'fi', got {other:?}"
                )))
            }
        };
        self.expect(Token::Keyword(Keyword::Fi))?;
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, InterpreterError> {
        self.advance(); // 'while'
        let cond = self.parse_expr()?;
        self.expect(Token::Newline)?;
        let body = self.parse_block(|t| matches!(t, Some(Token::Keyword(Keyword::Ewhil))))?;
        self.expect(Token::Keyword(Keyword::Ewhil))?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_for_in(&mut self) -> Result<Stmt, InterpreterError> {
        self.advance(); // 'for'
        let target = self.parse_variable()?;
        let iterable = self.parse_expr()?;
        self.expect(Token::Newline)?;
        let body = self.parse_block(|t| matches!(t, Some(Token::Keyword(Keyword::Rfo))))?;
        self.expect(Token::Keyword(Keyword::Rfo))?;
        Ok(Stmt::ForIn {
            target,
            iterable,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, InterpreterError> {
        self.advance(); // 'return'
        if self.starts_expression() {
            let expr = self.parse_expr()?;
            Ok(Stmt::Return(Some(expr)))
        } else {
            Ok(Stmt::Return(None))
        }
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.current(),
            Some(Token::Number(_))
                | Some(Token::Str(_))
                | Some(Token::Variable(_))
                | Some(Token::LParen)
                | Some(Token::EmptyObject)
                | Some(Token::Keyword(Keyword::Fun))
                | Some(Token::TypeName(_))
                | Some(Token::Op(Op::Plus))
                | Some(Token::Op(Op::Minus))
                | Some(Token::Op(Op::Bang))
        )
    }

    // ---- expression parsing ------------------------------------------
    //
    // Tightest-to-loosest binding order is unary, comparison, additive,
    // multiplicative (§4.5 / §9 — intentionally unusual, reproduced as
    // specified, not the conventional ordering).

    fn parse_expr(&mut self) -> Result<Expr, InterpreterError> {
        self.parse_multiplicative()
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current() {
                Some(Token::Op(Op::Star)) => BinOp::Mul,
                Some(Token::Op(Op::Slash)) => BinOp::Div,
                Some(Token::Op(Op::Percent)) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current() {
                Some(Token::Op(Op::Plus)) => BinOp::Add,
                Some(Token::Op(Op::Minus)) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, InterpreterError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Some(Token::Op(Op::Lt)) => BinOp::Lt,
                Some(Token::Op(Op::Le)) => BinOp::Le,
                Some(Token::Op(Op::Gt)) => BinOp::Gt,
                Some(Token::Op(Op::Ge)) => BinOp::Ge,
                Some(Token::Op(Op::EqEq)) => BinOp::Eq,
                Some(Token::Op(Op::Ne)) => BinOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, InterpreterError> {
        let op = match self.current() {
            Some(Token::Op(Op::Plus)) => Some(UnOp::Plus),
            Some(Token::Op(Op::Minus)) => Some(UnOp::Neg),
            Some(Token::Op(Op::Bang)) => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            })
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, InterpreterError> {
        match self.current() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.advance();
                Ok(Expr::Number(n))
            }
            Some(Token::Str(_)) => {
                let s = match self.advance() {
                    Some(Token::Str(s)) => s,
                    _ => unreachable!(),
                };
                Ok(Expr::Str(s))
            }
            Some(Token::EmptyObject) => {
                self.advance();
                Ok(Expr::EmptyObject)
            }
            Some(Token::TypeName(crate::value::ValueKind::Nil)) => {
                self.advance();
                Ok(Expr::Nil)
            }
            Some(Token::Variable(_)) => self.parse_variable_or_call_expr(),
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Keyword(Keyword::Fun)) => self.parse_function_literal(),
            other => Err(InterpreterError::parse(format!(
                "unexpected token {other:?} in expression"
            ))),
        }
    }

    fn parse_variable_or_call_expr(&mut self) -> Result<Expr, InterpreterError> {
        let var = self.parse_variable()?;
        if matches!(self.current(), Some(Token::LParen)) {
            self.advance();
            let args = self.parse_args()?;
            self.expect(Token::RParen)?;
            Ok(Expr::Call {
                callee: var,
                args,
            })
        } else {
            Ok(Expr::Variable(var))
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, InterpreterError> {
        let mut args = Vec::new();
        if matches!(self.current(), Some(Token::RParen)) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if matches!(self.current(), Some(Token::Comma)) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(args)
    }

    /// Parses a `$`-prefixed variable token (sigil + base + `:`-chained
    /// static steps) followed by zero or more `[expr]` dynamic steps.
    fn parse_variable(&mut self) -> Result<Variable, InterpreterError> {
        let raw = match self.advance() {
            Some(Token::Variable(s)) => s,
            other => {
                return Err(InterpreterError::parse(format!(
                    "expected variable, got {other:?}"
                )))
            }
        };
        let rest = &raw[1..]; // strip leading '$'
        let (sigil, rest) = if let Some(r) = rest.strip_prefix('!') {
            (Sigil::ForceLocal, r)
        } else if let Some(r) = rest.strip_prefix(':') {
            (Sigil::Global, r)
        } else {
            (Sigil::Default, rest)
        };

        let mut segments = rest.split(':');
        let base = segments.next().unwrap_or("").to_string();
        let mut steps: Vec<IndexStep> = segments
            .map(|s| IndexStep::Static(s.to_string()))
            .collect();

        while matches!(self.current(), Some(Token::LBracket)) {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(Token::RBracket)?;
            steps.push(IndexStep::Dynamic(Box::new(expr)));
        }

        Ok(Variable { sigil, base, steps })
    }

    fn parse_function_literal(&mut self) -> Result<Expr, InterpreterError> {
        self.advance(); // 'fun'
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !matches!(self.current(), Some(Token::RParen)) {
            loop {
                let target = self.parse_variable()?;
                let kind = match self.current() {
                    Some(Token::TypeName(k)) => {
                        let k = *k;
                        self.advance();
                        Some(k)
                    }
                    _ => None,
                };
                params.push(Param { target, kind });
                if matches!(self.current(), Some(Token::Comma)) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(Token::RParen)?;
        self.expect(Token::Newline)?;
        let body = self.parse_block(|t| matches!(t, Some(Token::Keyword(Keyword::Nfu))))?;
        self.expect(Token::Keyword(Keyword::Nfu))?;
        Ok(Expr::FunctionLiteral { params, body })
    }
}

/// Parses a full token stream (see `lexer::tokenize`) into a program body.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, InterpreterError> {
    let mut parser = Parser { tokens, pos: 0 };
    let program = parser.parse_block(|t| t.is_none())?;
    if parser.pos != parser.tokens.len() {
        return Err(InterpreterError::parse("unexpected trailing tokens"));
    }
    Ok(program)
}
