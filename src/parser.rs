//! Recursive-descent evaluator.
//!
//! ```text
//! Statement   -> ('let' | 'const') Name '=' Expression
//!              | 'set' Name '=' Expression
//!              | Expression
//! Expression  -> Term (('+' | '-') Term)*
//! Term        -> Primary (('*' | '/' | '%') Primary)*
//! Primary     -> Number | Name | '(' Expression ')' | ('-' | '+') Primary
//!              | Unary '(' Expression ')' | Binary '(' Expression ',' Expression ')'
//! ```
//!
//! Every rule reads one token past its own input and pushes it back before returning.

use crate::env::Environment;
use crate::error::{CalcError, Result};
use crate::eval::{evaluate_binop, evaluate_monop};
use crate::lexer::{Lexer, Op, Token};

const MAX_DEPTH: usize = 256;

pub struct Parser<'a> {
    lexer: &'a mut Lexer,
    env: &'a mut Environment,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: &'a mut Lexer, env: &'a mut Environment) -> Self {
        Parser {
            lexer,
            env,
            depth: 0,
        }
    }

    pub fn parse_statement(&mut self) -> Result<f64> {
        match self.lexer.get()? {
            Token::Let => self.parse_declaration(false),
            Token::Const => self.parse_declaration(true),
            Token::Set => self.parse_assignment(),
            tok => {
                self.lexer.unget(tok);
                self.parse_expr()
            }
        }
    }

    fn parse_declaration(&mut self, is_const: bool) -> Result<f64> {
        let name = self.expect_name("declaration")?;

        if self.env.is_declared(&name) {
            raise!(CalcError::Name, "{} declared twice", name);
        }

        self.expect_assign(&name)?;
        let val = self.parse_expr()?;
        self.env.declare_strict(&name, val, is_const)?;

        Ok(val)
    }

    fn parse_assignment(&mut self) -> Result<f64> {
        let name = self.expect_name("assignment")?;

        if !self.env.is_declared(&name) {
            raise!(CalcError::Name, "{} undeclared", name);
        }

        self.expect_assign(&name)?;
        let val = self.parse_expr()?;
        self.env.set(&name, val)?;

        Ok(val)
    }

    pub fn parse_expr(&mut self) -> Result<f64> {
        let mut lhs = self.parse_term()?;

        loop {
            match self.lexer.get()? {
                Token::Operator(op @ Op::Add) | Token::Operator(op @ Op::Sub) => {
                    let rhs = self.parse_term()?;
                    lhs = evaluate_binop(op, lhs, rhs)?;
                }
                tok => {
                    self.lexer.unget(tok);
                    break Ok(lhs);
                }
            }
        }
    }

    fn parse_term(&mut self) -> Result<f64> {
        let mut lhs = self.parse_primary()?;

        loop {
            match self.lexer.get()? {
                Token::Operator(op @ Op::Mul)
                | Token::Operator(op @ Op::Div)
                | Token::Operator(op @ Op::Mod) => {
                    let rhs = self.parse_primary()?;
                    lhs = evaluate_binop(op, lhs, rhs)?;
                }
                tok => {
                    self.lexer.unget(tok);
                    break Ok(lhs);
                }
            }
        }
    }

    fn parse_primary(&mut self) -> Result<f64> {
        if self.depth >= MAX_DEPTH {
            raise!(CalcError::Syntax, "expression nested too deeply");
        }

        self.depth += 1;
        let out = self.parse_primary_inner();
        self.depth -= 1;

        out
    }

    fn parse_primary_inner(&mut self) -> Result<f64> {
        match self.lexer.get()? {
            Token::Number(x) => Ok(x),
            Token::Name(name) => self.env.get(&name),
            Token::LeftParen => {
                let val = self.parse_expr()?;
                self.expect(Token::RightParen)?;
                Ok(val)
            }
            Token::Operator(op @ Op::Add) | Token::Operator(op @ Op::Sub) => {
                let arg = self.parse_primary()?;
                evaluate_monop(op, arg)
            }
            Token::Unary(name) => self.parse_unary_call(&name),
            Token::Binary(name) => self.parse_binary_call(&name),
            tok => {
                self.lexer.unget(tok);
                raise!(CalcError::Syntax, "primary expected");
            }
        }
    }

    fn parse_unary_call(&mut self, name: &str) -> Result<f64> {
        self.expect(Token::LeftParen)?;
        let x = self.parse_expr()?;
        self.expect(Token::RightParen)?;

        match self.lexer.functions().call_unary(name, x) {
            Some(val) => Ok(val),
            None => raise!(CalcError::Name, "unknown function {}", name),
        }
    }

    fn parse_binary_call(&mut self, name: &str) -> Result<f64> {
        self.expect(Token::LeftParen)?;
        let x = self.parse_expr()?;
        self.expect(Token::Comma)?;
        let y = self.parse_expr()?;
        self.expect(Token::RightParen)?;

        match self.lexer.functions().call_binary(name, x, y) {
            Some(val) => Ok(val),
            None => raise!(CalcError::Name, "unknown function {}", name),
        }
    }

    fn expect(&mut self, want: Token) -> Result<()> {
        let tok = self.lexer.get()?;

        if tok != want {
            self.lexer.unget(tok);
            raise!(CalcError::Syntax, "'{}' expected", want.name());
        }

        Ok(())
    }

    fn expect_name(&mut self, context: &str) -> Result<String> {
        match self.lexer.get()? {
            Token::Name(name) => Ok(name),
            tok => {
                self.lexer.unget(tok);
                raise!(CalcError::Syntax, "name expected in {}", context);
            }
        }
    }

    fn expect_assign(&mut self, name: &str) -> Result<()> {
        match self.lexer.get()? {
            Token::Assign => Ok(()),
            tok => {
                self.lexer.unget(tok);
                raise!(CalcError::Syntax, "= missing in declaration of {}", name);
            }
        }
    }
}

/// Evaluate one statement from `lexer`, leaving the token that ended it pushed back.
pub fn parse(lexer: &mut Lexer, env: &mut Environment) -> Result<f64> {
    Parser::new(lexer, env).parse_statement()
}
