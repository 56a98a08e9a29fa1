use tracing::debug;

use crate::error::{Error, Result};
use crate::lexer::{TokenKind, TokenSource};

use super::{BinOpKind, Condition, Expression, ProcedureDeclaration, Program, RelOp, Statement};

#[derive(Debug)]
pub struct Parser<S: TokenSource> {
    tokens: S,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(tokens: S) -> Self {
        Self { tokens }
    }

    pub fn parse(&mut self) -> Result<Program> {
        self.parse_program()
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens.current().kind
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.peek() != kind {
            return false;
        }
        self.tokens.advance();
        true
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        if self.consume(kind) {
            Ok(())
        } else {
            Err(Error::syntax(kind, self.peek()))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        if let TokenKind::Ident(name) = self.peek() {
            let name = name.clone();
            self.tokens.advance();
            return Ok(name);
        }
        Err(Error::syntax("identifier", self.peek()))
    }

    /// names = ident ("," ident)*
    fn parse_names(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.expect_ident()?];
        while self.consume(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    /// var-decls = ("VAR" names ";")*
    fn parse_var_decls(&mut self) -> Result<Vec<String>> {
        let mut vars = vec![];
        while self.consume(&TokenKind::Var) {
            vars.extend(self.parse_names()?);
            self.expect(&TokenKind::SemiColon)?;
        }
        Ok(vars)
    }

    /// program = var-decls procedure* stmt "."? EOF
    fn parse_program(&mut self) -> Result<Program> {
        let globals = self.parse_var_decls()?;

        let mut procedures = vec![];
        while self.consume(&TokenKind::Procedure) {
            procedures.push(self.parse_procedure()?);
        }

        let body = self.parse_stmt()?;
        self.consume(&TokenKind::Period);
        if self.tokens.has_more() {
            return Err(Error::syntax(TokenKind::Eof, self.peek()));
        }

        Ok(Program {
            globals,
            procedures,
            body,
        })
    }

    /// procedure = "PROCEDURE" ident "(" names? ")" ";" var-decls stmt
    fn parse_procedure(&mut self) -> Result<ProcedureDeclaration> {
        let name = self.expect_ident()?;

        self.expect(&TokenKind::OpenParen)?;
        let params = if self.consume(&TokenKind::CloseParen) {
            vec![]
        } else {
            let params = self.parse_names()?;
            self.expect(&TokenKind::CloseParen)?;
            params
        };
        self.expect(&TokenKind::SemiColon)?;

        let locals = self.parse_var_decls()?;
        let body = self.parse_stmt()?;

        debug!(%name, ?params, ?locals, "parsed procedure");
        Ok(ProcedureDeclaration {
            name,
            params,
            locals,
            body: Box::new(body),
        })
    }

    /// stmt = "WRITELN" "(" expr ")" ";"
    ///      | "BEGIN" stmt* "END" ";"
    ///      | "IF" condition "THEN" stmt
    ///      | "WHILE" condition "DO" stmt
    ///      | ident ":=" expr ";"
    pub fn parse_stmt(&mut self) -> Result<Statement> {
        if self.consume(&TokenKind::Writeln) {
            self.expect(&TokenKind::OpenParen)?;
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::CloseParen)?;
            self.expect(&TokenKind::SemiColon)?;
            Ok(Statement::Writeln(expr))
        } else if self.consume(&TokenKind::Begin) {
            self.parse_block()
        } else if self.consume(&TokenKind::If) {
            let cond = self.parse_condition()?;
            self.expect(&TokenKind::Then)?;
            let stmt = self.parse_stmt()?;
            Ok(Statement::If(cond, Box::new(stmt)))
        } else if self.consume(&TokenKind::While) {
            let cond = self.parse_condition()?;
            self.expect(&TokenKind::Do)?;
            let stmt = self.parse_stmt()?;
            Ok(Statement::While(cond, Box::new(stmt)))
        } else if let TokenKind::Ident(name) = self.peek() {
            let name = name.clone();
            self.tokens.advance();
            self.expect(&TokenKind::ColonEqual)?;
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::SemiColon)?;
            Ok(Statement::Assignment(name, expr))
        } else {
            Err(Error::syntax("statement", self.peek()))
        }
    }

    /// The `END` closing the program's body may be followed by `.` instead
    /// of `;`; the period itself is left for `parse_program`.
    fn parse_block(&mut self) -> Result<Statement> {
        let mut stmts = vec![];
        while !self.consume(&TokenKind::End) {
            stmts.push(self.parse_stmt()?);
        }
        if self.peek() != &TokenKind::Period {
            self.expect(&TokenKind::SemiColon)?;
        }
        Ok(Statement::Block(stmts))
    }

    /// condition = expr relop expr
    fn parse_condition(&mut self) -> Result<Condition> {
        let left = self.parse_expr()?;
        let op = self.parse_relop()?;
        let right = self.parse_expr()?;
        Ok(Condition { op, left, right })
    }

    fn parse_relop(&mut self) -> Result<RelOp> {
        let op = match self.peek() {
            TokenKind::Equal => RelOp::Equal,
            TokenKind::NotEqual => RelOp::NotEqual,
            TokenKind::LessThan => RelOp::LessThan,
            TokenKind::LessEqual => RelOp::LessEqual,
            TokenKind::GreaterThan => RelOp::GreaterThan,
            TokenKind::GreaterEqual => RelOp::GreaterEqual,
            t => return Err(Error::syntax("relational operator", t)),
        };
        self.tokens.advance();
        Ok(op)
    }

    /// expr = term (("+" | "-") term)*
    pub fn parse_expr(&mut self) -> Result<Expression> {
        let mut expr = self.parse_term()?;

        loop {
            let kind = if self.consume(&TokenKind::Plus) {
                BinOpKind::Add
            } else if self.consume(&TokenKind::Minus) {
                BinOpKind::Sub
            } else {
                return Ok(expr);
            };
            expr = Expression::binary(kind, expr, self.parse_term()?);
        }
    }

    /// term = factor (("*" | "/" | "%") factor)*
    fn parse_term(&mut self) -> Result<Expression> {
        let mut expr = self.parse_factor()?;

        loop {
            let kind = if self.consume(&TokenKind::Star) {
                BinOpKind::Mul
            } else if self.consume(&TokenKind::Slash) {
                BinOpKind::Div
            } else if self.consume(&TokenKind::Percent) {
                BinOpKind::Mod
            } else {
                return Ok(expr);
            };
            expr = Expression::binary(kind, expr, self.parse_factor()?);
        }
    }

    /// factor = "(" expr ")"
    ///        | "-" factor
    ///        | num
    ///        | ident ("(" (expr ("," expr)*)? ")")?
    fn parse_factor(&mut self) -> Result<Expression> {
        match self.peek() {
            TokenKind::OpenParen => {
                self.tokens.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::CloseParen)?;
                Ok(expr)
            }
            TokenKind::Minus => {
                self.tokens.advance();
                Ok(Expression::negate(self.parse_factor()?))
            }
            TokenKind::Num(num) => {
                let num = *num;
                self.tokens.advance();
                Ok(Expression::Number(num))
            }
            TokenKind::Ident(ident) => {
                let ident = ident.clone();
                self.tokens.advance();
                self.parse_ident(ident)
            }

            t => Err(Error::syntax("expression", t)),
        }
    }

    fn parse_ident(&mut self, name: String) -> Result<Expression> {
        if !self.consume(&TokenKind::OpenParen) {
            return Ok(Expression::Variable(name));
        }

        let mut args = vec![];
        if !self.consume(&TokenKind::CloseParen) {
            args.push(self.parse_expr()?);
            while self.consume(&TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
            self.expect(&TokenKind::CloseParen)?;
        }
        Ok(Expression::Call(name, args))
    }
}
