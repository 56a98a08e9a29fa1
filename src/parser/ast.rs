use std::fmt;

use super::Expression;

/// A whole compilation unit. Built once by the parser and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// Declared globals, in declaration order.
    pub globals: Vec<String>,
    pub procedures: Vec<ProcedureDeclaration>,
    pub body: Statement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureDeclaration {
    /// Also names the procedure's return-value variable.
    pub name: String,
    pub params: Vec<String>,
    pub locals: Vec<String>,
    pub body: Box<Statement>,
}

impl ProcedureDeclaration {
    pub fn local_index(&self, name: &str) -> Option<usize> {
        self.locals.iter().position(|l| l == name)
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Assignment(String, Expression),
    Block(Vec<Statement>),
    If(Condition, Box<Statement>),
    While(Condition, Box<Statement>),
    Writeln(Expression),
    Procedure(ProcedureDeclaration),
}

/// Guards an `IF` or `WHILE`. Never produces a value.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub op: RelOp,
    pub left: Expression,
    pub right: Expression,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl RelOp {
    /// The operator that holds exactly when `self` does not.
    pub fn negate(self) -> RelOp {
        match self {
            RelOp::LessEqual => RelOp::GreaterThan,
            RelOp::LessThan => RelOp::GreaterEqual,
            RelOp::GreaterEqual => RelOp::LessThan,
            RelOp::GreaterThan => RelOp::LessEqual,
            RelOp::Equal => RelOp::NotEqual,
            RelOp::NotEqual => RelOp::Equal,
        }
    }

    pub fn holds(self, left: i32, right: i32) -> bool {
        match self {
            RelOp::Equal => left == right,
            RelOp::NotEqual => left != right,
            RelOp::LessThan => left < right,
            RelOp::LessEqual => left <= right,
            RelOp::GreaterThan => left > right,
            RelOp::GreaterEqual => left >= right,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelOp::Equal => "=",
            RelOp::NotEqual => "<>",
            RelOp::LessThan => "<",
            RelOp::LessEqual => "<=",
            RelOp::GreaterThan => ">",
            RelOp::GreaterEqual => ">=",
        })
    }
}
