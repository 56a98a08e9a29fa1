use std::fmt;

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Number(i32),
    Variable(String),
    BinOp(BinOpKind, Box<Expression>, Box<Expression>),
    Call(String, Vec<Expression>),
}

impl Expression {
    pub fn binary(kind: BinOpKind, left: Expression, right: Expression) -> Self {
        Expression::BinOp(kind, Box::new(left), Box::new(right))
    }

    /// `-factor` has no node of its own; it is `-1 * factor`.
    pub fn negate(operand: Expression) -> Self {
        Expression::binary(BinOpKind::Mul, Expression::Number(-1), operand)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOpKind {
    /// 32-bit arithmetic with the target's overflow behaviour: `+ - *`
    /// wrap, `/` truncates toward zero and `%` follows the dividend's sign.
    pub fn apply(self, left: i32, right: i32) -> Result<i32> {
        match self {
            BinOpKind::Add => Ok(left.wrapping_add(right)),
            BinOpKind::Sub => Ok(left.wrapping_sub(right)),
            BinOpKind::Mul => Ok(left.wrapping_mul(right)),
            BinOpKind::Div | BinOpKind::Mod if right == 0 => Err(Error::DivisionByZero),
            BinOpKind::Div => Ok(left.wrapping_div(right)),
            BinOpKind::Mod => Ok(left.wrapping_rem(right)),
        }
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
        })
    }
}
