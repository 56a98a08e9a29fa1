//! The MIPS subset the generator emits, kept structured so that the
//! simulator can execute it without re-parsing text.

use std::fmt;

use crate::parser::RelOp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    Zero,
    /// Result register: every compiled expression leaves its value here.
    V0,
    A0,
    /// Scratch register.
    T0,
    Sp,
    Ra,
}

impl Register {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Register::Zero => "$zero",
            Register::V0 => "$v0",
            Register::A0 => "$a0",
            Register::T0 => "$t0",
            Register::Sp => "$sp",
            Register::Ra => "$ra",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    /// `offset(reg)`, in bytes.
    Offset(i32, Register),
    Label(String),
}

impl Address {
    pub fn stack(offset: i32) -> Self {
        Address::Offset(offset, Register::Sp)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Offset(0, reg) => write!(f, "({reg})"),
            Address::Offset(offset, reg) => write!(f, "{offset}({reg})"),
            Address::Label(label) => f.write_str(label),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Li(Register, i32),
    La(Register, String),
    Lw(Register, Address),
    Sw(Register, Address),
    Move(Register, Register),
    Addu(Register, Register, Register),
    Subu(Register, Register, Register),
    AdduImm(Register, Register, i32),
    SubuImm(Register, Register, i32),
    Mult(Register, Register),
    Div(Register, Register),
    Mflo(Register),
    Mfhi(Register),
    /// Branch to the label when `lhs op rhs` holds.
    Branch(RelOp, Register, Register, String),
    J(String),
    Jal(String),
    Jr(Register),
    Syscall,
}

pub fn branch_mnemonic(op: RelOp) -> &'static str {
    match op {
        RelOp::Equal => "beq",
        RelOp::NotEqual => "bne",
        RelOp::LessThan => "blt",
        RelOp::LessEqual => "ble",
        RelOp::GreaterThan => "bgt",
        RelOp::GreaterEqual => "bge",
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Li(rd, imm) => write!(f, "li {rd}, {imm}"),
            Instruction::La(rd, label) => write!(f, "la {rd}, {label}"),
            Instruction::Lw(rt, addr) => write!(f, "lw {rt}, {addr}"),
            Instruction::Sw(rt, addr) => write!(f, "sw {rt}, {addr}"),
            Instruction::Move(rd, rs) => write!(f, "move {rd}, {rs}"),
            Instruction::Addu(rd, rs, rt) => write!(f, "addu {rd}, {rs}, {rt}"),
            Instruction::Subu(rd, rs, rt) => write!(f, "subu {rd}, {rs}, {rt}"),
            Instruction::AdduImm(rd, rs, imm) => write!(f, "addu {rd}, {rs}, {imm}"),
            Instruction::SubuImm(rd, rs, imm) => write!(f, "subu {rd}, {rs}, {imm}"),
            Instruction::Mult(rs, rt) => write!(f, "mult {rs}, {rt}"),
            Instruction::Div(rs, rt) => write!(f, "div {rs}, {rt}"),
            Instruction::Mflo(rd) => write!(f, "mflo {rd}"),
            Instruction::Mfhi(rd) => write!(f, "mfhi {rd}"),
            Instruction::Branch(op, rs, rt, label) => {
                write!(f, "{} {rs}, {rt}, {label}", branch_mnemonic(*op))
            }
            Instruction::J(label) => write!(f, "j {label}"),
            Instruction::Jal(label) => write!(f, "jal {label}"),
            Instruction::Jr(rs) => write!(f, "jr {rs}"),
            Instruction::Syscall => f.write_str("syscall"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    DataSection,
    TextSection,
    Globl(String),
    /// `label: .word 0`
    Word(String),
    /// `label: .asciiz "text"`
    Asciiz(String, String),
    Label(String),
    Instruction(Instruction),
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Label(label) => write!(f, "{label}:"),
            Line::DataSection => f.write_str("  .data"),
            Line::TextSection => f.write_str("  .text"),
            Line::Globl(label) => write!(f, "  .globl {label}"),
            Line::Word(label) => write!(f, "  {label}: .word 0"),
            Line::Asciiz(label, text) => {
                write!(f, "  {label}: .asciiz \"{}\"", text.escape_default())
            }
            Line::Instruction(instruction) => write!(f, "  {instruction}"),
        }
    }
}
