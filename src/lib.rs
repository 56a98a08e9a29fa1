//! Compiler for a small Pascal-like language targeting MIPS.
//!
//! Source text flows through [`lexer`] and [`parser`] into a syntax tree,
//! which is then either lowered to stack-machine MIPS by [`codegen`] or
//! executed directly by [`evaluator`]. [`machine`] runs the generated code so
//! the two backends can be compared.

pub mod codegen;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod machine;
pub mod parser;

use std::io::Write;

use tracing::debug;

use codegen::{Assembly, Codegen};
use evaluator::{Environment, Evaluator, EvaluatorConfig};
use lexer::{Lexer, Tokens};
use machine::{Machine, MachineConfig};
use parser::{Parser, Program};

pub use error::{Error, Result};

pub fn parse(source: &str) -> Result<Program> {
    let tokens = Lexer::tokenize(source)?;
    debug!(tokens = tokens.len(), "tokenized");

    let mut parser = Parser::new(Tokens::new(tokens));
    let program = parser.parse()?;
    debug!(
        globals = program.globals.len(),
        procedures = program.procedures.len(),
        "parsed program"
    );
    Ok(program)
}

pub fn compile(source: &str) -> Result<Assembly> {
    let program = parse(source)?;
    Codegen::generate(&program)
}

/// Interpret `source`, writing one line per `writeln` to `out`.
pub fn interpret(source: &str, out: &mut impl Write) -> Result<()> {
    interpret_with(source, out, EvaluatorConfig::default())
}

pub fn interpret_with(
    source: &str,
    out: &mut impl Write,
    config: EvaluatorConfig,
) -> Result<()> {
    let program = parse(source)?;
    let mut env = Environment::new();
    Evaluator::with_config(out, config).run(&program, &mut env)
}

/// Execute compiled code and return everything it printed.
pub fn simulate(assembly: &Assembly, config: MachineConfig) -> Result<String> {
    Machine::new(assembly, config)?.run()
}
