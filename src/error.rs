//! Errors shared by every stage of the pipeline.
//!
//! Each stage surfaces its failure to the immediate caller; nothing retries
//! or recovers. A failed compilation never yields a usable instruction stream.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The lexer hit input that starts no token.
    #[error("can't tokenize `{text}` at offset {position}")]
    Lexical { position: usize, text: String },

    /// The current token does not match what the grammar expects.
    #[error("expected {expected}, found {found}")]
    Syntax { expected: String, found: String },

    /// A variable read that no reachable environment frame can satisfy.
    #[error("unbound variable `{0}`")]
    UnboundVariable(String),

    #[error("call to undeclared procedure `{0}`")]
    UnknownProcedure(String),

    #[error("procedure `{name}` takes {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// The interpreter refused a call nested deeper than its limit.
    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("division by zero")]
    DivisionByZero,

    /// A code generator invariant was violated. This is a generator bug,
    /// not a problem with the input program.
    #[error("internal code generator error: {0}")]
    Internal(String),

    /// The simulator could not continue executing the instruction stream.
    #[error("machine trap: {0}")]
    Trap(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn syntax(expected: impl ToString, found: impl ToString) -> Self {
        Self::Syntax {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
