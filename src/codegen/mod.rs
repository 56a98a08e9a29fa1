mod codegen;
mod context;
mod emitter;
mod instruction;

pub use codegen::*;
pub use context::*;
pub use emitter::*;
pub use instruction::*;
