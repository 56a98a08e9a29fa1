mod environment;
mod evaluator;

pub use environment::*;
pub use evaluator::*;
