mod lexer;
mod source;
mod token;

pub use lexer::*;
pub use source::*;
pub use token::{Token, TokenKind};
