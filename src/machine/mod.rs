mod machine;

pub use machine::*;
