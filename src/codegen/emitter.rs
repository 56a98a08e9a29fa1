use std::fmt;

use super::{Instruction, Line};

/// Collects emitted lines in program order.
#[derive(Debug, Default)]
pub struct Emitter {
    lines: Vec<Line>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.lines.push(Line::Instruction(instruction));
    }

    pub fn label(&mut self, label: impl Into<String>) {
        self.lines.push(Line::Label(label.into()));
    }

    pub fn line(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn append(&mut self, other: Emitter) {
        self.lines.extend(other.lines);
    }

    pub fn finish(self) -> Assembly {
        Assembly { lines: self.lines }
    }
}

/// A complete instruction stream. `Display` renders it as assembler text:
/// labels flush left, everything else indented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assembly {
    lines: Vec<Line>,
}

impl Assembly {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|line| match line {
            Line::Instruction(i) => Some(i),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Label(l) => Some(l.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
