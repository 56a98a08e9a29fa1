use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::parser::ProcedureDeclaration;

#[derive(Debug, Default)]
struct Frame {
    variables: HashMap<String, i32>,
}

/// Chained variable scopes for the interpreter.
///
/// A called procedure's frame is linked to its *caller's* frame, so the
/// chain of parents is always the active call stack. It is stored as one:
/// index 0 is the root (global) frame, the last frame is the current one.
#[derive(Debug)]
pub struct Environment<'p> {
    frames: Vec<Frame>,
    procedures: HashMap<&'p str, &'p ProcedureDeclaration>,
}

impl Default for Environment<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> Environment<'p> {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
            procedures: HashMap::new(),
        }
    }

    /// Number of frames, the root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Discard the current frame. The root frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Bind `name` in the current frame, shadowing any outer binding.
    pub fn declare(&mut self, name: &str, value: i32) {
        if let Some(frame) = self.frames.last_mut() {
            frame.variables.insert(name.to_string(), value);
        }
    }

    /// Overwrite the nearest binding of `name`. Unbound names become
    /// globals, whatever frame the write came from.
    pub fn set(&mut self, name: &str, value: i32) {
        let frame = match self
            .frames
            .iter()
            .rposition(|f| f.variables.contains_key(name))
        {
            Some(i) => &mut self.frames[i],
            None => &mut self.frames[0],
        };
        frame.variables.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Result<i32> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.variables.get(name).copied())
            .ok_or_else(|| Error::UnboundVariable(name.to_string()))
    }

    /// Procedures are always registered globally.
    pub fn set_procedure(&mut self, procedure: &'p ProcedureDeclaration) {
        self.procedures.insert(procedure.name.as_str(), procedure);
    }

    pub fn get_procedure(&self, name: &str) -> Result<&'p ProcedureDeclaration> {
        self.procedures
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownProcedure(name.to_string()))
    }
}
