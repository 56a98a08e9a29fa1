//! Per-compilation state: label numbering, the procedure being compiled and
//! the stack depth at the current emission point.
//!
//! There is no frame pointer, so every stack slot is addressed relative to
//! `$sp`. For a procedure with `P` parameters and `L` locals the stack looks
//! like this right after its prologue (higher addresses first):
//!
//! ```text
//!   arg 0 .. arg P-1      pushed by the caller, left to right
//!   return slot           procedure's own name, initialised to 0
//!   $ra
//!   local 0 .. local L-1  initialised to 0
//!   temporaries           pushed while evaluating expressions
//! ```
//!
//! `depth` counts every word pushed since the procedure was entered, so it
//! is `L + 2` at statement boundaries. Offsets are derived from it on every
//! reference and never cached.

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::trace;

use crate::error::{Error, Result};
use crate::parser::ProcedureDeclaration;

/// Where a name lives at the current emission point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Byte offset from `$sp`.
    Stack(i32),
    /// Data label of a global word.
    Global(String),
}

pub fn global_label(name: &str) -> String {
    format!("var{name}")
}

pub fn procedure_label(name: &str) -> String {
    format!("proc{name}")
}

#[derive(Debug)]
pub struct Context<'p> {
    next_label: usize,
    procedures: HashMap<&'p str, &'p ProcedureDeclaration>,
    current: Option<&'p ProcedureDeclaration>,
    depth: usize,
    globals: IndexSet<String>,
}

impl<'p> Context<'p> {
    pub fn new(procedures: &'p [ProcedureDeclaration]) -> Self {
        Self {
            next_label: 0,
            procedures: procedures.iter().map(|p| (p.name.as_str(), p)).collect(),
            current: None,
            depth: 0,
            globals: IndexSet::new(),
        }
    }

    /// A fresh id for a label family (`whileN` / `endwhileN`). Never reused
    /// within one compilation.
    pub fn new_label_id(&mut self) -> usize {
        self.next_label += 1;
        self.next_label
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn current_procedure(&self) -> Option<&'p ProcedureDeclaration> {
        self.current
    }

    pub(super) fn pushed(&mut self) {
        self.depth += 1;
    }

    pub(super) fn popped(&mut self) -> Result<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| Error::Internal("pop from an empty stack".to_string()))?;
        Ok(())
    }

    pub fn enter_procedure(&mut self, procedure: &'p ProcedureDeclaration) {
        self.current = Some(procedure);
        self.depth = 0;
    }

    pub fn leave_procedure(&mut self) -> Result<()> {
        let procedure = self.current.take();
        if self.depth != 0 {
            return Err(Error::Internal(format!(
                "procedure `{}` left {} word(s) on the stack",
                procedure.map(|p| p.name.as_str()).unwrap_or_default(),
                self.depth
            )));
        }
        Ok(())
    }

    pub fn procedure(&self, name: &str) -> Result<&'p ProcedureDeclaration> {
        self.procedures
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownProcedure(name.to_string()))
    }

    pub fn declare_global(&mut self, name: &str) {
        if !self.globals.contains(name) {
            self.globals.insert(name.to_string());
        }
    }

    /// Declared globals first, then undeclared ones in first-use order.
    pub fn globals(&self) -> impl Iterator<Item = &str> {
        self.globals.iter().map(String::as_str)
    }

    /// Resolve `name` by its lexical role in the current procedure:
    /// return slot, then local, then parameter, otherwise global.
    pub fn resolve(&mut self, name: &str) -> Slot {
        let Some(procedure) = self.current else {
            return self.global(name);
        };
        let d = self.depth as i32;

        let offset = if procedure.name == name {
            4 * (d - 1)
        } else if let Some(i) = procedure.local_index(name) {
            4 * (d - i as i32 - 3)
        } else if let Some(i) = procedure.param_index(name) {
            let p = procedure.params.len() as i32;
            4 * (p + d - i as i32 - 1)
        } else {
            return self.global(name);
        };

        trace!(procedure = %procedure.name, name, depth = d, offset, "resolved stack slot");
        Slot::Stack(offset)
    }

    fn global(&mut self, name: &str) -> Slot {
        self.declare_global(name);
        Slot::Global(global_label(name))
    }
}
