use std::io::Write;

use tracing::trace;

use crate::error::{Error, Result};
use crate::parser::{Condition, Expression, Program, Statement};

use super::Environment;

#[derive(Clone, Debug)]
pub struct EvaluatorConfig {
    /// Procedure activations allowed at once. Each one recurses on the
    /// native stack, so this bounds its use.
    pub max_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Executes a program straight from its syntax tree, writing `writeln`
/// output to `out`.
pub struct Evaluator<W: Write> {
    out: W,
    config: EvaluatorConfig,
}

impl<W: Write> Evaluator<W> {
    pub fn new(out: W) -> Self {
        Self::with_config(out, EvaluatorConfig::default())
    }

    pub fn with_config(out: W, config: EvaluatorConfig) -> Self {
        Self { out, config }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Bind declared globals to 0 and register every procedure, then run the
    /// program body.
    pub fn run<'p>(&mut self, program: &'p Program, env: &mut Environment<'p>) -> Result<()> {
        for name in &program.globals {
            env.set(name, 0);
        }
        for procedure in &program.procedures {
            env.set_procedure(procedure);
        }
        self.exec(&program.body, env)
    }

    pub fn exec<'p>(&mut self, stmt: &'p Statement, env: &mut Environment<'p>) -> Result<()> {
        match stmt {
            Statement::Assignment(name, expr) => {
                let value = self.eval(expr, env)?;
                env.set(name, value);
            }
            Statement::Block(stmts) => {
                for s in stmts {
                    self.exec(s, env)?;
                }
            }
            Statement::If(cond, stmt) => {
                if self.eval_condition(cond, env)? {
                    self.exec(stmt, env)?;
                }
            }
            Statement::While(cond, stmt) => {
                while self.eval_condition(cond, env)? {
                    self.exec(stmt, env)?;
                }
            }
            Statement::Writeln(expr) => {
                let value = self.eval(expr, env)?;
                writeln!(self.out, "{value}")?;
            }
            Statement::Procedure(procedure) => env.set_procedure(procedure),
        }
        Ok(())
    }

    pub fn eval<'p>(&mut self, expr: &'p Expression, env: &mut Environment<'p>) -> Result<i32> {
        match expr {
            Expression::Number(num) => Ok(*num),
            Expression::Variable(name) => env.get(name),
            Expression::BinOp(kind, left, right) => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                kind.apply(left, right)
            }
            Expression::Call(name, args) => self.call(name, args, env),
        }
    }

    fn eval_condition<'p>(&mut self, cond: &'p Condition, env: &mut Environment<'p>) -> Result<bool> {
        let left = self.eval(&cond.left, env)?;
        let right = self.eval(&cond.right, env)?;
        Ok(cond.op.holds(left, right))
    }

    /// The callee's frame sits on top of the caller's, so the body can see
    /// (and assign) anything visible at the call site.
    fn call<'p>(
        &mut self,
        name: &str,
        args: &'p [Expression],
        env: &mut Environment<'p>,
    ) -> Result<i32> {
        let procedure = env.get_procedure(name)?;
        if procedure.params.len() != args.len() {
            return Err(Error::ArityMismatch {
                name: name.to_string(),
                expected: procedure.params.len(),
                found: args.len(),
            });
        }

        // the root frame is not an activation
        if env.depth() > self.config.max_depth {
            return Err(Error::CallDepthExceeded(self.config.max_depth));
        }

        let values = args
            .iter()
            .map(|arg| self.eval(arg, env))
            .collect::<Result<Vec<_>>>()?;
        trace!(name, ?values, depth = env.depth(), "calling procedure");

        // Later declarations win: the return slot shadows a local, which
        // shadows a parameter, matching how the code generator resolves names.
        // Parameters go in reverse so a repeated name keeps its first argument.
        env.push_frame();
        for (param, value) in procedure.params.iter().zip(values).rev() {
            env.declare(param, value);
        }
        for local in &procedure.locals {
            env.declare(local, 0);
        }
        env.declare(name, 0);

        let result = self.exec(&procedure.body, env).and_then(|()| env.get(name));
        env.pop_frame();
        result
    }
}
