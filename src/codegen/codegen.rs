use tracing::debug;

use crate::{
    error::{Error, Result},
    parser::{BinOpKind, Condition, Expression, ProcedureDeclaration, Program, Statement},
};

use super::{
    context::{procedure_label, Context, Slot},
    Address, Assembly, Emitter, Instruction, Line,
    Register::{self, A0, Ra, Sp, Zero, T0, V0},
};

const NEWLINE_LABEL: &str = "newline";
const WORD: i32 = 4;

const SYSCALL_PRINT_INT: i32 = 1;
const SYSCALL_PRINT_STRING: i32 = 4;
const SYSCALL_EXIT: i32 = 10;

#[derive(Debug, Default)]
pub struct Codegen {
    emitter: Emitter,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a whole program: data section, `main`, then every procedure.
    pub fn generate(program: &Program) -> Result<Assembly> {
        let mut ctx = Context::new(&program.procedures);
        for name in &program.globals {
            ctx.declare_global(name);
        }

        let mut text = Codegen::new();
        text.gen_main(&program.body, &mut ctx)?;
        for procedure in &program.procedures {
            text.gen_procedure(procedure, &mut ctx)?;
        }

        // The data section lists globals that were only discovered while
        // compiling the text, so it is assembled last.
        let mut out = Emitter::new();
        out.line(Line::DataSection);
        out.line(Line::Asciiz(NEWLINE_LABEL.to_string(), "\n".to_string()));
        for name in ctx.globals() {
            out.line(Line::Word(super::global_label(name)));
        }
        out.append(text.emitter);

        debug!(globals = ctx.globals().count(), "generated program");
        Ok(out.finish())
    }

    pub fn finish(self) -> Assembly {
        self.emitter.finish()
    }

    fn emit(&mut self, instruction: Instruction) {
        self.emitter.emit(instruction);
    }

    fn push(&mut self, reg: Register, ctx: &mut Context) {
        self.emit(Instruction::SubuImm(Sp, Sp, WORD));
        self.emit(Instruction::Sw(reg, Address::stack(0)));
        ctx.pushed();
    }

    fn pop(&mut self, reg: Register, ctx: &mut Context) -> Result<()> {
        self.emit(Instruction::Lw(reg, Address::stack(0)));
        self.emit(Instruction::AdduImm(Sp, Sp, WORD));
        ctx.popped()
    }

    fn gen_main(&mut self, body: &Statement, ctx: &mut Context) -> Result<()> {
        self.emitter.line(Line::TextSection);
        self.emitter.line(Line::Globl("main".to_string()));
        self.emitter.label("main");

        self.gen_stmt(body, ctx)?;

        self.emit(Instruction::Li(V0, SYSCALL_EXIT));
        self.emit(Instruction::Syscall);
        Ok(())
    }

    /// Prologue pushes the return slot, `$ra` and one zeroed word per local;
    /// the epilogue pops them in reverse, leaving the return value in `$v0`.
    pub fn gen_procedure<'p>(
        &mut self,
        procedure: &'p ProcedureDeclaration,
        ctx: &mut Context<'p>,
    ) -> Result<()> {
        debug!(name = %procedure.name, "compiling procedure");
        ctx.enter_procedure(procedure);
        self.emitter.label(procedure_label(&procedure.name));

        self.push(Zero, ctx);
        self.push(Ra, ctx);
        for _ in &procedure.locals {
            self.push(Zero, ctx);
        }

        self.gen_stmt(&procedure.body, ctx)?;

        for _ in &procedure.locals {
            self.pop(T0, ctx)?;
        }
        self.pop(Ra, ctx)?;
        self.pop(V0, ctx)?;
        self.emit(Instruction::Jr(Ra));

        ctx.leave_procedure()
    }

    pub fn gen_stmt(&mut self, stmt: &Statement, ctx: &mut Context) -> Result<()> {
        match stmt {
            Statement::Assignment(name, expr) => {
                self.gen_expr(expr, ctx)?;
                let addr = match ctx.resolve(name) {
                    Slot::Stack(offset) => Address::stack(offset),
                    Slot::Global(label) => Address::Label(label),
                };
                self.emit(Instruction::Sw(V0, addr));
            }
            Statement::Block(stmts) => {
                for s in stmts {
                    self.gen_stmt(s, ctx)?;
                }
            }
            Statement::If(cond, stmt) => self.gen_if(cond, stmt, ctx)?,
            Statement::While(cond, stmt) => self.gen_while(cond, stmt, ctx)?,
            Statement::Writeln(expr) => self.gen_writeln(expr, ctx)?,
            Statement::Procedure(procedure) => {
                return Err(Error::Internal(format!(
                    "procedure `{}` declared inside a statement",
                    procedure.name
                )));
            }
        };
        Ok(())
    }

    fn gen_if(&mut self, cond: &Condition, stmt: &Statement, ctx: &mut Context) -> Result<()> {
        let end_label = format!("endif{}", ctx.new_label_id());

        self.gen_condition(cond, &end_label, ctx)?;
        self.gen_stmt(stmt, ctx)?;
        self.emitter.label(end_label);
        Ok(())
    }

    fn gen_while(&mut self, cond: &Condition, stmt: &Statement, ctx: &mut Context) -> Result<()> {
        let id = ctx.new_label_id();
        let begin_label = format!("while{id}");
        let end_label = format!("endwhile{id}");

        self.emitter.label(begin_label.clone());
        self.gen_condition(cond, &end_label, ctx)?;
        self.gen_stmt(stmt, ctx)?;
        self.emit(Instruction::J(begin_label));
        self.emitter.label(end_label);
        Ok(())
    }

    fn gen_writeln(&mut self, expr: &Expression, ctx: &mut Context) -> Result<()> {
        self.gen_expr(expr, ctx)?;
        self.emit(Instruction::Move(A0, V0));
        self.emit(Instruction::Li(V0, SYSCALL_PRINT_INT));
        self.emit(Instruction::Syscall);

        self.emit(Instruction::La(A0, NEWLINE_LABEL.to_string()));
        self.emit(Instruction::Li(V0, SYSCALL_PRINT_STRING));
        self.emit(Instruction::Syscall);
        Ok(())
    }

    /// Jump to `label` when the condition is false; fall through otherwise.
    pub fn gen_condition(&mut self, cond: &Condition, label: &str, ctx: &mut Context) -> Result<()> {
        self.gen_expr(&cond.left, ctx)?;
        self.push(V0, ctx);
        self.gen_expr(&cond.right, ctx)?;
        self.pop(T0, ctx)?;
        self.emit(Instruction::Branch(
            cond.op.negate(),
            T0,
            V0,
            label.to_string(),
        ));
        Ok(())
    }

    pub fn gen_expr(&mut self, expr: &Expression, ctx: &mut Context) -> Result<()> {
        match expr {
            Expression::Number(num) => self.emit(Instruction::Li(V0, *num)),
            Expression::Variable(name) => match ctx.resolve(name) {
                Slot::Stack(offset) => self.emit(Instruction::Lw(V0, Address::stack(offset))),
                Slot::Global(label) => {
                    self.emit(Instruction::La(T0, label));
                    self.emit(Instruction::Lw(V0, Address::Offset(0, T0)));
                }
            },
            Expression::BinOp(kind, left, right) => {
                self.gen_expr(left, ctx)?;
                self.push(V0, ctx);
                self.gen_expr(right, ctx)?;
                self.pop(T0, ctx)?;
                self.gen_bin_op_kind(*kind);
            }
            Expression::Call(name, args) => self.gen_call(name, args, ctx)?,
        };
        Ok(())
    }

    /// Left operand in `$t0`, right operand in `$v0`.
    fn gen_bin_op_kind(&mut self, kind: BinOpKind) {
        match kind {
            BinOpKind::Add => self.emit(Instruction::Addu(V0, T0, V0)),
            BinOpKind::Sub => self.emit(Instruction::Subu(V0, T0, V0)),
            BinOpKind::Mul => {
                self.emit(Instruction::Mult(T0, V0));
                self.emit(Instruction::Mflo(V0));
            }
            BinOpKind::Div => {
                self.emit(Instruction::Div(T0, V0));
                self.emit(Instruction::Mflo(V0));
            }
            BinOpKind::Mod => {
                self.emit(Instruction::Div(T0, V0));
                self.emit(Instruction::Mfhi(V0));
            }
        }
    }

    fn gen_call(&mut self, name: &str, args: &[Expression], ctx: &mut Context) -> Result<()> {
        let procedure = ctx.procedure(name)?;
        if procedure.params.len() != args.len() {
            return Err(Error::ArityMismatch {
                name: name.to_string(),
                expected: procedure.params.len(),
                found: args.len(),
            });
        }

        for arg in args {
            self.gen_expr(arg, ctx)?;
            self.push(V0, ctx);
        }

        self.emit(Instruction::Jal(procedure_label(name)));

        for _ in args {
            self.pop(T0, ctx)?;
        }
        Ok(())
    }
}
