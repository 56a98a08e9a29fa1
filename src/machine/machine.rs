use std::collections::HashMap;

use tracing::debug;

use crate::codegen::{Address, Assembly, Instruction, Line, Register};
use crate::error::{Error, Result};

pub const DATA_BASE: u32 = 0x1001_0000;
pub const STACK_TOP: u32 = 0x7fff_effc;

const SYSCALL_PRINT_INT: i32 = 1;
const SYSCALL_PRINT_STRING: i32 = 4;
const SYSCALL_EXIT: i32 = 10;

#[derive(Clone, Debug)]
pub struct MachineConfig {
    /// Instructions executed before the run is abandoned.
    pub max_steps: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

fn trap(message: impl Into<String>) -> Error {
    Error::Trap(message.into())
}

/// Executes an [`Assembly`] directly from its structured lines.
#[derive(Debug)]
pub struct Machine<'a> {
    text: Vec<&'a Instruction>,
    text_labels: HashMap<&'a str, usize>,
    data_labels: HashMap<&'a str, u32>,
    strings: HashMap<u32, &'a str>,
    memory: HashMap<u32, i32>,
    registers: [i32; Register::COUNT],
    hi: i32,
    lo: i32,
    pc: usize,
    steps: usize,
    output: String,
    config: MachineConfig,
}

impl<'a> Machine<'a> {
    pub fn new(assembly: &'a Assembly, config: MachineConfig) -> Result<Self> {
        let mut machine = Self {
            text: vec![],
            text_labels: HashMap::new(),
            data_labels: HashMap::new(),
            strings: HashMap::new(),
            memory: HashMap::new(),
            registers: [0; Register::COUNT],
            hi: 0,
            lo: 0,
            pc: 0,
            steps: 0,
            output: String::new(),
            config,
        };
        machine.load(assembly)?;
        machine.registers[Register::Sp.index()] = STACK_TOP as i32;
        machine.pc = machine.jump_target("main")?;
        Ok(machine)
    }

    fn load(&mut self, assembly: &'a Assembly) -> Result<()> {
        let mut in_text = false;
        let mut next_data = DATA_BASE;

        for line in assembly.lines() {
            match line {
                Line::DataSection => in_text = false,
                Line::TextSection => in_text = true,
                Line::Globl(_) => (),
                Line::Word(label) => {
                    self.define_data(label, next_data)?;
                    self.memory.insert(next_data, 0);
                    next_data += 4;
                }
                Line::Asciiz(label, text) => {
                    self.define_data(label, next_data)?;
                    self.strings.insert(next_data, text);
                    next_data += (text.len() as u32 + 1).next_multiple_of(4);
                }
                Line::Label(label) if in_text => {
                    if self
                        .text_labels
                        .insert(label.as_str(), self.text.len())
                        .is_some()
                    {
                        return Err(trap(format!("duplicate label `{label}`")));
                    }
                }
                Line::Label(label) => self.define_data(label, next_data)?,
                Line::Instruction(instruction) if in_text => self.text.push(instruction),
                Line::Instruction(instruction) => {
                    return Err(trap(format!("instruction `{instruction}` outside .text")));
                }
            }
        }
        Ok(())
    }

    fn define_data(&mut self, label: &'a str, address: u32) -> Result<()> {
        if self.data_labels.insert(label, address).is_some() {
            return Err(trap(format!("duplicate label `{label}`")));
        }
        Ok(())
    }

    pub fn register(&self, reg: Register) -> i32 {
        self.registers[reg.index()]
    }

    fn set(&mut self, reg: Register, value: i32) {
        if reg != Register::Zero {
            self.registers[reg.index()] = value;
        }
    }

    fn jump_target(&self, label: &str) -> Result<usize> {
        self.text_labels
            .get(label)
            .copied()
            .ok_or_else(|| trap(format!("unknown text label `{label}`")))
    }

    fn data_address(&self, label: &str) -> Result<u32> {
        self.data_labels
            .get(label)
            .copied()
            .ok_or_else(|| trap(format!("unknown data label `{label}`")))
    }

    fn address(&self, address: &Address) -> Result<u32> {
        let addr = match address {
            Address::Offset(offset, reg) => (self.register(*reg) as u32).wrapping_add(*offset as u32),
            Address::Label(label) => self.data_address(label)?,
        };
        if addr % 4 != 0 {
            return Err(trap(format!("unaligned word access at {addr:#010x}")));
        }
        Ok(addr)
    }

    fn load_word(&self, address: &Address) -> Result<i32> {
        let addr = self.address(address)?;
        self.memory
            .get(&addr)
            .copied()
            .ok_or_else(|| trap(format!("read of uninitialised word at {addr:#010x}")))
    }

    fn store_word(&mut self, address: &Address, value: i32) -> Result<()> {
        let addr = self.address(address)?;
        self.memory.insert(addr, value);
        Ok(())
    }

    /// Run until the exit syscall and return everything printed.
    pub fn run(mut self) -> Result<String> {
        while self.steps < self.config.max_steps {
            self.steps += 1;
            if let Flow::Exit = self.step()? {
                debug!(steps = self.steps, "machine exited");
                return Ok(self.output);
            }
        }
        Err(trap(format!(
            "step limit of {} exceeded",
            self.config.max_steps
        )))
    }

    fn step(&mut self) -> Result<Flow> {
        let instruction: &'a Instruction = *self
            .text
            .get(self.pc)
            .ok_or_else(|| trap("execution ran past the end of .text"))?;
        self.pc += 1;

        match instruction {
            Instruction::Li(rd, imm) => self.set(*rd, *imm),
            Instruction::La(rd, label) => {
                let addr = self.data_address(label)?;
                self.set(*rd, addr as i32);
            }
            Instruction::Lw(rt, addr) => {
                let value = self.load_word(addr)?;
                self.set(*rt, value);
            }
            Instruction::Sw(rt, addr) => self.store_word(addr, self.register(*rt))?,
            Instruction::Move(rd, rs) => self.set(*rd, self.register(*rs)),
            Instruction::Addu(rd, rs, rt) => {
                self.set(*rd, self.register(*rs).wrapping_add(self.register(*rt)))
            }
            Instruction::Subu(rd, rs, rt) => {
                self.set(*rd, self.register(*rs).wrapping_sub(self.register(*rt)))
            }
            Instruction::AdduImm(rd, rs, imm) => self.set(*rd, self.register(*rs).wrapping_add(*imm)),
            Instruction::SubuImm(rd, rs, imm) => self.set(*rd, self.register(*rs).wrapping_sub(*imm)),
            Instruction::Mult(rs, rt) => {
                let product = self.register(*rs) as i64 * self.register(*rt) as i64;
                self.lo = product as i32;
                self.hi = (product >> 32) as i32;
            }
            Instruction::Div(rs, rt) => {
                let (dividend, divisor) = (self.register(*rs), self.register(*rt));
                if divisor == 0 {
                    return Err(Error::DivisionByZero);
                }
                self.lo = dividend.wrapping_div(divisor);
                self.hi = dividend.wrapping_rem(divisor);
            }
            Instruction::Mflo(rd) => self.set(*rd, self.lo),
            Instruction::Mfhi(rd) => self.set(*rd, self.hi),
            Instruction::Branch(op, rs, rt, label) => {
                if op.holds(self.register(*rs), self.register(*rt)) {
                    self.pc = self.jump_target(label)?;
                }
            }
            Instruction::J(label) => self.pc = self.jump_target(label)?,
            Instruction::Jal(label) => {
                self.set(Register::Ra, self.pc as i32);
                self.pc = self.jump_target(label)?;
            }
            Instruction::Jr(rs) => {
                let target = self.register(*rs);
                self.pc = usize::try_from(target)
                    .map_err(|_| trap(format!("jump to invalid address {target}")))?;
            }
            Instruction::Syscall => return self.syscall(),
        }
        Ok(Flow::Continue)
    }

    fn syscall(&mut self) -> Result<Flow> {
        let a0 = self.register(Register::A0);
        match self.register(Register::V0) {
            SYSCALL_PRINT_INT => {
                self.output.push_str(&a0.to_string());
            }
            SYSCALL_PRINT_STRING => {
                let text: &'a str = *self
                    .strings
                    .get(&(a0 as u32))
                    .ok_or_else(|| trap(format!("no string at {:#010x}", a0 as u32)))?;
                self.output.push_str(text);
            }
            SYSCALL_EXIT => return Ok(Flow::Exit),
            code => return Err(trap(format!("unsupported syscall {code}"))),
        }
        Ok(Flow::Continue)
    }
}
