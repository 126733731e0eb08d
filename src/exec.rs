use crate::cpu::{Cpu, Flag, Trap};
use crate::decoder::{Decoded, Op};
use crate::instructions::{FLAG_REG, WORD};
use crate::memory::Bus;

/// What the core does with `pc` after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Fall through to `pc + 4`.
    Next,
    /// Replace `pc`; no increment this step.
    Jump(u32),
    Halt,
}

pub trait Executor {
    /// Runs one decoded word. `cpu.pc` still holds the address of that word.
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<Flow, Trap>;
}

pub struct IntExecutor;

impl IntExecutor {
    fn alu(op: Op, a: u8, b: u8) -> u8 {
        match op {
            Op::Add | Op::AddI => a.wrapping_add(b),
            Op::Sub | Op::SubI => a.wrapping_sub(b),
            Op::And | Op::AndI => a & b,
            Op::Or | Op::OrI => a | b,
            Op::Xor | Op::XorI => a ^ b,
            _ => unreachable!("{op:?} is not an ALU op"),
        }
    }

    fn branch_if(taken: bool, target: u32) -> Flow {
        if taken {
            Flow::Jump(target)
        } else {
            Flow::Next
        }
    }
}

impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<Flow, Trap> {
        let flow = match d.op {
            Op::Add | Op::Sub | Op::And | Op::Or | Op::Xor => {
                let a = cpu.regs[d.rs1 as usize];
                let b = cpu.regs[d.rs2 as usize];
                cpu.regs[d.rd as usize] = Self::alu(d.op, a, b);
                Flow::Next
            }
            Op::AddI | Op::SubI | Op::AndI | Op::OrI | Op::XorI => {
                let b = cpu.regs[d.rs1 as usize];
                cpu.regs[d.rd as usize] = Self::alu(d.op, d.imm as u8, b);
                Flow::Next
            }
            Op::Store => {
                let addr = d.imm;
                let val = cpu.regs[d.rd as usize];
                bus.write_u8(addr, val)
                    .map_err(|source| Trap::Bus { addr, source })?;
                Flow::Next
            }
            Op::Load => {
                let addr = d.imm;
                let val = bus
                    .read_u8(addr)
                    .map_err(|source| Trap::Bus { addr, source })?;
                cpu.regs[d.rd as usize] = val;
                Flow::Next
            }
            Op::Cmp => {
                let flag = Flag::compare(cpu.regs[d.rs1 as usize], cpu.regs[d.rs2 as usize]);
                cpu.regs[FLAG_REG] = flag as u8;
                Flow::Next
            }
            Op::Jmp => Flow::Jump(d.imm),
            Op::Jeq => Self::branch_if(cpu.flag() == Some(Flag::Equal), d.imm),
            Op::Jne => Self::branch_if(cpu.flag().is_some_and(|f| !f.is_equal()), d.imm),
            Op::Jlt => Self::branch_if(cpu.flag() == Some(Flag::Less), d.imm),
            Op::Jgt => Self::branch_if(cpu.flag() == Some(Flag::Greater), d.imm),
            Op::Jal => {
                cpu.ret_stack.push(cpu.pc);
                Flow::Jump(d.imm)
            }
            Op::Ret => {
                let ra = cpu
                    .ret_stack
                    .pop()
                    .ok_or(Trap::StackUnderflow { pc: cpu.pc })?;
                // `ra` is the jal slot itself; resuming there would call again.
                // Execution continues with the word after it.
                Flow::Jump(ra.wrapping_add(WORD))
            }
            Op::Halt => Flow::Halt,
            Op::Noop => Flow::Next,
        };
        Ok(flow)
    }
}
