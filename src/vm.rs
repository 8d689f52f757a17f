//! The fetch-decode-execute loop and the eight general-purpose
//! registers that sit on top of a [`SegmentStore`].

use std::io::{Read, Write};

use log::trace;

use crate::decode::{Instruction, Opcode};
use crate::error::{HostError, ProgramFault, RumError};
use crate::segment::SegmentStore;

/// Registers, program counter, and the segment store they address.
///
/// Owns the entirety of a single run's mutable state; nothing about a
/// `Vm` is shared across threads or reentered.
pub struct Vm {
    registers: [u32; 8],
    pc: u32,
    store: SegmentStore,
}

impl Vm {
    pub fn new(program: Vec<u32>) -> Vm {
        Vm { registers: [0; 8], pc: 0, store: SegmentStore::new_from_program(program) }
    }

    /// Run to completion (`HALT`), reading `input` byte-by-byte for
    /// `IN` and writing each `OUT` byte to `output`. `output` is
    /// flushed once more before returning, regardless of outcome, so a
    /// buffered writer's pending bytes are never lost on a fail-stop
    /// error.
    pub fn run<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), RumError> {
        let result = self.run_inner(input, output);
        output.flush().map_err(HostError::Stdout)?;
        result
    }

    fn run_inner<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), RumError> {
        loop {
            let len = self.store.program_len();
            if self.pc >= len {
                return Err(ProgramFault::PcOverrun { pc: self.pc, len }.into());
            }

            let word = self.store.fetch(self.pc).map_err(|f| f.at_pc(self.pc))?;
            let instr = Instruction::decode(word).ok_or(ProgramFault::IllegalInstruction {
                pc: self.pc,
                opcode: Instruction::raw_opcode(word),
            })?;

            let mut jumped = false;
            self.apply(instr, input, output, &mut jumped)?;

            if !jumped {
                self.pc += 1;
            }

            if let Opcode::Halt = instr.opcode {
                return Ok(());
            }
        }
    }

    fn apply<R: Read, W: Write>(
        &mut self,
        instr: Instruction,
        input: &mut R,
        output: &mut W,
        jumped: &mut bool,
    ) -> Result<(), RumError> {
        let pc = self.pc;
        let r = &mut self.registers;
        match instr.opcode {
            Opcode::CMov => {
                if r[instr.c as usize] != 0 {
                    r[instr.a as usize] = r[instr.b as usize];
                }
            }
            Opcode::SLoad => {
                let (id, off) = (r[instr.b as usize], r[instr.c as usize]);
                r[instr.a as usize] =
                    self.store.load(id, off).map_err(|f| f.at_pc(pc))?;
            }
            Opcode::SStore => {
                let (id, off, value) =
                    (r[instr.a as usize], r[instr.b as usize], r[instr.c as usize]);
                self.store.store(id, off, value).map_err(|f| f.at_pc(pc))?;
            }
            Opcode::Add => {
                r[instr.a as usize] =
                    r[instr.b as usize].wrapping_add(r[instr.c as usize]);
            }
            Opcode::Mul => {
                r[instr.a as usize] =
                    r[instr.b as usize].wrapping_mul(r[instr.c as usize]);
            }
            Opcode::Div => {
                let divisor = r[instr.c as usize];
                if divisor == 0 {
                    return Err(ProgramFault::DivisionByZero { pc }.into());
                }
                r[instr.a as usize] = r[instr.b as usize] / divisor;
            }
            Opcode::Nand => {
                r[instr.a as usize] = !(r[instr.b as usize] & r[instr.c as usize]);
            }
            Opcode::Halt => {
                trace!("halt at pc={pc}");
            }
            Opcode::Map => {
                let size = r[instr.c as usize];
                r[instr.b as usize] = self.store.map(size).map_err(RumError::from)?;
            }
            Opcode::Unmap => {
                let id = r[instr.c as usize];
                self.store.unmap(id).map_err(|f| f.at_pc(pc))?;
            }
            Opcode::Output => {
                let value = r[instr.c as usize];
                if value > 255 {
                    return Err(ProgramFault::OutputOutOfRange { pc, value }.into());
                }
                output.write_all(&[value as u8]).map_err(HostError::Stdout)?;
            }
            Opcode::Input => {
                let mut byte = [0_u8; 1];
                r[instr.c as usize] = match input.read(&mut byte).map_err(HostError::Stdin)? {
                    1 => byte[0] as u32,
                    _ => u32::MAX,
                };
            }
            Opcode::LoadProgram => {
                let (segment, target) = (r[instr.b as usize], r[instr.c as usize]);
                self.store.clone_to_zero(segment).map_err(|f| f.at_pc(pc))?;
                self.pc = target;
                *jumped = true;
            }
            Opcode::LoadValue => {
                r[instr.a as usize] = instr.immediate;
            }
        }
        Ok(())
    }
}
