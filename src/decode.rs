//! Pure decoding of a 32-bit UM instruction word into an [`Instruction`].

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// The 14 defined UM opcodes, in their bit-pattern order (0..=13).
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive)]
#[repr(u32)]
pub enum Opcode {
    CMov,
    SLoad,
    SStore,
    Add,
    Mul,
    Div,
    Nand,
    Halt,
    Map,
    Unmap,
    Output,
    Input,
    LoadProgram,
    LoadValue,
}

struct Field {
    width: u32,
    lsb: u32,
}

const RA: Field = Field { width: 3, lsb: 6 };
const RB: Field = Field { width: 3, lsb: 3 };
const RC: Field = Field { width: 3, lsb: 0 };
const RL: Field = Field { width: 3, lsb: 25 };
const VL: Field = Field { width: 25, lsb: 0 };
const OP: Field = Field { width: 4, lsb: 28 };

fn mask(bits: u32) -> u32 {
    (1_u32 << bits) - 1
}

fn get(field: &Field, word: u32) -> u32 {
    (word >> field.lsb) & mask(field.width)
}

/// A decoded instruction. `a`/`b`/`c` hold register indices (0..8) for
/// every opcode except `LoadValue`, which instead uses `a` as the
/// destination register and `immediate` as the 25-bit literal.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub opcode: Opcode,
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub immediate: u32,
}

impl Instruction {
    /// Decode `word`. Returns `None` for opcodes 14/15, which are
    /// undefined; the caller turns that into a `ProgramFault`.
    pub fn decode(word: u32) -> Option<Instruction> {
        let opcode = Opcode::from_u32(get(&OP, word))?;
        if let Opcode::LoadValue = opcode {
            Some(Instruction {
                opcode,
                a: get(&RL, word),
                b: 0,
                c: 0,
                immediate: get(&VL, word),
            })
        } else {
            Some(Instruction {
                opcode,
                a: get(&RA, word),
                b: get(&RB, word),
                c: get(&RC, word),
                immediate: 0,
            })
        }
    }

    /// The opcode value as it appears in the instruction word, used
    /// only for error reporting of illegal opcodes (which don't decode
    /// to an `Instruction` at all).
    pub fn raw_opcode(word: u32) -> u32 {
        get(&OP, word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(op: u32, a: u32, b: u32, c: u32) -> u32 {
        (op << 28) | (a << 6) | (b << 3) | c
    }

    #[test]
    fn decodes_three_register_fields() {
        let word = encode(3, 5, 6, 7);
        let inst = Instruction::decode(word).unwrap();
        assert_eq!(inst.opcode, Opcode::Add);
        assert_eq!((inst.a, inst.b, inst.c), (5, 6, 7));
    }

    #[test]
    fn decodes_load_value_with_alternate_fields() {
        // op=13, register field at bits 25..28, 25-bit immediate.
        let word = (13_u32 << 28) | (2_u32 << 25) | 12345;
        let inst = Instruction::decode(word).unwrap();
        assert_eq!(inst.opcode, Opcode::LoadValue);
        assert_eq!(inst.a, 2);
        assert_eq!(inst.immediate, 12345);
    }

    #[test]
    fn opcodes_14_and_15_are_undefined() {
        assert!(Instruction::decode(14_u32 << 28).is_none());
        assert!(Instruction::decode(15_u32 << 28).is_none());
    }

    #[test]
    fn halt_carries_no_operands_but_still_decodes() {
        let word = encode(7, 0, 0, 0);
        let inst = Instruction::decode(word).unwrap();
        assert_eq!(inst.opcode, Opcode::Halt);
    }
}
