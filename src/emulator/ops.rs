//! Instruction decoding, encoding and dispatch.
//!
//! Two formats share the top four opcode bits:
//!
//! ```text
//! standard:  oooo ---- ---- ---- ---- ---a aabb bccc
//! immediate: 1101 aaav vvvv vvvv vvvv vvvv vvvv vvvv
//! ```

use std::fmt;
use std::ops::Range;

use super::io::IoPort;
use super::registers::Reg;
use super::{Emulator, UmError};

mod arithmetic;
mod char_io;
mod memory;

pub use char_io::END_OF_INPUT;

pub const IMMEDIATE_MASK: u32 = (1 << 25) - 1;

/// Extracts bit fields the way they are drawn in instruction diagrams,
/// big end first: `word.range(8..6)` is bits 8, 7 and 6.
pub trait BitAddressable {
    fn index(&self, bit: u8) -> Self;
    fn range(&self, slice: Range<u8>) -> Self;
}

impl BitAddressable for u32 {
    fn index(&self, bit: u8) -> Self {
        (self >> bit) & 1
    }

    fn range(&self, slice: Range<u8>) -> Self {
        // Reversed range: bigger (start) to smaller (end)
        debug_assert!(slice.start >= slice.end && slice.start < 32, "Invalid range");
        let width = u32::from(slice.start + 1 - slice.end);
        let mask = ((1u64 << width) - 1) as u32;
        (self >> slice.end) & mask
    }
}

/// The three register fields of a standard instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operands {
    pub a: Reg,
    pub b: Reg,
    pub c: Reg,
}

impl Operands {
    pub fn decode(word: u32) -> Self {
        Self {
            a: Reg::from_field(word.range(8..6)),
            b: Reg::from_field(word.range(5..3)),
            c: Reg::from_field(word.range(2..0)),
        }
    }

    fn encode(&self) -> u32 {
        ((self.a.index() as u32) << 6) | ((self.b.index() as u32) << 3) | self.c.index() as u32
    }
}

/// A decoded instruction. Decoding is total: every word maps to exactly one
/// variant, with opcodes 14 and 15 landing in [`OpCode::Illegal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    ConditionalMove(Operands),
    SegmentLoad(Operands),
    SegmentStore(Operands),
    Add(Operands),
    Multiply(Operands),
    Divide(Operands),
    Nand(Operands),
    Halt,
    MapSegment(Operands),
    UnmapSegment(Operands),
    Output(Operands),
    Input(Operands),
    LoadProgram(Operands),
    LoadImmediate { a: Reg, value: u32 },
    Illegal(u8),
}

/// What the engine does after an instruction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

impl OpCode {
    pub fn decode(word: u32) -> Self {
        let opcode = word.range(31..28) as u8;
        let ops = Operands::decode(word);

        match opcode {
            0 => OpCode::ConditionalMove(ops),
            1 => OpCode::SegmentLoad(ops),
            2 => OpCode::SegmentStore(ops),
            3 => OpCode::Add(ops),
            4 => OpCode::Multiply(ops),
            5 => OpCode::Divide(ops),
            6 => OpCode::Nand(ops),
            7 => OpCode::Halt,
            8 => OpCode::MapSegment(ops),
            9 => OpCode::UnmapSegment(ops),
            10 => OpCode::Output(ops),
            11 => OpCode::Input(ops),
            12 => OpCode::LoadProgram(ops),
            13 => OpCode::LoadImmediate {
                a: Reg::from_field(word.range(27..25)),
                value: word.range(24..0),
            },
            other => OpCode::Illegal(other),
        }
    }

    /// The 4-bit opcode number.
    pub fn number(&self) -> u8 {
        match self {
            OpCode::ConditionalMove(_) => 0,
            OpCode::SegmentLoad(_) => 1,
            OpCode::SegmentStore(_) => 2,
            OpCode::Add(_) => 3,
            OpCode::Multiply(_) => 4,
            OpCode::Divide(_) => 5,
            OpCode::Nand(_) => 6,
            OpCode::Halt => 7,
            OpCode::MapSegment(_) => 8,
            OpCode::UnmapSegment(_) => 9,
            OpCode::Output(_) => 10,
            OpCode::Input(_) => 11,
            OpCode::LoadProgram(_) => 12,
            OpCode::LoadImmediate { .. } => 13,
            OpCode::Illegal(op) => *op & 0xF,
        }
    }

    /// Packs the instruction back into a word. Bits the format does not use
    /// are zero, and immediates wider than 25 bits are truncated.
    pub fn encode(&self) -> u32 {
        let opcode = u32::from(self.number()) << 28;
        match self {
            OpCode::ConditionalMove(ops)
            | OpCode::SegmentLoad(ops)
            | OpCode::SegmentStore(ops)
            | OpCode::Add(ops)
            | OpCode::Multiply(ops)
            | OpCode::Divide(ops)
            | OpCode::Nand(ops)
            | OpCode::MapSegment(ops)
            | OpCode::UnmapSegment(ops)
            | OpCode::Output(ops)
            | OpCode::Input(ops)
            | OpCode::LoadProgram(ops) => opcode | ops.encode(),
            OpCode::LoadImmediate { a, value } => {
                opcode | ((a.index() as u32) << 25) | (value & IMMEDIATE_MASK)
            }
            OpCode::Halt | OpCode::Illegal(_) => opcode,
        }
    }

    pub(crate) fn execute<P: IoPort>(
        &self,
        emulator: &mut Emulator<P>,
        word: u32,
    ) -> Result<Flow, UmError> {
        match *self {
            OpCode::ConditionalMove(ops) => arithmetic::conditional_move(emulator, ops),
            OpCode::SegmentLoad(ops) => memory::segment_load(emulator, ops)?,
            OpCode::SegmentStore(ops) => memory::segment_store(emulator, ops)?,
            OpCode::Add(ops) => arithmetic::add(emulator, ops),
            OpCode::Multiply(ops) => arithmetic::multiply(emulator, ops),
            OpCode::Divide(ops) => arithmetic::divide(emulator, ops)?,
            OpCode::Nand(ops) => arithmetic::nand(emulator, ops),
            OpCode::Halt => return Ok(Flow::Halt),
            OpCode::MapSegment(ops) => memory::map_segment(emulator, ops),
            OpCode::UnmapSegment(ops) => memory::unmap_segment(emulator, ops)?,
            OpCode::Output(ops) => char_io::output(emulator, ops)?,
            OpCode::Input(ops) => char_io::input(emulator, ops)?,
            OpCode::LoadProgram(ops) => memory::load_program(emulator, ops)?,
            OpCode::LoadImmediate { a, value } => arithmetic::load_immediate(emulator, a, value),
            OpCode::Illegal(opcode) => return Err(UmError::IllegalOpcode { opcode, word }),
        }
        Ok(Flow::Continue)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::ConditionalMove(o) => write!(f, "CMOV {}, {}, {}", o.a, o.b, o.c),
            OpCode::SegmentLoad(o) => write!(f, "SLOAD {}, {}, {}", o.a, o.b, o.c),
            OpCode::SegmentStore(o) => write!(f, "SSTORE {}, {}, {}", o.a, o.b, o.c),
            OpCode::Add(o) => write!(f, "ADD {}, {}, {}", o.a, o.b, o.c),
            OpCode::Multiply(o) => write!(f, "MUL {}, {}, {}", o.a, o.b, o.c),
            OpCode::Divide(o) => write!(f, "DIV {}, {}, {}", o.a, o.b, o.c),
            OpCode::Nand(o) => write!(f, "NAND {}, {}, {}", o.a, o.b, o.c),
            OpCode::Halt => write!(f, "HALT"),
            OpCode::MapSegment(o) => write!(f, "MAP {}, {}", o.b, o.c),
            OpCode::UnmapSegment(o) => write!(f, "UNMAP {}", o.c),
            OpCode::Output(o) => write!(f, "OUT {}", o.c),
            OpCode::Input(o) => write!(f, "IN {}", o.c),
            OpCode::LoadProgram(o) => write!(f, "LOADP {}, {}", o.b, o.c),
            OpCode::LoadImmediate { a, value } => write!(f, "LDI {a}, #{value} (x{value:07X})"),
            OpCode::Illegal(op) => write!(f, "ILLEGAL x{op:02X}"),
        }
    }
}

/// One line per word: `offset: raw word  disassembly`.
pub fn disassemble(words: &[u32]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(offset, &word)| format!("{offset:06}: {word:08X}  {}", OpCode::decode(word)))
        .collect()
}
