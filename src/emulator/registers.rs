use std::fmt;
use std::ops::{Index, IndexMut};

use super::UmError;

pub const REGISTER_COUNT: usize = 8;

/// A register operand taken from an instruction word.
///
/// Decoded fields are 3 bits wide, so a `Reg` built by the decoder always
/// names one of the eight registers and indexing with it cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(u8);

impl Reg {
    /// Checked constructor for indices that did not come out of a 3-bit field.
    pub fn new(index: usize) -> Result<Self, UmError> {
        if index < REGISTER_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(UmError::InvalidRegister(index))
        }
    }

    /// Keeps only the low 3 bits of `bits`.
    pub(crate) fn from_field(bits: u32) -> Self {
        Self((bits & 0b111) as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The eight general purpose 32-bit registers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    regs: [u32; REGISTER_COUNT],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns [`UmError::InvalidRegister`] if `idx` is out of bounds.
    pub fn get(&self, idx: usize) -> Result<u32, UmError> {
        self.regs
            .get(idx)
            .copied()
            .ok_or(UmError::InvalidRegister(idx))
    }

    /// Returns [`UmError::InvalidRegister`] if `idx` is out of bounds.
    pub fn set(&mut self, idx: usize, value: u32) -> Result<(), UmError> {
        let slot = self
            .regs
            .get_mut(idx)
            .ok_or(UmError::InvalidRegister(idx))?;
        *slot = value;
        Ok(())
    }

    pub fn as_array(&self) -> &[u32; REGISTER_COUNT] {
        &self.regs
    }
}

impl Index<Reg> for Registers {
    type Output = u32;

    fn index(&self, reg: Reg) -> &u32 {
        &self.regs[reg.index()]
    }
}

impl IndexMut<Reg> for Registers {
    fn index_mut(&mut self, reg: Reg) -> &mut u32 {
        &mut self.regs[reg.index()]
    }
}
