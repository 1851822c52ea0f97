use crate::emulator::io::IoPort;
use crate::emulator::registers::Reg;
use crate::emulator::{Emulator, UmError};

use super::Operands;

pub(super) fn conditional_move<P: IoPort>(emu: &mut Emulator<P>, Operands { a, b, c }: Operands) {
    if emu.registers[c] != 0 {
        emu.registers[a] = emu.registers[b];
    }
}

pub(super) fn add<P: IoPort>(emu: &mut Emulator<P>, Operands { a, b, c }: Operands) {
    emu.registers[a] = emu.registers[b].wrapping_add(emu.registers[c]);
}

pub(super) fn multiply<P: IoPort>(emu: &mut Emulator<P>, Operands { a, b, c }: Operands) {
    emu.registers[a] = emu.registers[b].wrapping_mul(emu.registers[c]);
}

pub(super) fn divide<P: IoPort>(
    emu: &mut Emulator<P>,
    Operands { a, b, c }: Operands,
) -> Result<(), UmError> {
    let quotient = emu.registers[b]
        .checked_div(emu.registers[c])
        .ok_or(UmError::DivisionByZero)?;
    emu.registers[a] = quotient;
    Ok(())
}

pub(super) fn nand<P: IoPort>(emu: &mut Emulator<P>, Operands { a, b, c }: Operands) {
    emu.registers[a] = !(emu.registers[b] & emu.registers[c]);
}

pub(super) fn load_immediate<P: IoPort>(emu: &mut Emulator<P>, a: Reg, value: u32) {
    emu.registers[a] = value;
}
