use crate::emulator::io::IoPort;
use crate::emulator::{Emulator, UmError};

use super::Operands;

pub(super) fn segment_load<P: IoPort>(
    emu: &mut Emulator<P>,
    Operands { a, b, c }: Operands,
) -> Result<(), UmError> {
    emu.registers[a] = emu.segments.read(emu.registers[b], emu.registers[c])?;
    Ok(())
}

pub(super) fn segment_store<P: IoPort>(
    emu: &mut Emulator<P>,
    Operands { a, b, c }: Operands,
) -> Result<(), UmError> {
    emu.segments
        .write(emu.registers[a], emu.registers[b], emu.registers[c])
}

pub(super) fn map_segment<P: IoPort>(emu: &mut Emulator<P>, Operands { b, c, .. }: Operands) {
    emu.registers[b] = emu.segments.allocate(emu.registers[c]);
}

pub(super) fn unmap_segment<P: IoPort>(
    emu: &mut Emulator<P>,
    Operands { c, .. }: Operands,
) -> Result<(), UmError> {
    emu.segments.free(emu.registers[c])
}

/// Replaces the program with a copy of segment `r[b]` and jumps to `r[c]`.
/// With `r[b] == 0` this is a plain jump.
pub(super) fn load_program<P: IoPort>(
    emu: &mut Emulator<P>,
    Operands { b, c, .. }: Operands,
) -> Result<(), UmError> {
    emu.segments.replace_segment_zero(emu.registers[b])?;
    emu.pc = emu.registers[c];
    Ok(())
}
