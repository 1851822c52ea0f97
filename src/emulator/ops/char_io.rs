use crate::emulator::io::IoPort;
use crate::emulator::{Emulator, UmError};

use super::Operands;

/// Value placed in the destination register when input is exhausted.
pub const END_OF_INPUT: u32 = u32::MAX;

pub(super) fn output<P: IoPort>(
    emu: &mut Emulator<P>,
    Operands { c, .. }: Operands,
) -> Result<(), UmError> {
    let value = emu.registers[c];
    let byte = u8::try_from(value).map_err(|_| UmError::OutOfRange(value))?;
    emu.port.write_byte(byte)?;
    Ok(())
}

pub(super) fn input<P: IoPort>(
    emu: &mut Emulator<P>,
    Operands { c, .. }: Operands,
) -> Result<(), UmError> {
    emu.registers[c] = match emu.port.read_byte()? {
        Some(byte) => u32::from(byte),
        None => {
            tracing::debug!("Input exhausted");
            END_OF_INPUT
        }
    };
    Ok(())
}
