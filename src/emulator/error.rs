use thiserror::Error;

/// Every way the machine can stop abnormally.
///
/// All of these are fatal: the engine moves to
/// [`MachineState::Faulted`](super::MachineState::Faulted) and never
/// resumes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UmError {
    /// The program image is not a whole number of 32-bit words.
    #[error("invalid program: {len} bytes is not a multiple of 4")]
    InvalidProgram { len: usize },
    /// The program file could not be opened or read.
    #[error("cannot read program {path}: {message}")]
    FileRead { path: String, message: String },
    /// Opcodes 14 and 15 are unassigned.
    #[error("illegal opcode {opcode} in word x{word:08X}")]
    IllegalOpcode { opcode: u8, word: u32 },
    /// Access to an unmapped segment or past the end of a mapped one.
    #[error("segment fault: segment {segment}, offset {offset}")]
    SegmentFault { segment: u32, offset: u32 },
    /// Unmap of segment 0, of a free slot, or of an id never handed out.
    #[error("invalid segment {0} for unmap")]
    InvalidSegment(u32),
    #[error("division by zero")]
    DivisionByZero,
    /// Output of a value that does not fit in a byte.
    #[error("output value {0} out of byte range")]
    OutOfRange(u32),
    /// Register index outside 0..=7.
    #[error("register index {0} out of bounds")]
    InvalidRegister(usize),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for UmError {
    fn from(err: std::io::Error) -> Self {
        UmError::Io(err.to_string())
    }
}
