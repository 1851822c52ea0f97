#![allow(clippy::reversed_empty_ranges)] // We want to use ranges for bits like the diagrams (big:small)

mod error;
pub mod io;
pub mod loader;
pub mod ops;
mod registers;
mod segments;

pub use error::UmError;
pub use io::{BufferPort, IoPort, StdPort};
pub use ops::{disassemble, OpCode, Operands};
pub use registers::{Reg, Registers, REGISTER_COUNT};
pub use segments::SegmentTable;

use ops::Flow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Halted,
    Faulted(UmError),
}

/// The execution engine: registers, segmented memory, program counter and
/// the I/O port the character instructions talk to.
pub struct Emulator<P: IoPort> {
    registers: Registers,
    segments: SegmentTable,
    // word offset into segment 0 of the next instruction
    pc: u32,
    state: MachineState,
    steps: u64,
    port: P,
}

impl<P: IoPort> Emulator<P> {
    /// Creates a running machine with `program` as segment 0, the program
    /// counter at 0 and every register cleared.
    pub fn new(program: Vec<u32>, port: P) -> Self {
        let span = tracing::info_span!("load_program", program_size = program.len());
        let _guard = span.enter();

        tracing::info!("Loading program of {} words", program.len());

        Self {
            registers: Registers::new(),
            segments: SegmentTable::new(program),
            pc: 0,
            state: MachineState::Running,
            steps: 0,
            port,
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn segments(&self) -> &SegmentTable {
        &self.segments
    }

    /// Instructions executed so far, counting the one that halted or faulted.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }
}

// emulator logic core
impl<P: IoPort> Emulator<P> {
    /// Executes one instruction.
    ///
    /// A halted machine stays halted and a faulted machine reports its fault
    /// again; neither executes anything.
    pub fn step(&mut self) -> Result<MachineState, UmError> {
        match &self.state {
            MachineState::Running => {}
            MachineState::Halted => return Ok(MachineState::Halted),
            MachineState::Faulted(err) => return Err(err.clone()),
        }

        match self.execute_next() {
            Ok(Flow::Continue) => Ok(MachineState::Running),
            Ok(Flow::Halt) => {
                tracing::info!(steps = self.steps, "Program halted");
                if let Err(err) = self.port.flush() {
                    return Err(self.fault(err.into()));
                }
                self.state = MachineState::Halted;
                Ok(MachineState::Halted)
            }
            Err(err) => Err(self.fault(err)),
        }
    }

    fn execute_next(&mut self) -> Result<Flow, UmError> {
        let pc = self.pc;
        let word = self.segments.read(0, pc)?;
        self.pc = pc.wrapping_add(1);
        self.steps += 1;

        let op = OpCode::decode(word);
        let span = tracing::trace_span!("step", pc, word);
        let _guard = span.enter();
        tracing::trace!("Executing {op}");

        op.execute(self, word)
    }

    fn fault(&mut self, err: UmError) -> UmError {
        tracing::error!(pc = self.pc, steps = self.steps, "Machine faulted: {err}");
        if let Err(flush_err) = self.port.flush() {
            tracing::warn!("Failed to flush output after fault: {flush_err}");
        }
        self.state = MachineState::Faulted(err.clone());
        err
    }

    /// Steps until the machine halts, faults, or `max_steps` instructions
    /// have run in this call. Stopping at the limit leaves it `Running`.
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<MachineState, UmError> {
        let span = tracing::info_span!("run", max_steps = ?max_steps);
        let _guard = span.enter();

        tracing::info!("Starting execution with max_steps={:?}", max_steps);
        let mut executed = 0;

        loop {
            if let Some(max) = max_steps {
                if executed >= max {
                    tracing::info!("Reached maximum steps ({}), stopping execution", max);
                    return Ok(self.state.clone());
                }
            }

            match self.step()? {
                MachineState::Running => executed += 1,
                state => return Ok(state),
            }
        }
    }
}
