use std::collections::VecDeque;
use std::io::{self, BufWriter, Read, Stdin, Stdout, Write};

/// Byte oriented character I/O used by the input and output instructions.
pub trait IoPort {
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Blocks until a byte is available. `None` means end of stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    fn flush(&mut self) -> io::Result<()>;
}

/// The process's standard streams.
///
/// Output is buffered and flushed before every blocking read, so a prompt
/// written by the program is visible before it waits for input.
pub struct StdPort {
    stdin: Stdin,
    stdout: BufWriter<Stdout>,
    flush_each_output: bool,
}

impl StdPort {
    pub fn new(flush_each_output: bool) -> Self {
        Self {
            stdin: io::stdin(),
            stdout: BufWriter::new(io::stdout()),
            flush_each_output,
        }
    }
}

impl IoPort for StdPort {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.stdout.write_all(&[byte])?;
        if self.flush_each_output {
            self.stdout.flush()?;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.stdout.flush()?;
        read_one(&mut self.stdin.lock())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

fn read_one(reader: &mut impl Read) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// In-memory port: a queue of pending input and everything written so far.
#[derive(Debug, Clone, Default)]
pub struct BufferPort {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl BufferPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into().into(),
            output: Vec::new(),
        }
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

impl IoPort for BufferPort {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
