//! In-memory stream for exercising partial I/O in tests

use std::io::{self, Read, Write};

/// A duplex stream that moves at most `chunk` bytes per call
///
/// Reads are served from a fixed input buffer and hit EOF once it runs out.
/// Writes are appended to `written`. Optionally every other call fails with a
/// transient error first, alternating between `Interrupted` and `WouldBlock`.
#[derive(Debug)]
pub(crate) struct ChunkedStream {
    input: Vec<u8>,
    pos: usize,
    chunk: usize,
    interrupts: bool,
    interrupt_next: bool,
    fail: Option<io::ErrorKind>,
    pub(crate) interrupts_served: usize,
    pub(crate) written: Vec<u8>,
}

impl ChunkedStream {
    pub(crate) fn new(input: Vec<u8>, chunk: usize) -> Self {
        Self {
            input,
            pos: 0,
            chunk,
            interrupts: false,
            interrupt_next: false,
            fail: None,
            interrupts_served: 0,
            written: Vec::new(),
        }
    }

    pub(crate) fn with_interrupts(mut self) -> Self {
        self.interrupts = true;
        self.interrupt_next = true;
        self
    }

    pub(crate) fn failing_with(mut self, kind: io::ErrorKind) -> Self {
        self.fail = Some(kind);
        self
    }

    /// Bytes of input not yet consumed by reads
    pub(crate) fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn before_call(&mut self) -> io::Result<()> {
        if let Some(kind) = self.fail {
            return Err(kind.into());
        }

        if self.interrupts {
            if self.interrupt_next {
                self.interrupt_next = false;
                self.interrupts_served += 1;
                let kind = if self.interrupts_served % 2 == 0 {
                    io::ErrorKind::WouldBlock
                } else {
                    io::ErrorKind::Interrupted
                };
                return Err(kind.into());
            }
            self.interrupt_next = true;
        }

        Ok(())
    }
}

impl Read for ChunkedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.before_call()?;

        let n = self.chunk.min(buf.len()).min(self.remaining());
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for ChunkedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.before_call()?;

        let n = self.chunk.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
