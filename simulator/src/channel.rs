//! Output channel over any `std::io::Write` sink.
//!
//! The channel contract has no error path, so the first write error is
//! kept and every later byte is dropped. The run loop checks
//! [`WriteChannel::take_error`] after each round and stops.

use std::io::{self, Write};

use bench_common::OutputChannel;

pub struct WriteChannel<W: Write> {
    sink: W,
    error: Option<io::Error>,
}

impl<W: Write> WriteChannel<W> {
    pub fn new(sink: W) -> Self { Self { sink, error: None } }

    /// First write error seen since the last call, if any.
    pub fn take_error(&mut self) -> Option<io::Error> { self.error.take() }

    /// Check if a write has failed.
    pub fn failed(&self) -> bool { self.error.is_some() }

    pub fn flush(&mut self) -> io::Result<()> { self.sink.flush() }

    fn record(
        &mut self,
        result: io::Result<()>,
    ) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }
}

impl<W: Write> OutputChannel for WriteChannel<W> {
    fn send(
        &mut self,
        byte: u8,
    ) {
        if self.failed() {
            return;
        }
        let result = self.sink.write_all(&[byte]);
        self.record(result);
        // Progress markers carry no newline to trigger a flush
        if byte == b'.' && !self.failed() {
            let result = self.sink.flush();
            self.record(result);
        }
    }
}
