//! Byte-oriented output transport.
//!
//! Every piece of text the harness produces ends up as a sequence of
//! [`OutputChannel::send`] calls. Implementations block until the transport
//! has accepted the byte; there is no buffering and no error path at this
//! layer. A stuck transport simply stalls the caller.

use heapless::Vec;

/// Blocking, one-byte-at-a-time transport.
pub trait OutputChannel {
    /// Transmit one byte, returning only once the transport accepted it.
    fn send(
        &mut self,
        byte: u8,
    );

    /// Transmit every byte of `bytes` in order.
    #[inline]
    fn send_all(
        &mut self,
        bytes: &[u8],
    ) {
        for &b in bytes {
            self.send(b);
        }
    }
}

impl<C: OutputChannel + ?Sized> OutputChannel for &mut C {
    #[inline]
    fn send(
        &mut self,
        byte: u8,
    ) {
        (**self).send(byte);
    }
}

/// Channel that hands every byte to a closure.
///
/// Lets a transport driver be wrapped without naming its type:
///
/// ```ignore
/// let mut uart = UartTx::new_blocking(p.UART0, p.PIN_0, config);
/// let channel = SendFn(move |b| {
///     let _ = uart.blocking_write(&[b]);
/// });
/// ```
pub struct SendFn<F>(pub F);

impl<F: FnMut(u8)> OutputChannel for SendFn<F> {
    #[inline]
    fn send(
        &mut self,
        byte: u8,
    ) {
        (self.0)(byte);
    }
}

/// Capture channel backed by a fixed-capacity buffer.
///
/// Bytes past capacity are dropped: the channel contract has no way to
/// report a failed send, so overflow is silent.
pub struct BufferChannel<const N: usize> {
    buf: Vec<u8, N>,
}

impl<const N: usize> BufferChannel<N> {
    /// Create an empty capture channel.
    pub const fn new() -> Self { Self { buf: Vec::new() } }

    /// Captured bytes, oldest first.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] { self.buf.as_slice() }

    /// Captured bytes as text, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> { core::str::from_utf8(self.buf.as_slice()).ok() }

    /// Number of captured bytes.
    #[inline]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Check if nothing was captured.
    #[inline]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Forget everything captured so far.
    pub fn clear(&mut self) { self.buf.clear(); }
}

impl<const N: usize> Default for BufferChannel<N> {
    fn default() -> Self { Self::new() }
}

impl<const N: usize> OutputChannel for BufferChannel<N> {
    #[inline]
    fn send(
        &mut self,
        byte: u8,
    ) {
        // Full buffer: drop the byte
        let _ = self.buf.push(byte);
    }
}
