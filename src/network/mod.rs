//! Serial transport abstraction for AT modems
//!
//! The modem is reached through a plain byte channel with no framing of its own. These
//! traits describe the two halves of that channel: a non-blocking read that returns
//! `Ok(0)` when nothing is pending, and a write that hands bytes to the UART.
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error type for driver operations
pub mod error;

/// Application layer protocols carried over the modem's socket
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Read, Transport, Write};
}

pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read whatever bytes are available without blocking.
    ///
    /// Returns `Ok(0)` when the receive FIFO is empty.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the channel
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A duplex serial channel to the modem
pub trait Transport: Read + Write {}

/// Write the whole buffer, retrying short writes.
///
/// A write that accepts zero bytes is reported as [`error::Error::WriteError`] so a
/// stalled UART cannot spin the control loop.
pub fn write_all<W: Write + ?Sized>(writer: &mut W, mut buf: &[u8]) -> Result<(), error::Error> {
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => return Err(error::Error::WriteError),
            Ok(n) => buf = &buf[n.min(buf.len())..],
            Err(_) => return Err(error::Error::WriteError),
        }
    }
    writer.flush().map_err(|_| error::Error::WriteError)
}

/// Adapter that lets `core::fmt` machinery stream text straight into a [`Write`].
///
/// Used to send the HTTP payload without staging it in a second buffer.
pub struct FmtWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    written: usize,
}

impl<'a, W: Write + ?Sized> FmtWriter<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        Self { inner, written: 0 }
    }

    /// Number of bytes accepted so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl<W: Write + ?Sized> core::fmt::Write for FmtWriter<'_, W> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let mut buf = s.as_bytes();
        while !buf.is_empty() {
            match self.inner.write(buf) {
                Ok(0) | Err(_) => return Err(core::fmt::Error),
                Ok(n) => {
                    let n = n.min(buf.len());
                    self.written += n;
                    buf = &buf[n..];
                }
            }
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> core::fmt::Debug for FmtWriter<'_, W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FmtWriter")
            .field("written", &self.written)
            .finish()
    }
}
