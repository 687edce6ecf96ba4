//! Receive buffer for one AT exchange.

use heapless::Vec;

/// Fixed-capacity accumulator of the bytes received since the last command.
///
/// The cursor is the current length and can never exceed `N`. NUL bytes are dropped
/// on the way in so the contents stay usable as text. A full buffer is reported
/// through [`is_full`](Self::is_full) instead of silently discarding data.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuffer<const N: usize> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> ResponseBuffer<N> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Appends as many bytes as fit and returns how many of `data` were consumed.
    ///
    /// Consumption stops at the first byte that does not fit.
    pub fn extend(&mut self, data: &[u8]) -> usize {
        for (consumed, &byte) in data.iter().enumerate() {
            if byte == 0 {
                continue;
            }
            if self.bytes.push(byte).is_err() {
                return consumed;
            }
        }
        data.len()
    }

    /// Discards the contents and rewinds the cursor.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Drops the first `n` bytes and moves the rest to the front.
    pub fn discard_front(&mut self, n: usize) {
        let n = n.min(self.bytes.len());
        let kept = self.bytes.len() - n;
        self.bytes.copy_within(n.., 0);
        self.bytes.truncate(kept);
    }

    /// Position of the next free slot.
    pub fn cursor(&self) -> usize {
        self.bytes.len()
    }

    /// Total capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// `true` when nothing was received yet.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `true` once the cursor reached the capacity.
    pub fn is_full(&self) -> bool {
        self.bytes.is_full()
    }

    /// The raw contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The contents as text, cut at the first invalid UTF-8 sequence.
    pub fn as_str(&self) -> &str {
        match core::str::from_utf8(&self.bytes) {
            Ok(text) => text,
            // valid_up_to marks a char boundary, so the prefix is valid UTF-8
            Err(e) => core::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    /// Substring search over the raw bytes.
    pub fn contains(&self, needle: &[u8]) -> bool {
        find_slice(&self.bytes, needle).is_some()
    }
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
pub(crate) fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
