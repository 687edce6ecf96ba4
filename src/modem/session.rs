//! The reusable command/response exchange.
//!
//! A [`CommandSession`] owns exactly one in-flight exchange: it writes the command,
//! arms a deadline and, on every later [`poll`](CommandSession::poll), drains the
//! serial port and classifies the buffer. When the exchange resolves it hands back
//! the continuation it was armed with together with the [`Outcome`]. Deciding what to
//! do next is left to the caller.

use super::buffer::{ResponseBuffer, find_slice};
use super::keyword::KeywordSet;
use crate::network::error::Error;
use crate::network::{Read, Transport, write_all};
use serde::Deserialize;

/// Bytes pulled from the transport per read call while draining.
const READ_CHUNK: usize = 32;

/// Classification of a finished exchange.
///
/// Precedence when several apply in the same tick is
/// `Success > Failure > Overflow > Timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// A success keyword matched.
    Success,
    /// A failure keyword matched.
    Failure,
    /// The buffer filled up before any keyword matched.
    Overflow,
    /// The deadline passed or the clock wrapped.
    Timeout,
}

impl Outcome {
    /// `true` for outcomes the workflow treats as forward progress.
    ///
    /// A full buffer counts as progress so a chatty modem cannot stall the pipeline.
    pub fn is_progress(self) -> bool {
        matches!(self, Outcome::Success | Outcome::Overflow)
    }

    /// The error this outcome stands for, `None` for [`Outcome::Success`].
    pub fn error(self) -> Option<Error> {
        match self {
            Outcome::Success => None,
            Outcome::Failure => Some(Error::Failure),
            Outcome::Overflow => Some(Error::BufferOverflow),
            Outcome::Timeout => Some(Error::Timeout),
        }
    }
}

/// Keywords and deadline of one kind of exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Exchange {
    /// Markers that resolve the exchange as [`Outcome::Success`].
    pub success: KeywordSet,
    /// Markers that resolve the exchange as [`Outcome::Failure`].
    pub failure: KeywordSet,
    /// Time allowed before [`Outcome::Timeout`], in milliseconds.
    pub timeout_ms: u32,
}

impl Exchange {
    pub(crate) fn preset(success: &[&str], failure: &[&str], timeout_ms: u32) -> Self {
        Self {
            success: KeywordSet::preset(success),
            failure: KeywordSet::preset(failure),
            timeout_ms,
        }
    }
}

/// One in-flight command/response exchange.
///
/// `K` is the continuation token handed back on resolution, `N` the receive buffer
/// capacity.
#[derive(Debug)]
pub struct CommandSession<K, const N: usize> {
    buffer: ResponseBuffer<N>,
    exchange: Exchange,
    armed_at: u32,
    pending: Option<K>,
    write_failed: bool,
}

impl<K, const N: usize> Default for CommandSession<K, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, const N: usize> CommandSession<K, N> {
    /// Creates an idle session.
    pub const fn new() -> Self {
        Self {
            buffer: ResponseBuffer::new(),
            exchange: Exchange {
                success: KeywordSet::empty(),
                failure: KeywordSet::empty(),
                timeout_ms: 0,
            },
            armed_at: 0,
            pending: None,
            write_failed: false,
        }
    }

    /// Writes `command`, clears the buffer and arms the deadline.
    ///
    /// An empty `command` arms without writing anything, for exchanges that only
    /// wait for unsolicited data. A transport error does not surface here; the next
    /// [`poll`](Self::poll) resolves the exchange as [`Outcome::Failure`] instead.
    pub fn arm<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        command: &[u8],
        exchange: &Exchange,
        now: u32,
        continuation: K,
    ) {
        let written = command.is_empty() || write_all(transport, command).is_ok();
        if !written {
            warn!("serial write failed");
        }
        self.prepare(exchange, now, continuation);
        self.write_failed = !written;
    }

    /// Arms an exchange whose command could not be delivered.
    ///
    /// The next [`poll`](Self::poll) resolves it as [`Outcome::Failure`].
    pub fn arm_failed(&mut self, exchange: &Exchange, now: u32, continuation: K) {
        self.prepare(exchange, now, continuation);
        self.write_failed = true;
    }

    /// Arms an exchange that only waits, keeping what arrived after the previous one.
    ///
    /// Bytes that followed the previous exchange's success keyword in the same burst
    /// belong to this exchange and are kept at the front of the buffer; everything up
    /// to and including the keyword is dropped. Without a matched keyword the buffer
    /// starts empty.
    pub fn arm_continue(&mut self, exchange: &Exchange, now: u32, continuation: K) {
        let received = self.buffer.as_bytes();
        let consumed = self
            .exchange
            .success
            .iter()
            .filter_map(|word| {
                find_slice(received, word.as_bytes()).map(|start| start + word.len())
            })
            .min()
            .unwrap_or(received.len());
        self.buffer.discard_front(consumed);

        self.exchange.clone_from(exchange);
        self.armed_at = now;
        self.pending = Some(continuation);
        self.write_failed = false;
    }

    fn prepare(&mut self, exchange: &Exchange, now: u32, continuation: K) {
        self.buffer.clear();
        self.exchange.clone_from(exchange);
        self.armed_at = now;
        self.pending = Some(continuation);
    }

    /// Drains the transport and classifies the buffer.
    ///
    /// Returns the continuation and outcome exactly once per armed exchange; every
    /// other call returns `None`.
    pub fn poll<T: Transport + ?Sized>(&mut self, transport: &mut T, now: u32) -> Option<(K, Outcome)> {
        self.pending.as_ref()?;

        if !self.write_failed {
            self.drain(transport);
        }

        let outcome = self.classify(now)?;
        self.pending.take().map(|continuation| (continuation, outcome))
    }

    fn classify(&self, now: u32) -> Option<Outcome> {
        if self.write_failed {
            return Some(Outcome::Failure);
        }

        let received = self.buffer.as_bytes();
        if self.exchange.success.matches(received) {
            Some(Outcome::Success)
        } else if self.exchange.failure.matches(received) {
            Some(Outcome::Failure)
        } else if self.buffer.is_full() {
            Some(Outcome::Overflow)
        } else if now < self.armed_at || now - self.armed_at >= self.exchange.timeout_ms {
            Some(Outcome::Timeout)
        } else {
            None
        }
    }

    /// Moves every pending byte into the buffer; bytes beyond capacity are discarded.
    fn drain<T: Read + ?Sized>(&mut self, transport: &mut T) {
        let mut chunk = [0u8; READ_CHUNK];
        let mut discarded = 0usize;
        loop {
            let n = match transport.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n.min(chunk.len()),
                Err(_) => {
                    warn!("serial read failed");
                    break;
                }
            };
            let accepted = self.buffer.extend(&chunk[..n]);
            discarded += n - accepted;
        }
        if discarded > 0 {
            warn!("response buffer overflow, {} bytes dropped", discarded);
        }
        trace!("rx cursor {}/{}", self.buffer.cursor(), N);
    }

    /// `true` while an exchange is armed and unresolved.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending continuation without resolving it.
    pub fn abandon(&mut self) {
        self.pending = None;
        self.write_failed = false;
        self.buffer.clear();
    }

    /// The bytes received for the current (or last) exchange.
    pub fn buffer(&self) -> &ResponseBuffer<N> {
        &self.buffer
    }

    /// The received bytes as text.
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Keywords and deadline of the current (or last) exchange.
    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Clock value recorded when the exchange was armed.
    pub fn armed_at(&self) -> u32 {
        self.armed_at
    }
}

/// Retry counter shared by the workflows.
///
/// Carries no knowledge of what is being retried; callers reset it when an operation
/// succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attempts {
    count: u8,
}

impl Attempts {
    /// Creates a counter at zero.
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Counts one attempt.
    ///
    /// Returns `true` while the count stays below `max`. Reaching `max` returns
    /// `false` and resets the counter.
    pub fn attempt(&mut self, max: u8) -> bool {
        self.count = self.count.saturating_add(1);
        if self.count < max {
            true
        } else {
            self.count = 0;
            false
        }
    }

    /// Current count.
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Back to zero.
    pub fn reset(&mut self) {
        self.count = 0;
    }
}
