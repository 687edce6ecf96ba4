//! # AT Modem Driver
//!
//! Drives an ESP8266-class WiFi modem through its AT command set without ever blocking
//! the caller's control loop.
//!
//! ## Structure
//!
//! - [`CommandSession`] issues one command, accumulates the reply in a
//!   [`ResponseBuffer`] and classifies it against the [`Exchange`] keywords.
//! - [`Modem`] chains those exchanges into modem bring-up, access point handling and
//!   the per-request socket lifecycle, serving a bounded [`RequestQueue`].
//! - [`Watchdog`] re-reads the station IP after a period of idleness.
//! - [`Config`] holds every keyword, deadline and retry limit.
//!
//! ## Request lifecycle
//!
//! ```text
//! open socket -> announce length -> send payload -> read message -> close socket
//! ```
//!
//! A failing socket open is retried; once the retries are spent the request is
//! dropped. Every later failure still closes the socket before the request leaves the
//! queue. Outcomes reach the application through [`Handler`].

use crate::network::error::Error;

pub mod buffer;
pub mod command;
pub mod config;
pub mod keyword;
pub mod queue;
pub mod session;
pub mod watchdog;

mod driver;

pub use buffer::ResponseBuffer;
pub use command::Command;
pub use config::Config;
pub use driver::{MAX_PASSWORD_LEN, MAX_SSID_LEN, Modem, RawResponse};
pub use keyword::KeywordSet;
pub use queue::RequestQueue;
pub use session::{Attempts, CommandSession, Exchange, Outcome};
pub use watchdog::Watchdog;

/// Default receive buffer capacity in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 512;

/// Board services the driver needs besides the serial port.
///
/// Must be implemented by the target platform.
pub trait Platform {
    /// Milliseconds since an arbitrary origin. Expected to wrap at `u32::MAX`.
    fn now_ms(&mut self) -> u32;

    /// Pulses the modem's reset line.
    ///
    /// May block for the duration of the pulse and the modem's boot delay; it is only
    /// called from [`Modem::begin`].
    fn hard_reset(&mut self);
}

/// Application callbacks.
///
/// Every method defaults to doing nothing, so implementors only override the events
/// they care about. `()` is the handler used when nothing is registered.
pub trait Handler {
    /// The modem obtained a station IP for the first time since it was last offline.
    fn wifi_connected(&mut self, ip: &str) {
        let _ = ip;
    }

    /// Connectivity that was previously reported is gone.
    fn wifi_disconnected(&mut self) {}

    /// A response arrived for the request at the front of the queue.
    fn data_received(&mut self, status_code: u16, body: &str) {
        let _ = (status_code, body);
    }

    /// The request at the front of the queue produced no response.
    fn request_failed(&mut self, error: Error) {
        let _ = error;
    }
}

impl Handler for () {}

/// Coarse driver state.
///
/// Every in-flight exchange reports [`State::ReceivingData`]; the other states are
/// where the workflow rests between exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Brought up, no access point connection.
    Idle,
    /// Bring-up in progress.
    Resetting,
    /// Joined an access point and ready to serve requests.
    Connected,
    /// Opening the server socket.
    ConnectingServer,
    /// Transmitting a request.
    SendingData,
    /// Waiting for the modem to answer.
    ReceivingData,
    /// A server message was received and is being delivered.
    DataReceived,
    /// Bring-up failed or the credentials were rejected. Only [`Modem::begin`] leaves
    /// this state.
    Error,
}
