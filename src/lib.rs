//! # libat - non-blocking AT modem HTTP client
//!
//! A Rust driver that turns a byte-oriented AT-command WiFi modem (ESP8266-class radios
//! reachable only through a serial port) into an asynchronous HTTP client. The library is
//! designed for embedded systems and supports `no_std` environments without an allocator.
//!
//! ## Features
//!
//! ### Command/Response State Machine
//! - **Non-blocking**: every AT exchange is "send a command, then classify whatever
//!   bytes arrive" on later ticks of [`Modem::update`](modem::Modem::update)
//! - **Keyword classification**: success and failure markers, timeouts with clock
//!   rollover protection and explicit buffer overflow reporting
//! - **Retry policy**: bounded attempts for modem reset and socket opening
//!
//! ### HTTP Pipeline
//! - Bounded FIFO request queue
//! - Exact payload length announcement
//! - Framing of the modem's inbound-data envelope and HTTP status/body parsing
//!
//! ### Connectivity
//! - Modem bring-up, access point auto-connect and disconnect
//! - IP watchdog that re-verifies connectivity when idle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use libat::modem::{Config, Handler, Modem, Platform};
//! use libat::network::application::http::Method;
//! # use libat::network::Transport;
//! # struct Uart;
//! # impl libat::network::Read for Uart {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libat::network::Write for Uart {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Transport for Uart {}
//! # struct Board;
//! # impl Platform for Board {
//! #     fn now_ms(&mut self) -> u32 { 0 }
//! #     fn hard_reset(&mut self) {}
//! # }
//!
//! struct Printer;
//!
//! impl Handler for Printer {
//!     fn data_received(&mut self, status_code: u16, body: &str) {
//!         // hand the response to the application
//!         let _ = (status_code, body);
//!     }
//! }
//!
//! let mut modem: Modem<_, _, _> = Modem::new(Uart, Board, Printer, Config::default());
//! modem.begin();
//! modem.connect("my-ssid", "my-password").unwrap();
//!
//! loop {
//!     modem.update();
//!     if modem.is_connected() && modem.pending_requests() == 0 {
//!         let _ = modem.submit_http_request("192.168.1.10", 80, Method::Get, "/status", None, None);
//!     }
//! #   break;
//! }
//! ```
//!
//! ## Platform Support
//!
//! The crate only needs a serial port implementing [`network::Read`] and
//! [`network::Write`] and a millisecond clock plus reset line exposed through
//! [`modem::Platform`]. It runs on microcontrollers as well as on hosts driving a
//! USB-serial adapter.
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Route internal logging to `defmt`
//! - `log`: Route internal logging to the `log` facade

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("the `defmt` and `log` features are mutually exclusive");

// Must come first so the logging macros are visible to the modules below.
#[macro_use]
mod fmt;

/// Serial transport abstraction, shared error type and the HTTP layer.
///
/// Contains the byte-level traits the modem driver talks through and the HTTP request
/// encoding and response framing used by the request pipeline.
pub mod network;

/// The AT modem driver.
///
/// Holds the command/response state machine, the connection workflow, the request
/// queue, the IP watchdog and the driver configuration.
pub mod modem;
