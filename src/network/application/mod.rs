//! # Application Layer Protocols
//!
//! Protocols spoken through the modem's single TCP socket. The modem itself only moves
//! opaque bytes; everything above the AT dialect lives here.
//!
//! ## Available Protocols
//!
//! - **[`http`]**: HTTP/1.1 request encoding and response framing for the
//!   request pipeline of [`Modem`](crate::modem::Modem)
//!
//! ## Design Principles
//!
//! - **Transport Agnostic**: Encoders write through `core::fmt::Write`, so the same code
//!   measures a payload and streams it to the serial port
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Fixed-size buffers; parsed responses borrow from the
//!   modem's receive buffer instead of copying

/// HTTP client implementation.
///
/// Provides request encoding with exact length measurement and parsing of the
/// responses the modem wraps in its inbound-data envelope.
pub mod http;
