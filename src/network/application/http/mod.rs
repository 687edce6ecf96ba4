//! HTTP/1.1 over an AT modem socket.
//!
//! This module provides the two halves of an HTTP exchange as the modem driver sees
//! them. It focuses on simplicity, predictable memory usage and compatibility with
//! resource-constrained devices.
//!
//! # Features
//!
//! - Owned, fixed-capacity [`Request`] values that can sit in the request queue
//! - Payload encoding through `core::fmt::Write`, with [`Request::encoded_len`]
//!   measuring the exact byte count the modem must be told in advance
//! - [`response::parse`] strips the modem's `+IPD,<len>:` envelope and the trailing
//!   status marker, then extracts the status code and body
//!
//! # Usage
//!
//! ```rust
//! use libat::network::application::http::{Method, Request};
//!
//! let request = Request::new("api.example.com", 80, Method::Post, "/telemetry")
//!     .unwrap()
//!     .with_body("{\"t\":21}")
//!     .unwrap();
//!
//! let mut payload: heapless::String<512> = heapless::String::new();
//! request.write_payload(&mut payload, "libat").unwrap();
//! assert_eq!(payload.len(), request.encoded_len("libat"));
//! ```

/// HTTP request types and payload encoding.
pub mod request;

/// Framing and parsing of inbound HTTP responses.
pub mod response;

pub use request::{Method, Request};
pub use response::Response;
