//! Common error types for driver operations

/// A common error type for modem and HTTP operations.
///
/// This enum covers the outcomes of a failed AT exchange as well as the errors the
/// caller API reports. It is designed to be simple and portable for `no_std`
/// environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The exchange deadline passed (or the clock wrapped) before classification.
    Timeout,
    /// An explicit failure keyword matched.
    Failure,
    /// The response buffer filled before any keyword matched.
    BufferOverflow,
    /// A request was submitted while the queue was at capacity.
    QueueFull,
    /// The HTTP status code was outside `100..=999`.
    ParseAnomaly,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// The modem refused to open a socket to the server.
    ConnectionRefused,
    /// An invalid server address, port or request target was provided.
    InvalidAddress,
    /// The inbound message held no HTTP response.
    ProtocolError,
    /// The operation needs an access point connection with an IP address.
    NotConnected,
    /// Another exchange is in flight.
    Busy,
    /// A value does not fit into its fixed-capacity storage.
    CapacityExceeded,
    /// The configuration could not be parsed.
    InvalidConfig,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::Timeout => "modem did not answer in time",
            Error::Failure => "modem reported failure",
            Error::BufferOverflow => "response buffer overflow",
            Error::QueueFull => "request queue is full",
            Error::ParseAnomaly => "HTTP status code out of range",
            Error::WriteError => "serial write failed",
            Error::ReadError => "serial read failed",
            Error::ConnectionRefused => "server connection refused",
            Error::InvalidAddress => "invalid server address or request target",
            Error::ProtocolError => "no HTTP response in message",
            Error::NotConnected => "not connected to an access point",
            Error::Busy => "modem is busy",
            Error::CapacityExceeded => "value exceeds buffer capacity",
            Error::InvalidConfig => "invalid configuration",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::Failure => defmt::write!(f, "Failure"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            Error::QueueFull => defmt::write!(f, "QueueFull"),
            Error::ParseAnomaly => defmt::write!(f, "ParseAnomaly"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::Busy => defmt::write!(f, "Busy"),
            Error::CapacityExceeded => defmt::write!(f, "CapacityExceeded"),
            Error::InvalidConfig => defmt::write!(f, "InvalidConfig"),
        }
    }
}
