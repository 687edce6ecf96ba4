//! AT command lines issued by the workflows.

use crate::network::error::Error;
use core::fmt::Write;
use heapless::String;

/// Longest rendered command line, terminator included.
pub const MAX_COMMAND_LEN: usize = 160;

/// A rendered command line.
pub type CommandLine = String<MAX_COMMAND_LEN>;

/// Every command the driver writes to the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `AT+RST`
    Reset,
    /// `ATE0`
    EchoOff,
    /// `AT+CWMODE=1`
    StationMode,
    /// `AT+CIPMUX=0`
    SingleConnection,
    /// `AT+CWJAP="ssid","password"`
    JoinAccessPoint {
        /// Network name.
        ssid: &'a str,
        /// Passphrase.
        password: &'a str,
    },
    /// `AT+CWQAP`
    QuitAccessPoint,
    /// `AT+CIFSR`
    FetchIp,
    /// `AT+CIPSTART="TCP","host",port`
    OpenSocket {
        /// Server address.
        host: &'a str,
        /// Server port.
        port: u16,
    },
    /// `AT+CIPSEND=<n>`
    AnnounceLength(usize),
    /// `AT+CIPCLOSE`
    CloseSocket,
    /// Caller-supplied text, sent as is.
    Raw(&'a str),
}

impl Command<'_> {
    /// Renders the command followed by `\r\n`.
    pub fn render(&self) -> Result<CommandLine, Error> {
        let mut line = CommandLine::new();
        self.write_to(&mut line).map_err(|_| Error::CapacityExceeded)?;
        line.push_str("\r\n").map_err(|_| Error::CapacityExceeded)?;
        Ok(line)
    }

    fn write_to(&self, line: &mut CommandLine) -> core::fmt::Result {
        match *self {
            Command::Reset => line.write_str("AT+RST"),
            Command::EchoOff => line.write_str("ATE0"),
            Command::StationMode => line.write_str("AT+CWMODE=1"),
            Command::SingleConnection => line.write_str("AT+CIPMUX=0"),
            Command::JoinAccessPoint { ssid, password } => {
                write!(line, "AT+CWJAP=\"{}\",\"{}\"", ssid, password)
            }
            Command::QuitAccessPoint => line.write_str("AT+CWQAP"),
            Command::FetchIp => line.write_str("AT+CIFSR"),
            Command::OpenSocket { host, port } => {
                write!(line, "AT+CIPSTART=\"TCP\",\"{}\",{}", host, port)
            }
            Command::AnnounceLength(len) => write!(line, "AT+CIPSEND={}", len),
            Command::CloseSocket => line.write_str("AT+CIPCLOSE"),
            Command::Raw(text) => line.write_str(text),
        }
    }
}
