//! Driver configuration.

use super::session::Exchange;
use crate::network::error::Error;
use heapless::String;
use serde::Deserialize;

/// Maximum length of the `User-Agent` header value.
pub const MAX_USER_AGENT_LEN: usize = 48;

/// Keywords, deadlines and retry limits for every exchange the driver issues.
///
/// Every field has a default, so a JSON document only needs to name what it changes.
/// An exchange that is overridden is replaced as a whole; keyword sets or a timeout it
/// leaves out fall back to empty and zero.
///
/// # Examples
///
/// ```rust
/// use libat::modem::Config;
///
/// let config = Config::from_json(br#"{"watchdog_interval_ms": 5000}"#).unwrap();
/// assert_eq!(config.watchdog_interval_ms, 5000);
/// assert_eq!(config.reset.timeout_ms, Config::default().reset.timeout_ms);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `AT+RST`
    pub reset: Exchange,
    /// `ATE0`
    pub echo_off: Exchange,
    /// `AT+CWMODE=1`
    pub station_mode: Exchange,
    /// `AT+CIPMUX=0`
    pub single_connection: Exchange,
    /// `AT+CWJAP`
    pub join: Exchange,
    /// `AT+CWQAP`
    pub quit: Exchange,
    /// `AT+CIFSR`
    pub fetch_ip: Exchange,
    /// `AT+CIPSTART`
    pub open_socket: Exchange,
    /// `AT+CIPSEND`
    pub announce_length: Exchange,
    /// Payload transmission.
    pub confirm_send: Exchange,
    /// Waiting for the server's answer.
    ///
    /// Its first success keyword is also the marker stripped from the end of the
    /// received message.
    pub read_message: Exchange,
    /// `AT+CIPCLOSE`
    pub close_socket: Exchange,
    /// Idle time after which the station IP is re-read.
    pub watchdog_interval_ms: u32,
    /// Soft reset attempts before bring-up gives up.
    pub reset_attempts: u8,
    /// Socket open attempts before a request is dropped.
    pub open_socket_attempts: u8,
    /// Sent as `User-Agent`; omitted when empty.
    pub user_agent: String<MAX_USER_AGENT_LEN>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset: Exchange::preset(&["ready"], &[], 10_000),
            echo_off: Exchange::preset(&["OK"], &["ERROR"], 2_000),
            station_mode: Exchange::preset(&["OK"], &["ERROR"], 2_000),
            single_connection: Exchange::preset(&["OK"], &["ERROR"], 3_000),
            join: Exchange::preset(&["OK"], &["FAIL"], 10_000),
            quit: Exchange::preset(&["OK"], &[], 3_000),
            fetch_ip: Exchange::preset(&["OK"], &["ERROR"], 10_000),
            open_socket: Exchange::preset(&["OK", "ALREADY CONNECTED"], &["ERROR", "CLOSED"], 5_000),
            announce_length: Exchange::preset(&[">"], &["ERROR"], 5_000),
            confirm_send: Exchange::preset(&["SEND OK"], &["ERROR", "SEND FAIL"], 20_000),
            read_message: Exchange::preset(&["CLOSED"], &[], 30_000),
            close_socket: Exchange::preset(&["OK", "ERROR"], &[], 10_000),
            watchdog_interval_ms: 60_000,
            reset_attempts: 3,
            open_socket_attempts: 3,
            user_agent: String::try_from(concat!("libat/", env!("CARGO_PKG_VERSION")))
                .unwrap_or_default(),
        }
    }
}

impl Config {
    /// Parses a JSON document on top of the defaults.
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        let (config, _) = serde_json_core::from_slice::<Config>(json).map_err(|_| Error::InvalidConfig)?;
        Ok(config)
    }
}
