//! Inbound HTTP response framing.
//!
//! The modem delivers socket data as `+IPD,<len>:<payload>` followed by whatever
//! status line it prints when the server closes the connection. [`parse`] peels
//! those layers off and reads the HTTP status line and body out of what remains.

use crate::network::error::Error;

const HTTP_TOKEN: &str = "HTTP";
const HEADER_END: &str = "\r\n\r\n";
const LINE_TERMINATORS: &[char] = &['\r', '\n'];

/// Smallest status code accepted without a [`Error::ParseAnomaly`] report.
pub const MIN_STATUS: u16 = 100;
/// Largest status code accepted without a [`Error::ParseAnomaly`] report.
pub const MAX_STATUS: u16 = 999;

/// A parsed response borrowing from the modem's receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    /// Status code as read from the status line; `0` if it was not numeric.
    pub status_code: u16,
    /// Everything after the first blank line.
    pub body: &'a str,
}

impl Response<'_> {
    /// Returns [`Error::ParseAnomaly`] when the status code is outside `100..=999`.
    ///
    /// Such responses are still delivered; this only tells the caller the status line
    /// looked wrong.
    pub fn check_status(&self) -> Result<(), Error> {
        if (MIN_STATUS..=MAX_STATUS).contains(&self.status_code) {
            Ok(())
        } else {
            Err(Error::ParseAnomaly)
        }
    }
}

/// Removes the inbound-data envelope and the trailing status marker.
///
/// Returns `None` when the message has no `:` and therefore no envelope.
pub fn strip_envelope<'a, I, S>(message: &'a str, markers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start = message.find(':')?;
    let mut payload = message[start + 1..].trim_end_matches(LINE_TERMINATORS);

    for marker in markers {
        let marker = marker.as_ref();
        if marker.is_empty() {
            continue;
        }
        if let Some(stripped) = payload.strip_suffix(marker) {
            payload = stripped.trim_end_matches(LINE_TERMINATORS);
            break;
        }
    }

    Some(payload)
}

/// Frames a raw modem message into an HTTP [`Response`].
///
/// `markers` are the keywords that may trail the payload (the ones that ended the
/// read exchange); at most one of them is removed. Messages that do not start with
/// `HTTP` after the envelope yield `None`.
pub fn parse<'a, I, S>(message: &'a str, markers: I) -> Option<Response<'a>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let payload = strip_envelope(message, markers)?;
    if !payload.starts_with(HTTP_TOKEN) {
        return None;
    }

    let status_code = payload
        .find(' ')
        .map(|space| parse_status(&payload[space + 1..]))
        .unwrap_or(0);

    let body = payload
        .find(HEADER_END)
        .map(|end| &payload[end + HEADER_END.len()..])
        .unwrap_or("");

    Some(Response { status_code, body })
}

/// Reads up to three leading digits; stops at the first non-digit.
fn parse_status(text: &str) -> u16 {
    text.bytes()
        .take(3)
        .take_while(u8::is_ascii_digit)
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'))
}
