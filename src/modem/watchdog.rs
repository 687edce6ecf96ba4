//! Idle-time IP watchdog.

use heapless::String;

/// Longest dotted-quad address, `255.255.255.255`.
pub const MAX_IP_LEN: usize = 15;

const STATION_IP_MARKER: &str = "STAIP";

/// Decides when the station IP must be re-read from the modem.
///
/// The timestamp is refreshed by every tick spent waiting on the modem, so checks
/// only happen after `interval_ms` of idleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watchdog {
    last_activity: Option<u32>,
    interval_ms: u32,
}

impl Watchdog {
    /// A watchdog that fires on its first check.
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            last_activity: None,
            interval_ms,
        }
    }

    /// Records modem activity at `now`.
    pub fn touch(&mut self, now: u32) {
        self.last_activity = Some(now);
    }

    /// Makes the next [`check_if_stale`](Self::check_if_stale) fire.
    pub fn request_check(&mut self) {
        self.last_activity = None;
    }

    /// `true` while a check requested through [`request_check`](Self::request_check)
    /// (or a never-checked link) is outstanding.
    pub fn check_requested(&self) -> bool {
        self.last_activity.is_none()
    }

    /// Returns `true`, and records `now`, when an IP check is due.
    ///
    /// Due means never checked, idle for longer than the interval, or the clock
    /// went backwards.
    pub fn check_if_stale(&mut self, now: u32) -> bool {
        let stale = match self.last_activity {
            None => true,
            Some(last) => now < last || now - last > self.interval_ms,
        };
        if stale {
            self.last_activity = Some(now);
        }
        stale
    }

    /// Forgets all activity.
    pub fn reset(&mut self) {
        self.last_activity = None;
    }

    /// The configured interval.
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

/// Extracts the station IP from an `AT+CIFSR` response.
///
/// Looks at the first quoted token after `STAIP`. It only counts as an address when it
/// is made of digits and dots and starts with `1`..=`9`, which rejects the `0.0.0.0`
/// the modem reports while it has no lease.
pub fn parse_station_ip(response: &str) -> Option<String<MAX_IP_LEN>> {
    let start = response.find(STATION_IP_MARKER)?;
    let token = response[start..].split('"').nth(1)?;

    let leading = token.bytes().next()?;
    if !(b'1'..=b'9').contains(&leading) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    String::try_from(token).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_check_fires() {
        let mut watchdog = Watchdog::new(u32::MAX);
        assert!(watchdog.check_if_stale(0));
        assert!(!watchdog.check_if_stale(1));
    }

    #[test]
    fn test_interval_and_rollover() {
        let mut watchdog = Watchdog::new(1000);
        watchdog.touch(5000);
        assert!(!watchdog.check_if_stale(6000));
        assert!(watchdog.check_if_stale(6001));
        assert!(watchdog.check_if_stale(10));
    }

    #[test]
    fn test_request_check() {
        let mut watchdog = Watchdog::new(1000);
        watchdog.touch(0);
        assert!(!watchdog.check_requested());
        watchdog.request_check();
        assert!(watchdog.check_requested());
        assert!(watchdog.check_if_stale(1));
        assert!(!watchdog.check_requested());
    }

    #[test]
    fn test_parse_station_ip() {
        let response = "AT+CIFSR\r\n+CIFSR:STAIP,\"192.168.1.17\"\r\n+CIFSR:STAMAC,\"5c:cf:7f:01:02:03\"\r\n\r\nOK\r\n";
        assert_eq!(parse_station_ip(response).unwrap().as_str(), "192.168.1.17");
    }

    #[test]
    fn test_parse_station_ip_without_lease() {
        let response = "+CIFSR:STAIP,\"0.0.0.0\"\r\n+CIFSR:STAMAC,\"5c:cf:7f:01:02:03\"\r\nOK";
        assert!(parse_station_ip(response).is_none());
        assert!(parse_station_ip("OK\r\n").is_none());
    }
}
