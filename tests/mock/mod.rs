#![allow(dead_code)]

use libat::modem::{Config, Handler, Modem, Platform, State};
use libat::network::error::Error;
use libat::network::{Read, Transport, Write};
use std::collections::VecDeque;

/// Serial port standing in for the modem.
///
/// Each script entry waits for its trigger to appear in the bytes written so far and
/// then queues its reply chunks. One chunk is delivered per drain, so every chunk
/// arrives on its own tick.
#[derive(Debug, Default)]
pub struct ScriptedModem {
    script: VecDeque<(String, Vec<String>)>,
    pub tx: String,
    scanned: usize,
    rx: VecDeque<Vec<u8>>,
    gap: bool,
    pub fail_writes: bool,
}

impl ScriptedModem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies with `chunks` once `trigger` has been written.
    pub fn expect(&mut self, trigger: &str, chunks: &[&str]) -> &mut Self {
        self.script.push_back((
            trigger.to_string(),
            chunks.iter().map(|c| c.to_string()).collect(),
        ));
        self.match_script();
        self
    }

    /// Queues bytes the modem sends on its own.
    pub fn push_unsolicited(&mut self, chunk: &[u8]) {
        self.rx.push_back(chunk.to_vec());
    }

    /// How many times `needle` was written.
    pub fn count(&self, needle: &str) -> usize {
        self.tx.matches(needle).count()
    }

    pub fn script_done(&self) -> bool {
        self.script.is_empty()
    }

    fn match_script(&mut self) {
        while let Some((trigger, _)) = self.script.front() {
            let Some(pos) = self.tx[self.scanned..].find(trigger.as_str()) else {
                break;
            };
            self.scanned += pos + trigger.len();
            let (_, chunks) = self.script.pop_front().unwrap();
            self.rx.extend(chunks.into_iter().map(String::into_bytes));
        }
    }
}

impl Read for ScriptedModem {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.gap {
            self.gap = false;
            return Ok(0);
        }
        let Some(mut chunk) = self.rx.pop_front() else {
            return Ok(0);
        };
        let n = buf.len().min(chunk.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            chunk.drain(..n);
            self.rx.push_front(chunk);
        } else {
            self.gap = true;
        }
        Ok(n)
    }
}

impl Write for ScriptedModem {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(());
        }
        self.tx.push_str(&String::from_utf8_lossy(buf));
        self.match_script();
        if self.script.is_empty() {
            self.scanned = self.tx.len();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Transport for ScriptedModem {}

/// Clock that advances by `step` on every read.
#[derive(Debug)]
pub struct Board {
    pub now: u32,
    pub step: u32,
    pub hard_resets: usize,
}

impl Board {
    pub fn new(step: u32) -> Self {
        Self {
            now: 1,
            step,
            hard_resets: 0,
        }
    }
}

impl Platform for Board {
    fn now_ms(&mut self) -> u32 {
        let now = self.now;
        self.now = self.now.wrapping_add(self.step);
        now
    }

    fn hard_reset(&mut self) {
        self.hard_resets += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connected(String),
    Disconnected,
    Data(u16, String),
    Failed(Error),
}

/// Handler that records every callback.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Handler for Recorder {
    fn wifi_connected(&mut self, ip: &str) {
        self.events.push(Event::Connected(ip.to_string()));
    }

    fn wifi_disconnected(&mut self) {
        self.events.push(Event::Disconnected);
    }

    fn data_received(&mut self, status_code: u16, body: &str) {
        self.events.push(Event::Data(status_code, body.to_string()));
    }

    fn request_failed(&mut self, error: Error) {
        self.events.push(Event::Failed(error));
    }
}

pub type TestModem = Modem<ScriptedModem, Board, Recorder>;

pub fn modem(step: u32) -> TestModem {
    modem_with(step, Config::default())
}

pub fn modem_with(step: u32, config: Config) -> TestModem {
    Modem::new(ScriptedModem::new(), Board::new(step), Recorder::default(), config)
}

/// Scripts a clean bring-up. Replies after `ATE0` carry no echo.
pub fn script_bring_up(port: &mut ScriptedModem) {
    port.expect("AT+RST\r\n", &["AT+RST\r\n\r\nOK\r\n", "\r\n ets Jan  8 2013\r\nready\r\n"])
        .expect("ATE0\r\n", &["ATE0\r\n\r\nOK\r\n"])
        .expect("AT+CWMODE=1\r\n", &["\r\nOK\r\n"])
        .expect("AT+CIPMUX=0\r\n", &["\r\nOK\r\n"]);
}

/// What `AT+CIFSR` prints for station address `ip`.
pub fn cifsr_reply(ip: &str) -> String {
    format!(
        "+CIFSR:STAIP,\"{}\"\r\n+CIFSR:STAMAC,\"5c:cf:7f:01:02:03\"\r\n\r\nOK\r\n",
        ip
    )
}

/// Scripts joining `home`/`secret` and the first IP check.
pub fn script_join(port: &mut ScriptedModem, ip: &str) {
    port.expect("AT+CWJAP=\"home\",\"secret\"\r\n", &["WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n"])
        .expect("AT+CIFSR\r\n", &[cifsr_reply(ip).as_str()]);
}

/// Ticks until `done` holds, panicking after `max` ticks.
pub fn run_until(modem: &mut TestModem, max: usize, done: impl Fn(&TestModem) -> bool) {
    for _ in 0..max {
        if done(&*modem) {
            return;
        }
        modem.update();
    }
    assert!(done(&*modem), "condition not reached after {} ticks: {:?}", max, modem);
}

pub fn run(modem: &mut TestModem, ticks: usize) {
    for _ in 0..ticks {
        modem.update();
    }
}

/// A modem that is brought up, joined and holds `192.168.1.17`.
pub fn online_modem() -> TestModem {
    online_modem_with(Config::default())
}

pub fn online_modem_with(config: Config) -> TestModem {
    let mut modem = modem_with(10, config);
    script_bring_up(modem.transport_mut());
    script_join(modem.transport_mut(), "192.168.1.17");
    modem.connect("home", "secret").unwrap();
    modem.begin();
    run_until(&mut modem, 100, |m| m.is_connected());
    assert_eq!(modem.state(), State::Connected);
    modem
}
