use super::command::{Command, CommandLine};
use super::config::Config;
use super::keyword::KeywordSet;
use super::queue::{DEFAULT_QUEUE_CAPACITY, RequestQueue};
use super::session::{Attempts, CommandSession, Exchange, Outcome};
use super::watchdog::{MAX_IP_LEN, Watchdog, parse_station_ip};
use super::{DEFAULT_BUFFER_SIZE, Handler, Platform, State};
use crate::network::application::http::{Method, Request, response};
use crate::network::error::Error;
use crate::network::{FmtWriter, Transport, Write};
use heapless::String;

/// Maximum SSID length accepted by [`Modem::connect`].
pub const MAX_SSID_LEN: usize = 32;
/// Maximum passphrase length accepted by [`Modem::connect`].
pub const MAX_PASSWORD_LEN: usize = 64;

/// Addresses shorter than this (`0.0.0.0` and friends) do not count as connected.
const MIN_IP_LEN: usize = 7;

/// What to do once the in-flight exchange resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Step {
    Reset,
    EchoOff,
    StationMode,
    SingleConnection,
    Join,
    Quit,
    FetchIp,
    OpenSocket,
    AnnounceLength,
    ConfirmSend,
    ReadMessage,
    CloseSocket,
    Raw,
}

impl Step {
    /// Configured keywords and deadline; `None` for caller-defined exchanges.
    fn exchange(self, config: &Config) -> Option<&Exchange> {
        let exchange = match self {
            Step::Reset => &config.reset,
            Step::EchoOff => &config.echo_off,
            Step::StationMode => &config.station_mode,
            Step::SingleConnection => &config.single_connection,
            Step::Join => &config.join,
            Step::Quit => &config.quit,
            Step::FetchIp => &config.fetch_ip,
            Step::OpenSocket => &config.open_socket,
            Step::AnnounceLength => &config.announce_length,
            Step::ConfirmSend => &config.confirm_send,
            Step::ReadMessage => &config.read_message,
            Step::CloseSocket => &config.close_socket,
            Step::Raw => return None,
        };
        Some(exchange)
    }
}

/// Result of [`Modem::send_raw_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawResponse<'a> {
    /// How the exchange ended.
    pub outcome: Outcome,
    /// Everything received, up to the buffer capacity.
    pub text: &'a str,
}

/// Handle to one physical modem.
///
/// `T` is the serial port, `P` the board services, `H` the application callbacks, `N`
/// the receive buffer capacity and `Q` the request queue capacity. Nothing happens
/// unless [`update`](Self::update) is called regularly from the control loop.
pub struct Modem<
    T,
    P,
    H = (),
    const N: usize = DEFAULT_BUFFER_SIZE,
    const Q: usize = DEFAULT_QUEUE_CAPACITY,
> {
    transport: T,
    platform: P,
    handler: H,
    config: Config,
    state: State,
    session: CommandSession<Step, N>,
    attempts: Attempts,
    queue: RequestQueue<Q>,
    watchdog: Watchdog,
    ip: String<MAX_IP_LEN>,
    connected: bool,
    autoconnect: bool,
    disconnect_requested: bool,
    ssid: String<MAX_SSID_LEN>,
    password: String<MAX_PASSWORD_LEN>,
}

impl<T, P, H, const N: usize, const Q: usize> core::fmt::Debug for Modem<T, P, H, N, Q> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Modem")
            .field("state", &self.state)
            .field("ip", &self.ip)
            .field("connected", &self.connected)
            .field("autoconnect", &self.autoconnect)
            .field("pending_requests", &self.queue.len())
            .finish()
    }
}

impl<T, P, H, const N: usize, const Q: usize> Modem<T, P, H, N, Q>
where
    T: Transport,
    P: Platform,
    H: Handler,
{
    /// Creates a driver in [`State::Idle`]. Call [`begin`](Self::begin) before use.
    pub fn new(transport: T, platform: P, handler: H, config: Config) -> Self {
        let watchdog = Watchdog::new(config.watchdog_interval_ms);
        Self {
            transport,
            platform,
            handler,
            config,
            state: State::Idle,
            session: CommandSession::new(),
            attempts: Attempts::new(),
            queue: RequestQueue::new(),
            watchdog,
            ip: String::new(),
            connected: false,
            autoconnect: false,
            disconnect_requested: false,
            ssid: String::new(),
            password: String::new(),
        }
    }

    /// Replaces the application callbacks.
    pub fn set_handler(&mut self, handler: H) {
        self.handler = handler;
    }

    /// The application callbacks.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The application callbacks, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// The serial port.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The serial port, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The board services.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The board services, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hard-resets the modem and starts bring-up.
    ///
    /// Discards the in-flight exchange, the request queue and all connectivity state.
    /// Credentials given to [`connect`](Self::connect) are kept.
    pub fn begin(&mut self) {
        info!("modem hard reset");
        self.platform.hard_reset();

        self.session.abandon();
        self.queue.clear();
        self.attempts.reset();
        self.watchdog.reset();
        self.ip.clear();
        self.connected = false;
        self.disconnect_requested = false;
        self.state = State::Resetting;

        let now = self.platform.now_ms();
        self.issue(Command::Reset, Step::Reset, now);
    }

    /// Advances the driver by one tick. Never blocks.
    pub fn update(&mut self) {
        let now = self.platform.now_ms();

        if self.session.is_armed() {
            self.watchdog.touch(now);
            if let Some((step, outcome)) = self.session.poll(&mut self.transport, now) {
                debug!("{:?} resolved: {:?}", step, outcome);
                self.resume(step, outcome, now);
            }
            return;
        }

        match self.state {
            State::Idle | State::Connected => self.schedule(now),
            _ => {}
        }
    }

    /// Stores access point credentials and enables auto-connect.
    ///
    /// The join itself happens on a later [`update`](Self::update) once the modem is
    /// idle.
    pub fn connect(&mut self, ssid: &str, password: &str) -> Result<(), Error> {
        let ssid = String::try_from(ssid).map_err(|_| Error::CapacityExceeded)?;
        let password = String::try_from(password).map_err(|_| Error::CapacityExceeded)?;
        self.ssid = ssid;
        self.password = password;
        self.autoconnect = true;
        self.disconnect_requested = false;
        Ok(())
    }

    /// Disables auto-connect and leaves the access point.
    ///
    /// The `AT+CWQAP` is sent as soon as no exchange is in flight.
    pub fn disconnect(&mut self) {
        self.autoconnect = false;
        self.disconnect_requested = true;
    }

    /// `true` once an access point was joined and a station IP is known.
    pub fn is_connected(&self) -> bool {
        self.connected && self.ip.len() >= MIN_IP_LEN
    }

    /// The station IP, empty while unknown.
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// The current driver state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of queued requests, including the one in flight.
    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    /// Queues an HTTP request built from its parts.
    pub fn submit_http_request(
        &mut self,
        host: &str,
        port: u16,
        method: Method,
        path: &str,
        body: Option<&str>,
        query: Option<&str>,
    ) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let mut request = Request::new(host, port, method, path)?;
        if let Some(body) = body {
            request = request.with_body(body)?;
        }
        if let Some(query) = query {
            request = request.with_query(query)?;
        }
        self.submit(request)
    }

    /// Queues a prepared request.
    pub fn submit(&mut self, request: Request) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        self.queue.submit(request)?;
        debug!("request queued, {} pending", self.queue.len());
        Ok(())
    }

    /// Sends `text` followed by `\r\n` and blocks until `keyword` shows up, the buffer
    /// fills or `timeout_ms` passes.
    ///
    /// Meant for diagnostics outside the regular workflows. Fails with
    /// [`Error::Busy`] while an exchange is in flight.
    pub fn send_raw_command(
        &mut self,
        text: &str,
        keyword: &str,
        timeout_ms: u32,
    ) -> Result<RawResponse<'_>, Error> {
        if self.session.is_armed() {
            return Err(Error::Busy);
        }
        let line = Command::Raw(text).render()?;
        let exchange = Exchange {
            success: KeywordSet::new(&[keyword])?,
            failure: KeywordSet::empty(),
            timeout_ms,
        };

        let now = self.platform.now_ms();
        self.session.arm(&mut self.transport, line.as_bytes(), &exchange, now, Step::Raw);
        let outcome = loop {
            let now = self.platform.now_ms();
            if let Some((_, outcome)) = self.session.poll(&mut self.transport, now) {
                break outcome;
            }
        };

        Ok(RawResponse {
            outcome,
            text: self.session.text(),
        })
    }

    /// Picks the next exchange while the workflow rests.
    fn schedule(&mut self, now: u32) {
        if self.disconnect_requested {
            self.disconnect_requested = false;
            info!("leaving access point");
            self.issue(Command::QuitAccessPoint, Step::Quit, now);
            return;
        }

        match self.state {
            State::Idle if self.autoconnect && !self.connected && !self.ssid.is_empty() => {
                info!("joining access point {}", self.ssid.as_str());
                let line = Command::JoinAccessPoint {
                    ssid: &self.ssid,
                    password: &self.password,
                }
                .render();
                self.send_line(line, Step::Join, now);
                return;
            }
            // a requested IP check goes ahead of queued requests
            State::Connected if !self.queue.is_empty() && !self.watchdog.check_requested() => {
                self.open_socket(now);
                return;
            }
            _ => {}
        }

        if self.connected && self.watchdog.check_if_stale(now) {
            debug!("checking station IP");
            self.issue(Command::FetchIp, Step::FetchIp, now);
        }
    }

    /// Continues the workflow after `step` resolved with `outcome`.
    fn resume(&mut self, step: Step, outcome: Outcome, now: u32) {
        match step {
            Step::Reset => {
                if outcome.is_progress() {
                    self.attempts.reset();
                    self.issue(Command::EchoOff, Step::EchoOff, now);
                } else if self.attempts.attempt(self.config.reset_attempts) {
                    warn!("soft reset failed, attempt {}", self.attempts.count());
                    self.state = State::Resetting;
                    self.issue(Command::Reset, Step::Reset, now);
                } else {
                    error!("modem did not come up");
                    self.state = State::Error;
                }
            }
            Step::EchoOff => {
                if outcome.is_progress() {
                    self.issue(Command::StationMode, Step::StationMode, now);
                } else {
                    error!("echo could not be disabled");
                    self.state = State::Error;
                }
            }
            Step::StationMode => {
                if outcome.is_progress() {
                    self.issue(Command::SingleConnection, Step::SingleConnection, now);
                } else {
                    error!("station mode rejected");
                    self.state = State::Error;
                }
            }
            Step::SingleConnection => {
                if outcome.is_progress() {
                    info!("modem ready");
                    self.state = State::Idle;
                } else {
                    error!("connection mode rejected");
                    self.state = State::Error;
                }
            }
            Step::Join => match outcome {
                Outcome::Success | Outcome::Overflow => {
                    info!("joined access point");
                    self.state = State::Connected;
                    self.connected = true;
                    self.watchdog.request_check();
                }
                Outcome::Failure => {
                    error!("access point rejected the credentials");
                    self.state = State::Error;
                }
                Outcome::Timeout => {
                    warn!("access point join timed out");
                    self.state = State::Idle;
                    self.connected = false;
                }
            },
            Step::Quit => {
                if !outcome.is_progress() {
                    warn!("modem did not confirm leaving the access point");
                }
                self.go_offline();
            }
            Step::FetchIp => self.station_ip_fetched(outcome),
            Step::OpenSocket => {
                if outcome.is_progress() {
                    self.attempts.reset();
                    self.announce_length(now);
                } else if self.attempts.attempt(self.config.open_socket_attempts) {
                    warn!("socket open failed, attempt {}", self.attempts.count());
                    self.open_socket(now);
                } else {
                    let error = match outcome {
                        Outcome::Timeout => Error::Timeout,
                        _ => Error::ConnectionRefused,
                    };
                    warn!("dropping request: {:?}", error);
                    self.queue.pop_front();
                    self.handler.request_failed(error);
                    self.state = State::Connected;
                    self.watchdog.request_check();
                }
            }
            Step::AnnounceLength => {
                if outcome.is_progress() {
                    self.send_payload(now);
                } else {
                    self.abort_request(outcome, now);
                }
            }
            Step::ConfirmSend => {
                if outcome.is_progress() {
                    self.issue_silent(Step::ReadMessage, now);
                } else {
                    self.abort_request(outcome, now);
                }
            }
            Step::ReadMessage => {
                self.state = State::DataReceived;
                if outcome.is_progress() {
                    self.deliver_response();
                } else {
                    let error = outcome.error().unwrap_or(Error::Failure);
                    warn!("no answer from server: {:?}", error);
                    self.handler.request_failed(error);
                }
                self.issue(Command::CloseSocket, Step::CloseSocket, now);
            }
            Step::CloseSocket => {
                self.queue.pop_front();
                self.attempts.reset();
                self.state = State::Connected;
            }
            Step::Raw => {}
        }
    }

    fn open_socket(&mut self, now: u32) {
        let line = match self.queue.peek_front() {
            Some(request) => Command::OpenSocket {
                host: &request.host,
                port: request.port,
            }
            .render(),
            None => {
                self.state = State::Connected;
                return;
            }
        };
        self.state = State::ConnectingServer;
        self.send_line(line, Step::OpenSocket, now);
    }

    fn announce_length(&mut self, now: u32) {
        let len = match self.queue.peek_front() {
            Some(request) => request.encoded_len(&self.config.user_agent),
            None => {
                self.state = State::Connected;
                return;
            }
        };
        trace!("payload length {}", len);
        self.state = State::SendingData;
        self.issue(Command::AnnounceLength(len), Step::AnnounceLength, now);
    }

    fn send_payload(&mut self, now: u32) {
        let Some(request) = self.queue.peek_front() else {
            self.state = State::Connected;
            return;
        };
        self.state = State::SendingData;

        let mut writer = FmtWriter::new(&mut self.transport);
        let sent = request
            .write_payload(&mut writer, &self.config.user_agent)
            .is_ok();
        let sent = sent && self.transport.flush().is_ok();

        if sent {
            self.session
                .arm(&mut self.transport, b"", &self.config.confirm_send, now, Step::ConfirmSend);
        } else {
            warn!("payload write failed");
            self.session
                .arm_failed(&self.config.confirm_send, now, Step::ConfirmSend);
        }
        self.state = State::ReceivingData;
    }

    fn deliver_response(&mut self) {
        let markers = self.config.read_message.success.iter();
        match response::parse(self.session.text(), markers) {
            Some(response) => {
                if response.check_status().is_err() {
                    warn!("unexpected status code {}", response.status_code);
                }
                debug!("response {}, {} body bytes", response.status_code, response.body.len());
                self.handler.data_received(response.status_code, response.body);
            }
            None => {
                warn!("message held no HTTP response");
                self.handler.request_failed(Error::ProtocolError);
            }
        }
    }

    fn abort_request(&mut self, outcome: Outcome, now: u32) {
        let error = outcome.error().unwrap_or(Error::Failure);
        warn!("request aborted: {:?}", error);
        self.handler.request_failed(error);
        self.issue(Command::CloseSocket, Step::CloseSocket, now);
    }

    fn station_ip_fetched(&mut self, outcome: Outcome) {
        let ip = if outcome.is_progress() {
            parse_station_ip(self.session.text())
        } else {
            None
        };

        match ip {
            Some(ip) => {
                let first = !self.is_connected();
                self.state = State::Connected;
                self.connected = true;
                self.ip = ip;
                if first {
                    info!("station IP {}", self.ip.as_str());
                    self.handler.wifi_connected(&self.ip);
                }
            }
            None => {
                warn!("no station IP");
                self.go_offline();
            }
        }
    }

    fn go_offline(&mut self) {
        let was_connected = self.is_connected();
        self.state = State::Idle;
        self.connected = false;
        self.ip.clear();
        if was_connected {
            self.handler.wifi_disconnected();
        }
    }

    fn issue(&mut self, command: Command<'_>, step: Step, now: u32) {
        self.send_line(command.render(), step, now);
    }

    /// Arms `step` without writing anything, to wait for unsolicited data that may
    /// already have started arriving.
    fn issue_silent(&mut self, step: Step, now: u32) {
        if let Some(exchange) = step.exchange(&self.config) {
            self.session.arm_continue(exchange, now, step);
            self.state = State::ReceivingData;
        }
    }

    fn send_line(&mut self, line: Result<CommandLine, Error>, step: Step, now: u32) {
        let Some(exchange) = step.exchange(&self.config) else {
            return;
        };
        match line {
            Ok(line) => {
                trace!("tx {}", line.as_str().trim_end());
                self.session
                    .arm(&mut self.transport, line.as_bytes(), exchange, now, step);
            }
            Err(_) => {
                warn!("command does not fit the line buffer");
                self.session.arm_failed(exchange, now, step);
            }
        }
        self.state = State::ReceivingData;
    }
}
