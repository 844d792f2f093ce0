//! Session connector: owns the socket and its background receive path
//!
//! The connector runs on the UI thread. Outbound operations
//! ([`Connector::send_command`], [`Connector::toggle_motor`],
//! [`Connector::stop`]) write synchronously; inbound telemetry is
//! handled by one background thread per session that forwards
//! recognized colors through a notification channel. The presentation
//! layer drains that channel on its own loop, so display state is
//! never touched from the receive thread and updates apply in arrival
//! order.
//!
//! Reads and writes share the socket without a lock: they operate on
//! the two directions of the duplex connection, which `TcpStream`
//! keeps in independent buffers.
//!
//! # Failure handling
//!
//! There is no retry and no reconnection. A failed connect leaves the
//! state at `Failed` until a fresh `connect`. A mid-session write
//! failure moves through `Failed` (surfacing the error text) and then
//! releases the session. A mid-session read failure is reported by
//! the receive thread as a `Failed` notification; the presentation
//! layer reacts by calling [`Connector::disconnect`].

use crate::config::ConnectionConfig;
use crate::error::{ConsoleError, Result};
use crate::state::{ConnectionState, MotorState};
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use varna_proto::{Color, Command, RECV_BUFFER_SIZE};

/// Update marshaled from the connector to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The robot reported a detected color
    ColorDetected(Color),
    /// The connection state changed; carries the new state
    StateChanged(ConnectionState),
    /// `stop` completed and the program should wind down
    SessionEnded,
}

/// Console-side owner of the session and its receive thread
pub struct Connector {
    config: ConnectionConfig,
    stream: Option<TcpStream>,
    motor: MotorState,
    state: Arc<Mutex<ConnectionState>>,
    /// Cleared on intentional local close so the receive thread does
    /// not report the resulting read failure as a connection loss.
    session_alive: Option<Arc<AtomicBool>>,
    notify_tx: Sender<Notification>,
}

impl Connector {
    /// Create a connector and the notification receiver the
    /// presentation layer drains.
    pub fn new(config: ConnectionConfig) -> (Self, Receiver<Notification>) {
        let (notify_tx, notify_rx) = channel();
        let connector = Self {
            config,
            stream: None,
            motor: MotorState::Stopped,
            state: Arc::new(Mutex::new(ConnectionState::Idle)),
            session_alive: None,
            notify_tx,
        };
        (connector, notify_rx)
    }

    /// Snapshot of the connection state
    pub fn state(&self) -> ConnectionState {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Locally tracked motor state
    pub fn motor_state(&self) -> MotorState {
        self.motor
    }

    /// Open the session and start the receive thread.
    ///
    /// On success the state lands at `Connected` and a single `START`
    /// token is sent. On failure the state lands at `Failed` with the
    /// error text and stays there until the next `connect`.
    pub fn connect(&mut self, host: &str, port: u16) -> ConnectionState {
        match self.state() {
            ConnectionState::Connecting | ConnectionState::Connected => {
                log::warn!("connect ignored: session already active");
                return self.state();
            }
            ConnectionState::Idle | ConnectionState::Failed(_) => {}
        }

        self.set_state(ConnectionState::Connecting);
        match self.open_session(host, port) {
            Ok(()) => {
                self.set_state(ConnectionState::Connected);
                log::info!("Connected to {}:{}", host, port);
                self.send_command(Command::Start);
            }
            Err(e) => {
                log::error!("Connect to {}:{} failed: {}", host, port, e);
                self.set_state(ConnectionState::Failed(e.to_string()));
                self.close_session();
            }
        }
        self.state()
    }

    fn open_session(&mut self, host: &str, port: u16) -> Result<()> {
        let addr = resolve(host, port)?;
        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let stream = TcpStream::connect_timeout(&addr, connect_timeout)?;

        let reader_stream = stream.try_clone()?;
        reader_stream.set_read_timeout(Some(Duration::from_millis(self.config.read_timeout_ms)))?;

        let alive = Arc::new(AtomicBool::new(true));
        let reader_alive = Arc::clone(&alive);
        let reader_state = Arc::clone(&self.state);
        let reader_tx = self.notify_tx.clone();

        thread::Builder::new()
            .name("telemetry-rx".to_string())
            .spawn(move || {
                receive_loop(reader_stream, reader_state, reader_alive, reader_tx);
            })?;

        self.stream = Some(stream);
        self.session_alive = Some(alive);
        Ok(())
    }

    /// Write one command token. No acknowledgement is awaited; a
    /// write failure surfaces as `Failed` and releases the session.
    pub fn send_command(&mut self, cmd: Command) {
        let Some(stream) = self.stream.as_mut() else {
            log::warn!("Cannot send {}: no active session", cmd.token());
            return;
        };

        log::debug!("Sending {}", cmd.token());
        if let Err(e) = stream.write_all(cmd.token().as_bytes()) {
            let reason = format!("Failed to send {}: {}", cmd.token(), e);
            log::error!("{}", reason);
            self.set_state(ConnectionState::Failed(reason));
            self.disconnect();
        }
    }

    /// Alternate the motor between running and stopped.
    ///
    /// The decision is based purely on the locally tracked state;
    /// exactly one token goes out per invocation and no confirmation
    /// is awaited.
    pub fn toggle_motor(&mut self) {
        let next = self.motor.toggled();
        let cmd = match next {
            MotorState::Running => Command::StartMotor,
            MotorState::Stopped => Command::StopMotor,
        };
        self.send_command(cmd);
        // A failed send already reset the session (and the motor
        // state with it); only commit the flip on a live session.
        if self.state() == ConnectionState::Connected {
            self.motor = next;
        }
    }

    /// Best-effort close of the session. Idempotent; always leaves
    /// the motor at `Stopped` and the state at `Idle`, whatever came
    /// before.
    pub fn disconnect(&mut self) {
        self.close_session();
        if self.state() != ConnectionState::Idle {
            self.set_state(ConnectionState::Idle);
        }
    }

    /// Send `STOP`, tear the session down, and signal the
    /// presentation layer that the run is over.
    pub fn stop(&mut self) {
        self.send_command(Command::Stop);
        self.disconnect();
        let _ = self.notify_tx.send(Notification::SessionEnded);
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next.clone();
        let _ = self.notify_tx.send(Notification::StateChanged(next));
    }

    /// Release session resources: silence the receive thread, shut the
    /// socket down, reset the motor display state.
    fn close_session(&mut self) {
        if let Some(alive) = self.session_alive.take() {
            alive.store(false, Ordering::Relaxed);
        }
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.motor = MotorState::Stopped;
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| ConsoleError::Address(format!("{}:{}", host, port)))
}

/// Background receive loop, one per session.
///
/// Each iteration performs one bounded-timeout read. A timeout just
/// re-checks the alive flag and continues; it is not an error. Any
/// other failure (including the peer closing the stream) ends the
/// loop and, if the session was still live, surfaces as `Failed`.
fn receive_loop(
    mut stream: TcpStream,
    state: Arc<Mutex<ConnectionState>>,
    alive: Arc<AtomicBool>,
    tx: Sender<Notification>,
) {
    log::debug!("Telemetry receiver started");
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        if !alive.load(Ordering::Relaxed) {
            break;
        }

        match stream.read(&mut buf) {
            Ok(0) => {
                report_loss(&stream, &state, &alive, &tx, "Connection closed by peer");
                break;
            }
            Ok(n) => match Color::from_bytes(&buf[..n]) {
                // Recognized telemetry goes to the presentation layer
                // in arrival order; everything else is dropped.
                Some(color) => {
                    if tx.send(Notification::ColorDetected(color)).is_err() {
                        break;
                    }
                }
                None => log::debug!("Dropping unrecognized telemetry ({} bytes)", n),
            },
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // No telemetry within the window; keep listening.
            }
            Err(e) => {
                report_loss(&stream, &state, &alive, &tx, &format!("Receive error: {}", e));
                break;
            }
        }
    }

    log::debug!("Telemetry receiver stopped");
}

/// Mark the session failed unless it was closed locally on purpose.
fn report_loss(
    stream: &TcpStream,
    state: &Arc<Mutex<ConnectionState>>,
    alive: &Arc<AtomicBool>,
    tx: &Sender<Notification>,
    reason: &str,
) {
    // An intentional disconnect also wakes the blocked read; only a
    // session that was still live reports the failure.
    if !alive.swap(false, Ordering::Relaxed) {
        return;
    }

    log::error!("{}", reason);
    let failed = ConnectionState::Failed(reason.to_string());
    *state.lock().unwrap_or_else(|e| e.into_inner()) = failed.clone();
    let _ = tx.send(Notification::StateChanged(failed));
    let _ = stream.shutdown(Shutdown::Both);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::mpsc::RecvTimeoutError;

    fn test_config() -> ConnectionConfig {
        ConnectionConfig {
            robot_ip: "127.0.0.1".to_string(),
            port: 0,
            connect_timeout_ms: 1000,
            read_timeout_ms: 50,
        }
    }

    fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    /// Connect a fresh connector to a local listener, consume the
    /// initial START token on the accepted stream, and drain the
    /// connect-time state notifications.
    fn connected_pair() -> (Connector, Receiver<Notification>, TcpStream) {
        let (listener, port) = listener();
        let (mut connector, rx) = Connector::new(test_config());

        let state = connector.connect("127.0.0.1", port);
        assert_eq!(state, ConnectionState::Connected);

        let (mut server, _) = listener.accept().unwrap();
        read_token(&mut server, "START");

        assert_eq!(next_state_change(&rx), ConnectionState::Connecting);
        assert_eq!(next_state_change(&rx), ConnectionState::Connected);
        (connector, rx, server)
    }

    fn read_token(stream: &mut TcpStream, expected: &str) {
        let mut buf = vec![0u8; expected.len()];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    /// Wait for the next state-change notification, skipping telemetry.
    fn next_state_change(rx: &Receiver<Notification>) -> ConnectionState {
        loop {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                Notification::StateChanged(state) => return state,
                _ => continue,
            }
        }
    }

    /// Collect color notifications until `count` arrived.
    fn collect_colors(rx: &Receiver<Notification>, count: usize) -> Vec<Color> {
        let mut colors = Vec::new();
        while colors.len() < count {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                Notification::ColorDetected(color) => colors.push(color),
                _ => continue,
            }
        }
        colors
    }

    #[test]
    fn connect_reports_connected_and_sends_start_once() {
        let (listener, port) = listener();
        let (mut connector, rx) = Connector::new(test_config());

        let state = connector.connect("127.0.0.1", port);
        assert_eq!(state, ConnectionState::Connected);

        assert_eq!(next_state_change(&rx), ConnectionState::Connecting);
        assert_eq!(next_state_change(&rx), ConnectionState::Connected);

        let (mut server, _) = listener.accept().unwrap();
        read_token(&mut server, "START");

        // Nothing beyond the single START token was sent.
        server
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        let mut extra = [0u8; 16];
        match server.read(&mut extra) {
            Err(e) => assert!(
                e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut
            ),
            Ok(n) => panic!("unexpected extra bytes after START: {}", n),
        }
    }

    #[test]
    fn connect_failure_lands_in_failed_with_error_text() {
        // Grab a free port, then close the listener so the connect is
        // refused.
        let (listener, port) = listener();
        drop(listener);

        let (mut connector, _rx) = Connector::new(test_config());
        let state = connector.connect("127.0.0.1", port);

        match state {
            ConnectionState::Failed(reason) => assert!(!reason.is_empty()),
            other => panic!("expected Failed, got {:?}", other),
        }
        // Failed persists until a fresh connect.
        assert!(matches!(connector.state(), ConnectionState::Failed(_)));
        assert_eq!(connector.motor_state(), MotorState::Stopped);
    }

    #[test]
    fn connect_is_refused_while_session_is_active() {
        let (mut connector, _rx, _server) = connected_pair();
        let state = connector.connect("127.0.0.1", 1);
        assert_eq!(state, ConnectionState::Connected);
    }

    #[test]
    fn toggle_motor_alternates_and_sends_one_token_per_call() {
        let (mut connector, _rx, mut server) = connected_pair();

        connector.toggle_motor();
        assert_eq!(connector.motor_state(), MotorState::Running);
        connector.toggle_motor();
        assert_eq!(connector.motor_state(), MotorState::Stopped);
        connector.toggle_motor();
        assert_eq!(connector.motor_state(), MotorState::Running);

        // Exactly these three tokens, in order, nothing else.
        read_token(&mut server, "START_MOTORSTOP_MOTORSTART_MOTOR");
    }

    #[test]
    fn telemetry_is_forwarded_in_order_and_unknown_tokens_dropped() {
        let (connector, rx, mut server) = connected_pair();

        server.write_all(b"PURPLE").unwrap();
        std::thread::sleep(Duration::from_millis(100));
        server.write_all(b"RED").unwrap();
        std::thread::sleep(Duration::from_millis(100));
        server.write_all(b"GREEN").unwrap();

        assert_eq!(collect_colors(&rx, 2), vec![Color::Red, Color::Green]);
        assert_eq!(connector.state(), ConnectionState::Connected);
    }

    #[test]
    fn read_timeout_is_not_an_error() {
        let (connector, rx, mut server) = connected_pair();

        // Several read-timeout windows pass with no data.
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(connector.state(), ConnectionState::Connected);
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Timeout)
        );

        // The loop is still alive and keeps forwarding afterwards.
        server.write_all(b"BLUE").unwrap();
        assert_eq!(collect_colors(&rx, 1), vec![Color::Blue]);
        assert_eq!(connector.state(), ConnectionState::Connected);
    }

    #[test]
    fn peer_close_surfaces_as_failed() {
        let (mut connector, rx, server) = connected_pair();

        drop(server);

        let failed = next_state_change(&rx);
        assert!(matches!(failed, ConnectionState::Failed(_)));
        assert!(matches!(connector.state(), ConnectionState::Failed(_)));

        // The presentation layer reacts to the notification by
        // disconnecting, which settles everything back to Idle.
        connector.disconnect();
        assert_eq!(connector.state(), ConnectionState::Idle);
        assert_eq!(connector.motor_state(), MotorState::Stopped);
    }

    #[test]
    fn send_failure_surfaces_as_failed_then_settles_idle() {
        let (mut connector, rx, server) = connected_pair();
        drop(server);

        // Writes start failing once the peer reset propagates.
        for _ in 0..50 {
            connector.send_command(Command::StartMotor);
            if connector.state() != ConnectionState::Connected {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        // Either the write failure or the receive thread reported the
        // loss; a Failed notification went out either way.
        let mut saw_failed = false;
        while let Ok(notification) = rx.recv_timeout(Duration::from_millis(200)) {
            if matches!(
                notification,
                Notification::StateChanged(ConnectionState::Failed(_))
            ) {
                saw_failed = true;
                break;
            }
        }
        assert!(saw_failed);

        connector.disconnect();
        assert_eq!(connector.state(), ConnectionState::Idle);
        assert_eq!(connector.motor_state(), MotorState::Stopped);
    }

    #[test]
    fn stop_sends_stop_token_and_ends_session() {
        let (mut connector, rx, mut server) = connected_pair();

        connector.stop();
        assert_eq!(connector.state(), ConnectionState::Idle);
        assert_eq!(connector.motor_state(), MotorState::Stopped);

        // The peer sees exactly one STOP and then end-of-stream.
        read_token(&mut server, "STOP");
        let mut rest = Vec::new();
        server.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());

        // SessionEnded is the final notification.
        let mut ended = false;
        while let Ok(notification) = rx.recv_timeout(Duration::from_millis(500)) {
            ended = notification == Notification::SessionEnded;
        }
        assert!(ended);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut connector, _rx, _server) = connected_pair();

        connector.disconnect();
        assert_eq!(connector.state(), ConnectionState::Idle);
        connector.disconnect();
        assert_eq!(connector.state(), ConnectionState::Idle);

        // Also harmless with no session at all.
        let (mut fresh, _rx) = Connector::new(test_config());
        fresh.disconnect();
        assert_eq!(fresh.state(), ConnectionState::Idle);
    }

    #[test]
    fn local_disconnect_is_not_reported_as_failure() {
        let (mut connector, rx, _server) = connected_pair();

        connector.disconnect();
        assert_eq!(next_state_change(&rx), ConnectionState::Idle);

        // The receive thread saw its read fail, but stays quiet: no
        // Failed notification follows an intentional close.
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(300)),
            Err(RecvTimeoutError::Timeout)
        );
    }
}
