//! Single-session poll/dispatch server
//!
//! # Session Lifecycle
//!
//! ```text
//! 1. Bind the listener on the configured port
//! 2. Block on accept until the console connects
//! 3. Poll loop: read sensor -> report color -> execute one command -> sleep
//! 4. On any exit: stop the motor, close the session, close the listener
//! ```
//!
//! The daemon services exactly one session for its entire lifetime.
//! The accept step is never re-entered, so a second console attempting
//! to connect sits in the transport backlog and is never serviced.
//!
//! The command read blocks with no timeout: if the console stays
//! silent the loop stalls until it either sends a command or closes
//! the connection. This mirrors the reference deployment and is an
//! accepted limitation, not a fault path.

use crate::drivers::{ColorSensor, Motor};
use crate::error::Result;
use crate::transport::{TcpTransport, Transport};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use varna_proto::{Command, RECV_BUFFER_SIZE};

/// Single-session server servicing one console connection
pub struct DeviceServer {
    port: u16,
    poll_interval: Duration,
}

impl DeviceServer {
    /// Create a server for the given listen port and poll interval
    pub fn new(port: u16, poll_interval: Duration) -> Self {
        Self {
            port,
            poll_interval,
        }
    }

    /// Accept one console connection and service it until the session
    /// ends, then release the listener.
    pub fn run(
        &self,
        sensor: &mut dyn ColorSensor,
        motor: &mut dyn Motor,
        running: &Arc<AtomicBool>,
    ) -> Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", self.port))?;
        log::info!("Listening on port {}", self.port);
        log::info!("Waiting for client...");

        let (stream, addr) = listener.accept()?;
        log::info!("Client connected: {}", addr);

        let result = self.serve(TcpTransport::new(stream), sensor, motor, running);

        // Listener released here; the daemon never accepts a second
        // session.
        drop(listener);
        log::info!("Server stopped");
        result
    }

    /// Service one session over the given transport.
    ///
    /// The motor stop and session release run on every exit path,
    /// including sensor, write, and read failures.
    pub fn serve<T: Transport>(
        &self,
        mut transport: T,
        sensor: &mut dyn ColorSensor,
        motor: &mut dyn Motor,
        running: &Arc<AtomicBool>,
    ) -> Result<()> {
        let result = self.session_loop(&mut transport, sensor, motor, running);

        if let Err(e) = motor.set_motor(false) {
            log::warn!("Failed to stop motor during cleanup: {}", e);
        }
        drop(transport);
        log::info!("Session closed");

        result
    }

    /// The poll/dispatch cycle
    fn session_loop<T: Transport>(
        &self,
        transport: &mut T,
        sensor: &mut dyn ColorSensor,
        motor: &mut dyn Motor,
        running: &Arc<AtomicBool>,
    ) -> Result<()> {
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        while running.load(Ordering::Relaxed) {
            // Report the current color, skipping samples that do not
            // map to the reportable set. A write failure ends the
            // session.
            if let Some(color) = sensor.read_color()? {
                transport.write(color.token().as_bytes())?;
                transport.flush()?;
                log::info!("Detected {}", color.token());
            }

            // Blocking read for one command token. 0 bytes means the
            // console closed the connection.
            let n = transport.read(&mut buf)?;
            if n == 0 {
                log::info!("Client disconnected");
                break;
            }

            match Command::from_bytes(&buf[..n]) {
                Some(Command::StartMotor) => {
                    motor.set_motor(true)?;
                    log::info!("Motors started");
                }
                Some(Command::StopMotor) => {
                    motor.set_motor(false)?;
                    log::info!("Motors stopped");
                }
                Some(cmd) => {
                    // START/STOP mark the session on the console side
                    // only; session end is signalled by the read
                    // failing, not by token content.
                    log::debug!("Ignoring session marker {}", cmd.token());
                }
                None => {
                    log::debug!("Ignoring unrecognized token ({} bytes)", n);
                }
            }

            std::thread::sleep(self.poll_interval);
        }

        Ok(())
    }
}
