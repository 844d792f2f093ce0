//! VarnaIO - color-telemetry daemon for the Varna robot
//!
//! This library provides the components of the robot-side peer: driver
//! traits for the color sensor and wheel motor, a transport
//! abstraction over the session socket, and the single-session
//! poll/dispatch server loop.
//!
//! The daemon accepts exactly one console connection for its entire
//! lifetime. Each poll cycle it samples the sensor, reports the
//! detected color as a wire token, executes one received command, and
//! sleeps for the configured interval.

pub mod config;
pub mod drivers;
pub mod error;
pub mod server;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use server::DeviceServer;
