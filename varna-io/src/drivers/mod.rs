//! Driver traits for the robot hardware
//!
//! The server loop treats the color sensor and the wheel motor as
//! external collaborators behind these two traits. Hardware bindings
//! live outside this crate; the mocks here back the tests.

use crate::error::Result;
use varna_proto::Color;

mod mock;
mod sim;

pub use mock::{MockColorSensor, MockMotor};
pub use sim::{SimColorSensor, SimMotor};

/// Color sensor driver trait
pub trait ColorSensor: Send {
    /// Sample the sensor.
    ///
    /// Returns `None` when the surface under the sensor does not map
    /// to one of the reportable colors; the server skips the telemetry
    /// write for that cycle and keeps polling.
    fn read_color(&mut self) -> Result<Option<Color>>;
}

/// Wheel motor driver trait
pub trait Motor: Send {
    /// Start or stop the motor.
    ///
    /// Repeated calls with the same value are allowed and must be
    /// idempotent; the console does not confirm motor state.
    fn set_motor(&mut self, running: bool) -> Result<()>;
}
