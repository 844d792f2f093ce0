//! Simulated drivers for hardware-free runs
//!
//! Lets the daemon run against the console on a development host with
//! no EV3 attached: the sensor cycles through the reportable colors
//! with an occasional unmapped sample, and the motor only tracks
//! state.

use super::{ColorSensor, Motor};
use crate::error::Result;
use varna_proto::Color;

/// Simulated color sensor cycling through the reportable colors.
///
/// Every seventh sample is unmapped, exercising the skip path the
/// real sensor produces when it sees a surface outside the set.
pub struct SimColorSensor {
    tick: usize,
}

impl SimColorSensor {
    /// Create a new simulated sensor
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

impl Default for SimColorSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSensor for SimColorSensor {
    fn read_color(&mut self) -> Result<Option<Color>> {
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);

        if tick % 7 == 6 {
            return Ok(None);
        }
        Ok(Some(Color::ALL[tick % Color::ALL.len()]))
    }
}

/// Simulated motor tracking its running state
pub struct SimMotor {
    speed: i32,
    running: bool,
}

impl SimMotor {
    /// Create a simulated motor with the configured run speed
    pub fn new(speed: i32) -> Self {
        Self {
            speed,
            running: false,
        }
    }

    /// Whether the motor is currently running
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Motor for SimMotor {
    fn set_motor(&mut self, running: bool) -> Result<()> {
        if running != self.running {
            if running {
                log::debug!("Sim motor running at {} deg/s", self.speed);
            } else {
                log::debug!("Sim motor stopped");
            }
        }
        self.running = running;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_cycles_with_unmapped_gaps() {
        let mut sensor = SimColorSensor::new();
        let mut mapped = 0;
        let mut unmapped = 0;
        for _ in 0..14 {
            match sensor.read_color().unwrap() {
                Some(_) => mapped += 1,
                None => unmapped += 1,
            }
        }
        assert_eq!(mapped, 12);
        assert_eq!(unmapped, 2);
    }

    #[test]
    fn motor_tracks_state() {
        let mut motor = SimMotor::new(200);
        assert!(!motor.is_running());
        motor.set_motor(true).unwrap();
        assert!(motor.is_running());
        motor.set_motor(true).unwrap();
        assert!(motor.is_running());
        motor.set_motor(false).unwrap();
        assert!(!motor.is_running());
    }
}
