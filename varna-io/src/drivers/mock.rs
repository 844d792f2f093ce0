//! Mock drivers for testing

use super::{ColorSensor, Motor};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use varna_proto::Color;

/// One scripted sensor sample
enum Sample {
    /// A mapped color, or `None` for a surface outside the color set
    Reading(Option<Color>),
    /// Sensor fault
    Fault(String),
}

/// Mock color sensor replaying a scripted sample sequence.
///
/// An exhausted script keeps returning `None` so a test can let the
/// loop run past the interesting samples without extra writes.
#[derive(Clone)]
pub struct MockColorSensor {
    samples: Arc<Mutex<VecDeque<Sample>>>,
}

impl MockColorSensor {
    /// Create a sensor with an empty script
    pub fn new() -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queue a mapped color sample
    pub fn push_color(&self, color: Color) {
        let mut samples = self.samples.lock().unwrap();
        samples.push_back(Sample::Reading(Some(color)));
    }

    /// Queue a sample outside the reportable color set
    pub fn push_unmapped(&self) {
        let mut samples = self.samples.lock().unwrap();
        samples.push_back(Sample::Reading(None));
    }

    /// Queue a sensor fault
    pub fn push_fault(&self, message: &str) {
        let mut samples = self.samples.lock().unwrap();
        samples.push_back(Sample::Fault(message.to_string()));
    }
}

impl Default for MockColorSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSensor for MockColorSensor {
    fn read_color(&mut self) -> Result<Option<Color>> {
        let mut samples = self.samples.lock().unwrap();
        match samples.pop_front() {
            Some(Sample::Reading(reading)) => Ok(reading),
            Some(Sample::Fault(message)) => Err(Error::Sensor(message)),
            None => Ok(None),
        }
    }
}

/// Mock motor recording every `set_motor` call
#[derive(Clone)]
pub struct MockMotor {
    calls: Arc<Mutex<Vec<bool>>>,
}

impl MockMotor {
    /// Create a new mock motor
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All `set_motor` arguments in call order
    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl Motor for MockMotor {
    fn set_motor(&mut self, running: bool) -> Result<()> {
        self.calls.lock().unwrap().push(running);
        Ok(())
    }
}
