//! Configuration for the VarnaIO daemon
//!
//! Loads configuration from a TOML file. Defaults match the reference
//! deployment: port 12345, motor speed 200, 1000 ms poll interval.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub motor: MotorConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// TCP port the daemon listens on (default: 12345)
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Wheel motor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotorConfig {
    /// Run speed in deg/s handed to the motor driver (default: 200)
    #[serde(default = "default_motor_speed")]
    pub speed: i32,
}

/// Color sensor polling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorConfig {
    /// Pause between poll cycles in milliseconds (default: 1000)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    12345
}
fn default_motor_speed() -> i32 {
    200
}
fn default_poll_interval() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            speed: default_motor_speed(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            motor: MotorConfig::default(),
            sensor: SensorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
