//! Configuration loading for the Varna console

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// Network connection settings
#[derive(Clone, Debug, Deserialize)]
pub struct ConnectionConfig {
    /// Robot IP address (default: the robot's link-local address)
    #[serde(default = "default_robot_ip")]
    pub robot_ip: String,

    /// TCP port number (default: 12345)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect timeout in milliseconds (default: 5000)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Telemetry read timeout in milliseconds (default: 5000)
    ///
    /// A timeout only wakes the receive loop to check for shutdown;
    /// it is never treated as a connection failure.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

// Default value functions
fn default_robot_ip() -> String {
    "169.254.215.169".to_string()
}
fn default_port() -> u16 {
    12345
}
fn default_connect_timeout() -> u64 {
    5000
}
fn default_read_timeout() -> u64 {
    5000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            robot_ip: default_robot_ip(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::ConsoleError::Config(format!("Failed to read config file: {}", e)))?;
        let config: ConsoleConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = ConsoleConfig::default();
        assert_eq!(config.connection.robot_ip, "169.254.215.169");
        assert_eq!(config.connection.port, 12345);
        assert_eq!(config.connection.connect_timeout_ms, 5000);
        assert_eq!(config.connection.read_timeout_ms, 5000);
    }

    #[test]
    fn parses_overrides() {
        let toml_content = r#"
[connection]
robot_ip = "192.168.1.42"
port = 4242
connect_timeout_ms = 1000
"#;
        let config: ConsoleConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.connection.robot_ip, "192.168.1.42");
        assert_eq!(config.connection.port, 4242);
        assert_eq!(config.connection.connect_timeout_ms, 1000);
        // Unspecified fields keep their defaults
        assert_eq!(config.connection.read_timeout_ms, 5000);
    }
}
