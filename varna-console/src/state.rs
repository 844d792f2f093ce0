//! Connection and motor state surfaced to the presentation layer

use std::fmt;

/// Connection lifecycle of the session link.
///
/// Owned by the [`Connector`](crate::connector::Connector); the
/// presentation layer only ever sees snapshots and state-change
/// notifications, never a mutable reference.
///
/// Transitions: `Idle -> Connecting -> Connected -> (Failed | Idle)`.
/// `Failed` persists until a fresh `connect`; there is no automatic
/// retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session, ready to connect
    Idle,
    /// Connect attempt in flight
    Connecting,
    /// Session established, telemetry flowing
    Connected,
    /// Session lost or never established; carries the error text for
    /// the status display
    Failed(String),
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Motor state as tracked by the console.
///
/// This is display state only: the console flips it locally on each
/// toggle and the protocol carries no acknowledgement, so it can
/// drift from the robot's ground truth if a command is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running,
}

impl MotorState {
    /// The state a toggle moves to
    pub fn toggled(self) -> Self {
        match self {
            MotorState::Stopped => MotorState::Running,
            MotorState::Running => MotorState::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_alternates() {
        let mut motor = MotorState::Stopped;
        let mut seen = Vec::new();
        for _ in 0..4 {
            motor = motor.toggled();
            seen.push(motor);
        }
        assert_eq!(
            seen,
            vec![
                MotorState::Running,
                MotorState::Stopped,
                MotorState::Running,
                MotorState::Stopped,
            ]
        );
    }

    #[test]
    fn failed_state_carries_error_text() {
        let state = ConnectionState::Failed("connection refused".to_string());
        assert_eq!(state.to_string(), "failed: connection refused");
    }
}
