//! Wire vocabulary for the Varna console/robot link.
//!
//! Both peers exchange bare UTF-8 tokens over a single TCP connection:
//! the console sends command tokens, the robot streams telemetry
//! tokens. There is no length prefix and no delimiter: each logical
//! send is one transport write, and the receiver reads one token per
//! `recv` into a [`RECV_BUFFER_SIZE`] buffer. This relies on the
//! transport not coalescing or splitting payloads, which holds for the
//! low-rate traffic on a local link. It is an accepted constraint of
//! the protocol, not something either peer works around.
//!
//! # Tokens
//!
//! | Direction        | Tokens |
//! |------------------|--------|
//! | console → robot  | `START`, `STOP`, `START_MOTOR`, `STOP_MOTOR` |
//! | robot → console  | `RED`, `GREEN`, `BLUE`, `YELLOW`, `BLACK`, `WHITE` |
//!
//! Anything outside the recognized set is silently dropped by the
//! receiver: unknown commands are no-ops on the robot, unknown
//! telemetry never reaches the console display.

use serde::{Deserialize, Serialize};

/// Receive buffer size used by both peers.
///
/// Every defined token fits with ample slack; 1024 matches the recv
/// size of the reference deployment.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Control commands sent from the console to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Session start marker, sent once right after connecting.
    /// The robot's dispatcher deliberately ignores it.
    Start,
    /// Session stop marker, sent before the console closes the link.
    /// Also ignored by the dispatcher; the robot ends its session when
    /// the read side fails instead.
    Stop,
    /// Run the wheel motor at its configured speed.
    StartMotor,
    /// Halt the wheel motor.
    StopMotor,
}

impl Command {
    /// Wire token for this command.
    pub fn token(&self) -> &'static str {
        match self {
            Command::Start => "START",
            Command::Stop => "STOP",
            Command::StartMotor => "START_MOTOR",
            Command::StopMotor => "STOP_MOTOR",
        }
    }

    /// Parse a wire token. Returns `None` for anything outside the
    /// recognized set; the caller is expected to drop such tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "START" => Some(Command::Start),
            "STOP" => Some(Command::Stop),
            "START_MOTOR" => Some(Command::StartMotor),
            "STOP_MOTOR" => Some(Command::StopMotor),
            _ => None,
        }
    }

    /// Parse a raw received payload. Invalid UTF-8 counts as an
    /// unrecognized token.
    pub fn from_bytes(payload: &[u8]) -> Option<Self> {
        std::str::from_utf8(payload).ok().and_then(Self::from_token)
    }
}

/// Colors the robot's sensor can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Black,
    White,
}

impl Color {
    /// Wire token for this color.
    pub fn token(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
            Color::Yellow => "YELLOW",
            Color::Black => "BLACK",
            Color::White => "WHITE",
        }
    }

    /// Parse a wire token. Returns `None` for anything outside the
    /// recognized set.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "RED" => Some(Color::Red),
            "GREEN" => Some(Color::Green),
            "BLUE" => Some(Color::Blue),
            "YELLOW" => Some(Color::Yellow),
            "BLACK" => Some(Color::Black),
            "WHITE" => Some(Color::White),
            _ => None,
        }
    }

    /// Parse a raw received payload. Invalid UTF-8 counts as an
    /// unrecognized token.
    pub fn from_bytes(payload: &[u8]) -> Option<Self> {
        std::str::from_utf8(payload).ok().and_then(Self::from_token)
    }

    /// All reportable colors, in wire-token order.
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Black,
        Color::White,
    ];
}
