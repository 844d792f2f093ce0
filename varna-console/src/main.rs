//! Varna operator console
//!
//! Line-oriented front end for the robot link: `connect` opens the
//! session, `motor` toggles the wheel motor, `stop` ends the run.
//! Detected colors and state changes stream in as status lines.
//!
//! The front end owns its own loop and only ever touches display
//! state here: the connector's receive thread hands updates over
//! through the notification channel and this loop applies them in
//! arrival order.

mod config;
mod connector;
mod error;
mod state;

use crate::config::ConsoleConfig;
use crate::connector::{Connector, Notification};
use crate::state::{ConnectionState, MotorState};
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;
use std::{env, process, thread};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `varna-console <path>` (positional)
/// - `varna-console --config <path>` (flag-based)
/// - `varna-console -c <path>` (short flag)
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

/// Feed stdin lines to the main loop without blocking it.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            // End of input counts as a stop request.
            let _ = tx.send("stop".to_string());
        })
        .expect("Failed to spawn stdin reader");
    rx
}

fn print_status(line: &str) {
    println!("[status] {}", line);
}

fn apply_notification(connector: &mut Connector, notification: Notification) -> bool {
    match notification {
        Notification::ColorDetected(color) => {
            print_status(&format!("Detected color: {}", color.token()));
        }
        Notification::StateChanged(state) => {
            print_status(&format!("Connection {}", state));
            // A failure reported by the receive path settles the
            // session back to Idle once acknowledged here.
            if matches!(state, ConnectionState::Failed(_)) {
                connector.disconnect();
            }
        }
        Notification::SessionEnded => {
            print_status("Program terminated");
            return false;
        }
    }
    true
}

fn handle_line(connector: &mut Connector, config: &ConsoleConfig, line: &str) {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("connect") => {
            let host = parts
                .next()
                .map(str::to_string)
                .unwrap_or_else(|| config.connection.robot_ip.clone());
            print_status("Connecting...");
            match connector.connect(&host, config.connection.port) {
                ConnectionState::Connected => print_status("Program started"),
                state => print_status(&format!("Connection {}", state)),
            }
        }
        Some("motor") => {
            connector.toggle_motor();
            match connector.motor_state() {
                MotorState::Running => print_status("Motors started"),
                MotorState::Stopped => print_status("Motors stopped"),
            }
        }
        Some("stop") | Some("quit") | Some("exit") => {
            connector.stop();
        }
        Some(other) => {
            print_status(&format!(
                "Unknown command '{}' (try: connect [host] | motor | stop)",
                other
            ));
        }
        None => {}
    }
}

fn main() {
    let config = match parse_config_path() {
        Some(path) => match ConsoleConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => ConsoleConfig::default(),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Varna console - robot at {}:{}", config.connection.robot_ip, config.connection.port);
    println!("Commands: connect [host] | motor | stop");
    print_status("Waiting for connection...");

    let (mut connector, notifications) = Connector::new(config.connection.clone());
    let lines = spawn_stdin_reader();

    'outer: loop {
        // Apply pending updates from the receive path first so status
        // lines come out in arrival order.
        loop {
            match notifications.try_recv() {
                Ok(notification) => {
                    if !apply_notification(&mut connector, notification) {
                        break 'outer;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'outer,
            }
        }

        match lines.try_recv() {
            Ok(line) => handle_line(&mut connector, &config, line.trim()),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                connector.stop();
            }
        }

        thread::sleep(Duration::from_millis(50));
    }

    log::info!("Console stopped");
}
