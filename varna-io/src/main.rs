//! VarnaIO - color-telemetry daemon for the Varna robot
//!
//! Binds a TCP listener, waits for the operator console to connect,
//! then streams detected colors and executes motor commands until the
//! console disconnects. Exactly one session is serviced per run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use std::{env, process};
use varna_io::config::AppConfig;
use varna_io::drivers::{ColorSensor, Motor, SimColorSensor, SimMotor};
use varna_io::error::Result;
use varna_io::server::DeviceServer;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `varna-io <path>` (positional)
/// - `varna-io --config <path>` (flag-based)
/// - `varna-io -c <path>` (short flag)
///
/// Returns `None` when no path is given; defaults apply.
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

/// Build the hardware drivers.
///
/// The EV3 bindings live out of tree; this build wires in the
/// simulated drivers so the daemon can run against the console on any
/// host.
fn create_drivers(config: &AppConfig) -> (Box<dyn ColorSensor>, Box<dyn Motor>) {
    log::info!("Motor speed: {} deg/s", config.motor.speed);
    (
        Box::new(SimColorSensor::new()),
        Box::new(SimMotor::new(config.motor.speed)),
    )
}

fn run() -> Result<()> {
    let config = match parse_config_path() {
        Some(path) => {
            let config = AppConfig::from_file(&path)?;
            println!("Using config: {}", path);
            config
        }
        None => AppConfig::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("VarnaIO starting...");

    let (mut sensor, mut motor) = create_drivers(&config);

    // Ensure the motor is stopped before the session starts
    motor.set_motor(false)?;

    // Ctrl-C ends the poll loop at the next iteration
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| varna_io::Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let server = DeviceServer::new(
        config.server.port,
        Duration::from_millis(config.sensor.poll_interval_ms),
    );
    server.run(sensor.as_mut(), motor.as_mut(), &running)?;

    log::info!("VarnaIO stopped");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
