//! CI-V Monitor
//!
//! Decodes CI-V traffic from a serial port, or from hex lines on stdin, and
//! keeps the per-band memory an accessory controller would keep.
//!
//! ```text
//! civ-monitor --port /dev/ttyUSB0 --baud 19200 --dump
//! echo "FE FE E0 A4 11 10 FD" | civ-monitor
//! ```

mod error;
mod framer;
mod monitor;
mod settings;
mod source;

use std::process::ExitCode;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use error::MonitorError;
use monitor::Monitor;
use settings::Settings;

/// Command line overrides
#[derive(Debug, Default, PartialEq)]
struct Args {
    port: Option<String>,
    baud_rate: Option<u32>,
    list_ports: bool,
    dump: bool,
    save_settings: bool,
}

const USAGE: &str =
    "civ-monitor [--port PATH] [--baud RATE] [--dump] [--list-ports] [--save-settings]";

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, MonitorError> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" | "-p" => {
                let port = args
                    .next()
                    .ok_or_else(|| MonitorError::Usage("--port needs a path".to_string()))?;
                parsed.port = Some(port);
            }
            "--baud" | "-b" => {
                let rate = args
                    .next()
                    .and_then(|r| r.parse().ok())
                    .ok_or_else(|| MonitorError::Usage("--baud needs a number".to_string()))?;
                parsed.baud_rate = Some(rate);
            }
            "--list-ports" => parsed.list_ports = true,
            "--dump" => parsed.dump = true,
            "--save-settings" => parsed.save_settings = true,
            other => return Err(MonitorError::Usage(format!("unknown argument {other}\n{USAGE}"))),
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civ_monitor=info,civ_decoder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), MonitorError> {
    let args = parse_args(std::env::args().skip(1))?;

    if args.list_ports {
        for port in source::list_ports()? {
            println!("{port}");
        }
        return Ok(());
    }

    let mut settings = Settings::load();
    if let Some(port) = args.port {
        settings.port = Some(port);
    }
    if let Some(rate) = args.baud_rate {
        settings.baud_rate = rate;
    }
    if args.dump {
        settings.dump_on_exit = true;
    }
    if args.save_settings {
        settings.save()?;
        info!("settings saved");
    }

    info!(
        "Starting CI-V monitor for {} ({} Hz scale)",
        settings.decoder.model.name(),
        settings.decoder.frequency_scale
    );

    let mut monitor = Monitor::new(&settings);

    let result = tokio::select! {
        r = pump(&mut monitor, &settings) => r,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    };

    if settings.dump_on_exit {
        println!("{}", monitor.dump_json()?);
    }

    result
}

/// Feed the monitor until the source ends
async fn pump(monitor: &mut Monitor, settings: &Settings) -> Result<(), MonitorError> {
    match &settings.port {
        Some(port) => {
            info!("Opening {} at {} baud", port, settings.baud_rate);
            let mut stream = tokio_serial::new(port, settings.baud_rate)
                .timeout(Duration::from_millis(100))
                .open_native_async()?;

            let mut buffer = vec![0u8; 1024];
            loop {
                let n = stream.read(&mut buffer).await?;
                if n == 0 {
                    info!("{port} closed");
                    return Ok(());
                }
                monitor.feed(&buffer[..n]);
            }
        }
        None => {
            info!("Reading hex lines from stdin");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                match source::parse_hex_line(&line) {
                    Ok(bytes) => {
                        monitor.feed(&bytes);
                    }
                    Err(e) => warn!("skipping line: {e}"),
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, MonitorError> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_port_and_baud() {
        let parsed = args(&["--port", "/dev/ttyUSB0", "-b", "115200", "--dump"]).unwrap();
        assert_eq!(parsed.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(parsed.baud_rate, Some(115200));
        assert!(parsed.dump);
        assert!(!parsed.list_ports);
    }

    #[test]
    fn test_bad_args() {
        assert!(matches!(args(&["--port"]), Err(MonitorError::Usage(_))));
        assert!(matches!(args(&["--baud", "fast"]), Err(MonitorError::Usage(_))));
        assert!(matches!(args(&["--verbose"]), Err(MonitorError::Usage(_))));
    }
}
