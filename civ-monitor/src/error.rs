//! Monitor errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input line is not a sequence of hex byte pairs
    #[error("invalid hex input: {0}")]
    InvalidHex(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("could not determine settings path")]
    NoConfigDir,
}
