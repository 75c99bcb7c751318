use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to open serial port {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("session is already active; stop it before starting again")]
    AlreadyActive,
    #[error("unsupported baud rate {0:?}")]
    InvalidBaudRate(String),
    #[error("payload field {field:?} is not a finite number")]
    Parse { field: String },
    #[error("serial transport failed: {0}")]
    Transport(String),
    #[error("failed to export samples to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}
impl From<serde_json::Error> for TelemetryError {
    fn from(value: serde_json::Error) -> Self {
        TelemetryError::Config(value.to_string())
    }
}
