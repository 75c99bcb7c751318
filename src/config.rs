// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

use crate::drivers::{RecordFormat, TelemetryError};
use crate::types::{BaudRate, PortSettings};

/// Session file read by the binary. Only `port` is required.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub port: String,
    #[serde(default)]
    pub baud_rate: BaudRate,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_value_field")]
    pub value_field: usize,
    #[serde(default)]
    pub clear_on_start: bool,
    #[serde(default)]
    pub export_path: Option<PathBuf>,
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

/// Highest payload index a session file may ask for.
pub const MAX_VALUE_FIELD: usize = 64;

fn default_read_timeout_ms() -> u64 {
    100
}

fn default_delimiter() -> char {
    ','
}

fn default_value_field() -> usize {
    1
}

impl SessionConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TelemetryError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, TelemetryError> {
        let config: SessionConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), TelemetryError> {
        if self.port.trim().is_empty() {
            return Err(TelemetryError::Config("port must not be empty".into()));
        }
        if !self.delimiter.is_ascii() {
            return Err(TelemetryError::Config(format!(
                "delimiter {:?} must be a single ASCII character",
                self.delimiter
            )));
        }
        if self.value_field > MAX_VALUE_FIELD {
            return Err(TelemetryError::Config(format!(
                "value_field {} exceeds the maximum of {MAX_VALUE_FIELD}",
                self.value_field
            )));
        }
        // 0 会让串口变成非阻塞读取，读线程空转
        if self.read_timeout_ms == 0 {
            return Err(TelemetryError::Config(
                "read_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn port_settings(&self) -> PortSettings {
        PortSettings {
            port: self.port.clone(),
            baud: self.baud_rate,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }

    pub fn record_format(&self) -> RecordFormat {
        RecordFormat {
            // validate() 已保证是 ASCII
            delimiter: self.delimiter as u8,
            value_field: self.value_field,
        }
    }

    pub fn log_config(&self) {
        info!("📦 session config:");
        info!("  serial port    : {}", self.port);
        info!("  baud rate      : {}", self.baud_rate);
        info!("  read timeout   : {} ms", self.read_timeout_ms);
        info!("  delimiter      : {:?}", self.delimiter);
        info!("  value field    : {}", self.value_field);
        info!("  clear on start : {}", self.clear_on_start);
        if let Some(path) = &self.export_path {
            info!("  export path    : {}", path.display());
        }
        if let Some(secs) = self.duration_secs {
            info!("  duration       : {} s", secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = SessionConfig::from_json(r#"{"port": "/dev/ttyACM0"}"#).unwrap();
        assert_eq!(cfg.baud_rate, BaudRate::B9600);
        assert_eq!(cfg.record_format(), RecordFormat::default());
        let settings = cfg.port_settings();
        assert_eq!(settings.port, "/dev/ttyACM0");
        assert_eq!(settings.read_timeout, Duration::from_millis(100));
        assert!(!cfg.clear_on_start);
        assert!(cfg.export_path.is_none());
    }

    #[test]
    fn full_config_round_trips_into_library_types() {
        let cfg = SessionConfig::from_json(
            r#"{
                "port": "COM4",
                "baud_rate": 115200,
                "read_timeout_ms": 20,
                "delimiter": ";",
                "value_field": 0,
                "clear_on_start": true,
                "export_path": "out.csv",
                "duration_secs": 30
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.port_settings().baud, BaudRate::B115200);
        assert_eq!(
            cfg.record_format(),
            RecordFormat {
                delimiter: b';',
                value_field: 0
            }
        );
        assert_eq!(cfg.export_path, Some(PathBuf::from("out.csv")));
        assert_eq!(cfg.duration_secs, Some(30));
    }

    #[test]
    fn bad_values_are_config_errors() {
        for json in [
            r#"{"port": "COM4", "baud_rate": 14400}"#,
            r#"{"port": ""}"#,
            r#"{"port": "COM4", "delimiter": "é"}"#,
            r#"{"port": "COM4", "parity": "odd"}"#,
            r#"{"baud_rate": 9600}"#,
            r#"{"port": "COM4", "value_field": 18446744073709551615}"#,
            r#"{"port": "COM4", "value_field": 65}"#,
            r#"{"port": "COM4", "read_timeout_ms": 0}"#,
        ] {
            assert!(
                matches!(SessionConfig::from_json(json), Err(TelemetryError::Config(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn largest_allowed_value_field_is_accepted() {
        let cfg = SessionConfig::from_json(r#"{"port": "COM4", "value_field": 64}"#).unwrap();
        assert_eq!(cfg.record_format().fields_required(), 66);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionConfig::load_from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TelemetryError::Config(_)));
    }
}
