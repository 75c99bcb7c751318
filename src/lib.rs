//! Serial telemetry ingestion: buffers `token,value,` readings from a
//! microcontroller, turns them into time-relative samples, and exports CSV.
pub mod config;
pub mod drivers;
pub mod engine;
pub mod recorder;
pub mod session;
pub mod types;

pub use config::SessionConfig;
pub use drivers::{RecordFormat, SampleStore, SerialPortOpener, TelemetryError};
pub use session::{SampleSink, SessionController};
pub use types::{BaudRate, ChartBounds, PortSettings, Sample, SessionState};
