// src/drivers/mod.rs
// 遥测数据链路：缓冲 -> 解析 -> 存储
pub mod buffer;
pub mod error;
pub mod parser;
pub mod source;
pub mod store;
// 公开导出这些模块里的结构体，方便外部调用
pub use buffer::{escape_bytes, LineAccumulator};
pub use error::TelemetryError;
pub use parser::{Clock, RecordFormat, RecordParser, SystemClock};
pub use source::{ManualOpener, ManualPort, PortHandle, PortOpener, SerialPortOpener};
pub use store::{chart_bounds, SampleStore};
