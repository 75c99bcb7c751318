// src/types.rs
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drivers::TelemetryError;

// 会话状态
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SessionState {
    Idle,
    Active,
}

// 后台读线程发给会话的消息
#[derive(Clone, Debug)]
pub enum TransportEvent {
    Data(Vec<u8>),  // 一次读取到的原始字节
    Failed(String), // 非超时的 I/O 错误，线程随后退出
}

/// One reading pulled out of the accumulator: wall-clock seconds plus payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    pub timestamp: f64,
    pub value: f64,
}

/// Stored point, relative to the session's time origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub elapsed: f64,
    pub value: f64,
}

impl Sample {
    /// Two-decimal `(time, signal)` labels for a live readout.
    pub fn readout(&self) -> (String, String) {
        (format!("{:.2}", self.elapsed), format!("{:.2}", self.value))
    }
}

/// Axis ranges a renderer should apply for the current store contents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

// 支持的波特率（固定集合）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B1200,
    B2400,
    B4800,
    #[default]
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    pub const ALL: [BaudRate; 8] = [
        BaudRate::B1200,
        BaudRate::B2400,
        BaudRate::B4800,
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B1200 => 1200,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }

    /// Labels in the order a picker would list them.
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|b| b.to_string()).collect()
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = TelemetryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.as_u32() == value)
            .ok_or_else(|| TelemetryError::InvalidBaudRate(value.to_string()))
    }
}

impl From<BaudRate> for u32 {
    fn from(value: BaudRate) -> Self {
        value.as_u32()
    }
}

impl FromStr for BaudRate {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate: u32 = s
            .trim()
            .parse()
            .map_err(|_| TelemetryError::InvalidBaudRate(s.to_string()))?;
        BaudRate::try_from(rate)
    }
}

/// Everything needed to open the transport. Framing is always 8-N-1.
#[derive(Clone, Debug, PartialEq)]
pub struct PortSettings {
    pub port: String,
    pub baud: BaudRate,
    pub read_timeout: Duration,
}

impl PortSettings {
    pub fn new(port: impl Into<String>, baud: BaudRate) -> Self {
        Self {
            port: port.into(),
            baud,
            read_timeout: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_rate_accepts_fixed_set_only() {
        assert_eq!("115200".parse::<BaudRate>().unwrap(), BaudRate::B115200);
        assert_eq!(BaudRate::try_from(1200).unwrap(), BaudRate::B1200);
        assert!(matches!(
            "14400".parse::<BaudRate>(),
            Err(TelemetryError::InvalidBaudRate(_))
        ));
        assert!("fast".parse::<BaudRate>().is_err());
        assert_eq!(BaudRate::labels()[0], "1200");
        assert_eq!(BaudRate::labels().len(), 8);
        assert_eq!(BaudRate::default(), BaudRate::B9600);
    }

    #[test]
    fn baud_rate_serde_uses_plain_numbers() {
        let rate: BaudRate = serde_json::from_str("57600").unwrap();
        assert_eq!(rate, BaudRate::B57600);
        assert_eq!(serde_json::to_string(&rate).unwrap(), "57600");
        assert!(serde_json::from_str::<BaudRate>("300").is_err());
    }

    #[test]
    fn readout_uses_two_decimals() {
        let s = Sample {
            elapsed: 3.0,
            value: 5.1234,
        };
        let (t, v) = s.readout();
        assert_eq!(t, "3.00");
        assert_eq!(v, "5.12");
    }
}
