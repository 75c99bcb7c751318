use std::time::{SystemTime, UNIX_EPOCH};
use crate::drivers::buffer::LineAccumulator;
use crate::drivers::error::TelemetryError;
use crate::types::Record;
/// Source of the timestamp attached to each extracted record.
pub trait Clock {
    fn now_secs(&self) -> f64;
}
/// Wall clock truncated to whole seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as f64
    }
}
/// Framing of the telemetry stream.
///
/// The default targets a transmitter that sends a spurious token before every
/// reading: the payload is field 1, and a record only counts once a third
/// field has started. Field 0 and anything after the second delimiter are
/// discarded. Plain `v1,v2,` frames lose every other reading under this
/// rule; set `value_field` to 0 for those.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordFormat {
    pub delimiter: u8,
    pub value_field: usize,
}
impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            value_field: 1,
        }
    }
}
impl RecordFormat {
    /// Field count at which the payload field is known to be complete.
    pub fn fields_required(&self) -> usize {
        self.value_field.saturating_add(2)
    }
}
pub struct RecordParser {
    format: RecordFormat,
    clock: Box<dyn Clock + Send>,
}
impl RecordParser {
    pub fn new(format: RecordFormat) -> Self {
        Self::with_clock(format, SystemClock)
    }
    pub fn with_clock(format: RecordFormat, clock: impl Clock + Send + 'static) -> Self {
        Self {
            format,
            clock: Box::new(clock),
        }
    }
    pub fn format(&self) -> RecordFormat {
        self.format
    }
    /// Pulls one record out of `buffer` once enough fields have arrived.
    ///
    /// Returns `Ok(None)` and leaves the buffer alone while it is short.
    /// Otherwise the buffer is cleared whether or not the payload parses.
    pub fn try_extract(
        &self,
        buffer: &mut LineAccumulator,
    ) -> Result<Option<Record>, TelemetryError> {
        let delimiter = self.format.delimiter;
        let fields: Vec<&[u8]> = buffer.as_bytes().split(|&b| b == delimiter).collect();
        if fields.len() < self.format.fields_required() {
            return Ok(None);
        }
        let parsed = parse_payload(fields[self.format.value_field]);
        buffer.clear();
        let value = parsed?;
        Ok(Some(Record {
            timestamp: self.clock.now_secs(),
            value,
        }))
    }
}
fn parse_payload(field: &[u8]) -> Result<f64, TelemetryError> {
    let invalid = || TelemetryError::Parse {
        field: String::from_utf8_lossy(field).into_owned(),
    };
    let text = std::str::from_utf8(field).map_err(|_| invalid())?;
    let value: f64 = text.trim().parse().map_err(|_| invalid())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    /// Clock returning a preset value.
    struct FixedClock(pub f64);
    impl Clock for FixedClock {
        fn now_secs(&self) -> f64 {
            self.0
        }
    }
    fn buffer_with(bytes: &[u8]) -> LineAccumulator {
        let mut acc = LineAccumulator::new();
        acc.append(bytes);
        acc
    }
    #[test]
    fn short_buffers_yield_nothing_and_stay_intact() {
        let parser = RecordParser::with_clock(RecordFormat::default(), FixedClock(1.0));
        let inputs: [&[u8]; 3] = [b"", b"3.14", b"3.14,5.0"];
        for input in inputs {
            let mut acc = buffer_with(input);
            assert_eq!(parser.try_extract(&mut acc).unwrap(), None);
            assert_eq!(acc.as_bytes(), input);
        }
    }
    #[test]
    fn second_field_is_the_payload() {
        let parser = RecordParser::with_clock(RecordFormat::default(), FixedClock(1700.0));
        let mut acc = buffer_with(b"bad,5.12,ignored");
        let record = parser.try_extract(&mut acc).unwrap().unwrap();
        assert_eq!(record.value, 5.12);
        assert_eq!(record.timestamp, 1700.0);
        assert!(acc.is_empty());
    }
    #[test]
    fn payload_whitespace_is_trimmed() {
        let parser = RecordParser::with_clock(RecordFormat::default(), FixedClock(0.0));
        let mut acc = buffer_with(b"\r\n, 42.5\r\n,");
        let record = parser.try_extract(&mut acc).unwrap().unwrap();
        assert_eq!(record.value, 42.5);
    }
    #[test]
    fn malformed_payload_clears_buffer_and_errors() {
        let parser = RecordParser::with_clock(RecordFormat::default(), FixedClock(0.0));
        let inputs: [&[u8]; 4] = [b"a,abc,", b"a,,", b"a,NaN,", b"a,\xFF\xFE,"];
        for input in inputs {
            let mut acc = buffer_with(input);
            let err = parser.try_extract(&mut acc).unwrap_err();
            assert!(matches!(err, TelemetryError::Parse { .. }));
            assert!(acc.is_empty());
        }
    }
    #[test]
    fn value_field_zero_accepts_plain_frames() {
        let format = RecordFormat {
            delimiter: b',',
            value_field: 0,
        };
        assert_eq!(format.fields_required(), 2);
        let parser = RecordParser::with_clock(format, FixedClock(0.0));
        let mut acc = buffer_with(b"7.25");
        assert_eq!(parser.try_extract(&mut acc).unwrap(), None);
        acc.append(b",");
        assert_eq!(parser.try_extract(&mut acc).unwrap().unwrap().value, 7.25);
    }
    #[test]
    fn huge_value_field_never_completes() {
        let format = RecordFormat {
            delimiter: b',',
            value_field: usize::MAX,
        };
        assert_eq!(format.fields_required(), usize::MAX);
        let parser = RecordParser::with_clock(format, FixedClock(0.0));
        let mut acc = buffer_with(b"x,1,2,3,");
        assert_eq!(parser.try_extract(&mut acc).unwrap(), None);
        assert_eq!(acc.as_bytes(), b"x,1,2,3,");
    }
    #[test]
    fn custom_delimiter_is_honoured() {
        let format = RecordFormat {
            delimiter: b';',
            value_field: 1,
        };
        let parser = RecordParser::with_clock(format, FixedClock(0.0));
        let mut acc = buffer_with(b"x,1;2.5;");
        assert_eq!(parser.try_extract(&mut acc).unwrap().unwrap().value, 2.5);
    }
    #[test]
    fn system_clock_reports_whole_seconds() {
        let now = SystemClock.now_secs();
        assert!(now > 0.0);
        assert_eq!(now.fract(), 0.0);
    }
}
