use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use crate::drivers::TelemetryError;
use crate::types::PortSettings;
/// Opened transport handed to the reader thread. Dropping it closes the port.
pub type PortHandle = Box<dyn Read + Send>;
/// Trait representing something that can open the telemetry transport.
pub trait PortOpener {
    fn open(&mut self, settings: &PortSettings) -> Result<PortHandle, TelemetryError>;
}
/// Opens real serial devices with fixed 8-N-1 framing and no flow control.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialPortOpener;
impl PortOpener for SerialPortOpener {
    fn open(&mut self, settings: &PortSettings) -> Result<PortHandle, TelemetryError> {
        let port = serialport::new(settings.port.as_str(), settings.baud.as_u32())
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|source| TelemetryError::Connection {
                port: settings.port.clone(),
                source,
            })?;
        Ok(Box::new(SerialReadHalf(port)))
    }
}
// 只读使用：从不调用 write
struct SerialReadHalf(Box<dyn SerialPort>);
impl Read for SerialReadHalf {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}
/// In-memory transport useful for tests and deterministic playback.
///
/// Each queued chunk is returned by one `read` call. An empty queue behaves
/// like an idle serial line and reports `TimedOut`, unless a failure was
/// scripted, in which case that error is returned once the chunks run out.
pub struct ManualPort {
    queue: Arc<Mutex<VecDeque<Vec<u8>>>>,
    fail_with: Option<io::ErrorKind>,
    idle_delay: Duration,
}
impl ManualPort {
    pub fn new(chunks: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(chunks.into_iter().collect())),
            fail_with: None,
            idle_delay: Duration::from_millis(1),
        }
    }
    /// Report `kind` as a hard error after the scripted chunks are consumed.
    pub fn failing_after(mut self, kind: io::ErrorKind) -> Self {
        self.fail_with = Some(kind);
        self
    }
    /// Handle for pushing more chunks while the port is being read.
    pub fn feeder(&self) -> Arc<Mutex<VecDeque<Vec<u8>>>> {
        Arc::clone(&self.queue)
    }
}
impl Read for ManualPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let next = self
            .queue
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "manual port queue poisoned"))?
            .pop_front();
        match next {
            Some(mut chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    let rest = chunk.split_off(n);
                    if let Ok(mut queue) = self.queue.lock() {
                        queue.push_front(rest);
                    }
                }
                Ok(n)
            }
            None => {
                if let Some(kind) = self.fail_with {
                    return Err(io::Error::new(kind, "scripted transport failure"));
                }
                thread::sleep(self.idle_delay);
                Err(io::Error::new(io::ErrorKind::TimedOut, "no data"))
            }
        }
    }
}
/// Opener that hands out pre-scripted `ManualPort`s, one per `open` call.
pub struct ManualOpener {
    ports: VecDeque<ManualPort>,
    opened: Vec<PortSettings>,
}
impl ManualOpener {
    pub fn new(ports: impl IntoIterator<Item = ManualPort>) -> Self {
        Self {
            ports: ports.into_iter().collect(),
            opened: Vec::new(),
        }
    }
    /// Settings of every successful `open`, oldest first.
    pub fn opened(&self) -> &[PortSettings] {
        &self.opened
    }
}
impl PortOpener for ManualOpener {
    fn open(&mut self, settings: &PortSettings) -> Result<PortHandle, TelemetryError> {
        let port = self
            .ports
            .pop_front()
            .ok_or_else(|| TelemetryError::Connection {
                port: settings.port.clone(),
                source: serialport::Error::new(
                    serialport::ErrorKind::NoDevice,
                    "no scripted port available",
                ),
            })?;
        self.opened.push(settings.clone());
        Ok(Box::new(port))
    }
}
