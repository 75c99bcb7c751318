// src/session.rs
// 会话控制器：持有缓冲区、样本存储和串口读线程
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::drivers::{
    LineAccumulator, PortOpener, RecordFormat, RecordParser, SampleStore, TelemetryError,
};
use crate::engine::{self, ReaderHandle};
use crate::recorder;
use crate::types::{ChartBounds, PortSettings, Sample, SessionState, TransportEvent};

/// Receives the full sample history after every change, e.g. a chart widget.
pub trait SampleSink {
    fn on_update(&mut self, samples: &[Sample], bounds: Option<ChartBounds>);
}

struct ActiveLink {
    reader: ReaderHandle,
    rx: Receiver<TransportEvent>,
}

/// Start/stop lifecycle of one serial telemetry session.
///
/// All buffer and store mutation happens on the thread calling `ingest`,
/// `pump` or `pump_timeout`; the reader thread only forwards raw chunks.
pub struct SessionController<O: PortOpener> {
    opener: O,
    parser: RecordParser,
    buffer: LineAccumulator,
    store: SampleStore,
    sink: Option<Box<dyn SampleSink>>,
    link: Option<ActiveLink>,
    settings: Option<PortSettings>,
    clear_on_start: bool,
    dropped_records: u64,
}

impl<O: PortOpener> SessionController<O> {
    pub fn new(opener: O, format: RecordFormat) -> Self {
        Self::with_parser(opener, RecordParser::new(format))
    }

    pub fn with_parser(opener: O, parser: RecordParser) -> Self {
        Self {
            opener,
            parser,
            buffer: LineAccumulator::new(),
            store: SampleStore::new(),
            sink: None,
            link: None,
            settings: None,
            clear_on_start: false,
            dropped_records: 0,
        }
    }

    pub fn set_sink(&mut self, sink: impl SampleSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    /// Wipe the store and buffer on every successful `start`.
    pub fn set_clear_on_start(&mut self, enabled: bool) {
        self.clear_on_start = enabled;
    }

    pub fn state(&self) -> SessionState {
        if self.link.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn buffer(&self) -> &LineAccumulator {
        &self.buffer
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Settings of the current or most recent session.
    pub fn settings(&self) -> Option<&PortSettings> {
        self.settings.as_ref()
    }

    /// Records discarded because their payload did not parse.
    pub fn dropped_records(&self) -> u64 {
        self.dropped_records
    }

    pub fn start(&mut self, settings: PortSettings) -> Result<(), TelemetryError> {
        if self.is_active() {
            return Err(TelemetryError::AlreadyActive);
        }
        let port = self.opener.open(&settings)?;
        if self.clear_on_start {
            self.buffer.clear();
            self.store.clear();
        }
        let (tx, rx) = channel();
        let reader = engine::spawn_reader(port, settings.port.clone(), tx);
        info!("🌊 session started on {} @ {} baud (8N1)", settings.port, settings.baud);
        self.settings = Some(settings);
        self.link = Some(ActiveLink { reader, rx });
        Ok(())
    }

    /// Closes the transport. Buffer and samples survive until `clear`.
    pub fn stop(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        link.reader.shutdown();
        let pending = link.rx.try_iter().count();
        if pending > 0 {
            debug!("discarded {pending} undelivered chunks after stop");
        }
        info!("🛑 session stopped with {} samples", self.store.len());
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.store.clear();
        self.notify();
    }

    /// One routing step: accumulate, try to extract, store, notify.
    ///
    /// Unparseable payloads are dropped and counted; they never reach the store.
    pub fn ingest(&mut self, chunk: &[u8]) -> Option<Sample> {
        self.buffer.append(chunk);
        debug!("buffer: {}", self.buffer.escaped());
        match self.parser.try_extract(&mut self.buffer) {
            Ok(Some(record)) => {
                let sample = self.store.add_point(record.timestamp, record.value);
                self.notify();
                Some(sample)
            }
            Ok(None) => None,
            Err(e) => {
                self.dropped_records += 1;
                warn!("dropping record: {e}");
                None
            }
        }
    }

    /// Routes every event already delivered by the reader without blocking.
    pub fn pump(&mut self) -> Result<usize, TelemetryError> {
        self.drain(None)
    }

    /// Like `pump`, but waits up to `timeout` for the first event.
    pub fn pump_timeout(&mut self, timeout: Duration) -> Result<usize, TelemetryError> {
        self.drain(Some(timeout))
    }

    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<(), TelemetryError> {
        recorder::export_csv(self.store.snapshot(), path.as_ref())
    }

    fn drain(&mut self, mut wait: Option<Duration>) -> Result<usize, TelemetryError> {
        let mut added = 0;
        loop {
            let Some(link) = self.link.as_ref() else {
                return Ok(added);
            };
            let event = match wait.take() {
                Some(timeout) => match link.rx.recv_timeout(timeout) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => return Ok(added),
                    Err(RecvTimeoutError::Disconnected) => return self.reader_gone(),
                },
                None => match link.rx.try_recv() {
                    Ok(event) => event,
                    Err(TryRecvError::Empty) => return Ok(added),
                    Err(TryRecvError::Disconnected) => return self.reader_gone(),
                },
            };
            match event {
                TransportEvent::Data(chunk) => {
                    if self.ingest(&chunk).is_some() {
                        added += 1;
                    }
                }
                TransportEvent::Failed(reason) => {
                    self.stop();
                    return Err(TelemetryError::Transport(reason));
                }
            }
        }
    }

    fn reader_gone(&mut self) -> Result<usize, TelemetryError> {
        self.stop();
        Err(TelemetryError::Transport("serial reader exited".into()))
    }

    fn notify(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_update(self.store.snapshot(), self.store.bounds());
        }
    }
}

impl<O: PortOpener> Drop for SessionController<O> {
    fn drop(&mut self) {
        self.stop();
    }
}
