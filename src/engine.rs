// src/engine.rs
// 后台串口读取线程：只负责读字节并按顺序转发，不碰缓冲区和样本
use crate::drivers::{escape_bytes, PortHandle};
use crate::types::TransportEvent;
use log::{debug, info, warn};
use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const READ_CHUNK_BYTES: usize = 1024;

/// Running reader thread plus the flag that tells it to exit.
pub struct ReaderHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ReaderHandle {
    /// Asks the reader to exit and waits for it. The port closes when the thread drops it.
    pub fn shutdown(self) {}
}

impl Drop for ReaderHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("serial reader thread panicked");
            }
        }
    }
}

pub fn spawn_reader(
    mut port: PortHandle,
    port_name: String,
    tx: Sender<TransportEvent>,
) -> ReaderHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let thread = thread::spawn(move || {
        let mut buffer = [0u8; READ_CHUNK_BYTES];
        info!("serial reader started on {port_name}");
        while !stop_flag.load(Ordering::SeqCst) {
            match port.read(&mut buffer) {
                Ok(0) => {}
                Ok(n) => {
                    let chunk = &buffer[..n];
                    debug!("read {n} bytes: {}", escape_bytes(chunk));
                    if tx.send(TransportEvent::Data(chunk.to_vec())).is_err() {
                        // 会话已经丢弃接收端
                        break;
                    }
                }
                Err(ref e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(e) => {
                    warn!("serial read failed on {port_name}: {e}");
                    tx.send(TransportEvent::Failed(e.to_string())).ok();
                    break;
                }
            }
        }
        info!("serial reader on {port_name} stopped");
    });
    ReaderHandle {
        stop,
        thread: Some(thread),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ManualPort;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn reader_forwards_chunks_in_order() {
        let port = ManualPort::new(vec![b"a,".to_vec(), b"1.0".to_vec(), b",".to_vec()]);
        let (tx, rx) = channel();
        let handle = spawn_reader(Box::new(port), "manual".into(), tx);
        let mut received = Vec::new();
        for _ in 0..3 {
            match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
                TransportEvent::Data(bytes) => received.extend(bytes),
                TransportEvent::Failed(e) => panic!("unexpected failure: {e}"),
            }
        }
        handle.shutdown();
        assert_eq!(received, b"a,1.0,");
    }

    #[test]
    fn reader_reports_hard_errors_and_exits() {
        let port = ManualPort::new(Vec::new()).failing_after(ErrorKind::BrokenPipe);
        let (tx, rx) = channel();
        let handle = spawn_reader(Box::new(port), "manual".into(), tx);
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(event, TransportEvent::Failed(_)));
        handle.shutdown();
        // 线程退出后发送端被丢弃
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
