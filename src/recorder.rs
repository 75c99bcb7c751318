// src/recorder.rs
// CSV 导出：表头 "Time (s),Signal"，每个样本一行
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::info;
use tempfile::NamedTempFile;

use crate::drivers::TelemetryError;
use crate::types::Sample;

pub const CSV_HEADER: [&str; 2] = ["Time (s)", "Signal"];

/// Writes the header and one `elapsed,value` line per sample, in order.
pub fn write_csv<W: Write>(samples: &[Sample], writer: W) -> io::Result<()> {
    let mut w = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    w.write_record(CSV_HEADER)?;
    for s in samples {
        w.write_record([s.elapsed.to_string(), s.value.to_string()])?;
    }
    w.flush()
}

/// Exports atomically: the file at `path` is either the full CSV or untouched.
pub fn export_csv(samples: &[Sample], path: &Path) -> Result<(), TelemetryError> {
    let wrap = |source: io::Error| TelemetryError::Export {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) {
        return Err(wrap(io::Error::new(
            io::ErrorKind::Other,
            "destination is a directory",
        )));
    }
    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    write_csv(samples, tmp.as_file_mut()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;
    info!("💾 exported {} samples to {}", samples.len(), path.display());
    Ok(())
}
