//! JSON line-delimited logging for learning runs.
//!
//! One entry per refinement pass, appended to a caller-supplied path so
//! runs can be compared offline. The learning loop itself only emits
//! `tracing` events; file logging is opt-in.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::codebook::learning::{LearnResult, PassMetrics};

fn append_json_line<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    serde_json::to_writer(&mut file, value)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    file.write_all(b"\n")
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[derive(Debug, Serialize)]
pub struct PassLogEntry {
    pub pass: usize,
    pub error: f64,
    pub improvement: Option<f64>,
    pub num_batches: usize,
    pub elapsed_ms: u128,
    pub timestamp_ms: u128,
}

/// Append one pass's metrics to a JSONL log.
pub fn log_pass<P: AsRef<Path>>(path: P, metrics: &PassMetrics) -> io::Result<()> {
    let entry = PassLogEntry {
        pass: metrics.pass,
        error: metrics.error,
        improvement: metrics.improvement,
        num_batches: metrics.num_batches,
        elapsed_ms: metrics.elapsed_ms,
        timestamp_ms: timestamp_ms(),
    };
    append_json_line(path, &entry)
}

/// Append every pass of a finished run to a JSONL log.
pub fn log_learn_result<P: AsRef<Path>>(path: P, result: &LearnResult) -> io::Result<()> {
    for metrics in &result.pass_metrics {
        log_pass(path.as_ref(), metrics)?;
    }
    Ok(())
}
