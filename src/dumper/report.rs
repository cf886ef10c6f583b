use crate::dumper::DumpOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Tally of one batch run over a list of input paths.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub requested: usize,
    pub dumped: Vec<DumpOutcome>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub cancelled: bool,
    #[serde(skip)]
    start_time: Instant,
}

impl BatchReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            dumped: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
            cancelled: false,
            start_time: Instant::now(),
        }
    }

    pub fn record_dumped(&mut self, outcome: DumpOutcome) {
        self.dumped.push(outcome);
    }

    pub fn record_skipped(&mut self, path: PathBuf) {
        self.skipped.push(path);
    }

    pub fn record_failure<S: Into<String>>(&mut self, path: PathBuf, message: S) {
        self.failures.push(FileFailure {
            path,
            message: message.into(),
        });
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn finish(&mut self) {
        self.duration_ms = self.start_time.elapsed().as_millis();
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn total_bytes(&self) -> u64 {
        self.dumped.iter().map(|o| o.bytes).sum()
    }

    /// True when every requested path was dumped.
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.skipped.is_empty() && self.failures.is_empty()
    }
}
