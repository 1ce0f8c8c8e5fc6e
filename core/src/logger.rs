//! Debug logger behind the `log` facade.
//!
//! Keeps the most recent entries in a ring buffer and appends every entry
//! to a log file when one is configured. Nothing is written to stdout,
//! which belongs to the renderer.

use chrono::Local;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use log::{LevelFilter, Log, Metadata, Record};

const RING_CAPACITY: usize = 1000;

pub struct DebugLogEntry {
    pub timestamp: String,
    pub level: String,
    pub module: String,
    pub message: String,
}

impl DebugLogEntry {
    fn format(&self) -> String {
        format!(
            "[{}] [{}] [{}] {}",
            self.timestamp, self.level, self.module, self.message
        )
    }
}

pub struct DebugLogger {
    ring_buffer: Mutex<VecDeque<DebugLogEntry>>,
    max_entries: usize,
    file_path: Option<PathBuf>,
    level: LevelFilter,
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

impl DebugLogger {
    pub fn new(max_entries: usize, level: LevelFilter, file_path: Option<PathBuf>) -> Self {
        if let Some(parent) = file_path.as_ref().and_then(|p| p.parent()) {
            let _ = std::fs::create_dir_all(parent);
        }
        Self {
            ring_buffer: Mutex::new(VecDeque::with_capacity(max_entries)),
            max_entries,
            file_path,
            level,
        }
    }

    fn push(&self, entry: DebugLogEntry) {
        if let Some(path) = &self.file_path {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", entry.format());
            }
        }

        if let Ok(mut ring) = self.ring_buffer.lock() {
            if ring.len() >= self.max_entries {
                ring.pop_front();
            }
            ring.push_back(entry);
        }
    }

    /// Most recent `n` entries, newest first
    pub fn get_recent(&self, n: usize) -> Vec<String> {
        match self.ring_buffer.lock() {
            Ok(ring) => ring.iter().rev().take(n).map(DebugLogEntry::format).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.push(DebugLogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level: record.level().to_string(),
            module: record.module_path().unwrap_or("unknown").to_string(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}

/// Install the process-wide logger. Only the first call takes effect.
pub fn init(level: LevelFilter, file_path: Option<PathBuf>) -> Result<(), log::SetLoggerError> {
    let logger = LOGGER.get_or_init(|| DebugLogger::new(RING_CAPACITY, level, file_path));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Recent entries from the installed logger, newest first
pub fn get_recent_logs(n: usize) -> Vec<String> {
    LOGGER.get().map(|l| l.get_recent(n)).unwrap_or_default()
}
