use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "gridbench.log";
const MAX_BUFFERED_LINES: usize = 500;
const LOG_RETENTION_DAYS: u64 = 7;

/// Log severity level, as shown in the log strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Bounded, shared buffer of recent log entries.
///
/// The tracing layer pushes into it from whatever thread logs; the UI takes
/// the pending entries once per frame.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, evicting the oldest one when full.
    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// Remove and return everything buffered so far, oldest first.
    pub fn take(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(mut entries) => entries.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Return the log directory path.
///
/// Precedence: `GRIDBENCH_LOG_DIR` env var > platform data dir.
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GRIDBENCH_LOG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::data_dir() {
        Some(data) => data.join("gridbench").join("logs"),
        None => PathBuf::from("logs"),
    }
}

/// Delete rolled log files older than `max_age_days`. Only files named
/// after [`LOG_FILE_PREFIX`] are considered.
fn cleanup_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .is_ok_and(|modified| modified <= cutoff);
        if stale {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Tracing layer feeding a [`LogBuffer`].
struct BufferLayer {
    buffer: LogBuffer,
}

impl<S: tracing::Subscriber> Layer<S> for BufferLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(LogEntry {
            level: event.metadata().level().into(),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        });
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        let mut parts: Vec<String> = self.message.into_iter().collect();
        parts.extend(self.fields);
        parts.join(" ")
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }
}

/// Initialize logging and return the buffer the UI reads from.
///
/// Filter: `GRIDBENCH_LOG`, then `RUST_LOG`, then `info`. Output goes to a
/// daily rolling file in [`log_dir`] (kept for a week) and to the buffer.
/// Nothing is written to the terminal, which belongs to the UI.
pub fn init() -> LogBuffer {
    let buffer = LogBuffer::new(MAX_BUFFERED_LINES);

    let filter = EnvFilter::try_from_env("GRIDBENCH_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!("warning: failed to create log directory {log_path:?}: {e}");
    }
    cleanup_old_logs(&log_path, LOG_RETENTION_DAYS);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling::daily(&log_path, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(BufferLayer {
            buffer: buffer.clone(),
        })
        .init();

    buffer
}
