use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "vpet.log";
const RECENT_CAPACITY: usize = 64;
const LOG_RETENTION_DAYS: u64 = 7;

/// Log severity as shown in the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
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
        let s = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Bounded, shared list of the most recent log entries.
///
/// The tracing layer pushes into it; the HUD reads the newest entry at
/// `info` or above for its status line.
#[derive(Clone)]
pub struct RecentLogs {
    inner: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl RecentLogs {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut buf) = self.inner.lock() {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(entry);
        }
    }

    /// Newest entry whose level is at least `min`.
    pub fn latest(&self, min: LogLevel) -> Option<LogEntry> {
        let buf = self.inner.lock().ok()?;
        buf.iter().rev().find(|e| e.level >= min).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Directory for rolling log files.
///
/// Precedence: `VPET_LOG_DIR` env var > platform data dir
/// (`~/.local/share/vpet/logs`, `~/Library/Logs/vpet` on macOS) > `./logs`.
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("VPET_LOG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join("Library").join("Logs").join("vpet");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Some(data) = dirs::data_dir() {
            return data.join("vpet").join("logs");
        }
    }

    PathBuf::from("logs")
}

/// Delete `vpet.log*` files older than `max_age_days`. Other files are left alone.
fn cleanup_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry
            .file_name()
            .to_string_lossy()
            .starts_with(LOG_FILE_PREFIX)
        {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified());
        if matches!(modified, Ok(t) if t < cutoff) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Tracing layer feeding [`RecentLogs`].
struct RecentLayer {
    logs: RecentLogs,
}

impl<S: tracing::Subscriber> Layer<S> for RecentLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logs.push(LogEntry {
            level: (*event.metadata().level()).into(),
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
        match (self.message, self.fields.is_empty()) {
            (Some(msg), true) => msg,
            (Some(msg), false) => format!("{} {}", msg, self.fields.join(" ")),
            (None, _) => self.fields.join(" "),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

/// Install the global subscriber and return the HUD's recent-log buffer.
///
/// Filter: `VPET_LOG`, then `RUST_LOG`, default `info`. Files roll daily in
/// [`log_dir`] and are kept for seven days.
pub fn init() -> RecentLogs {
    let logs = RecentLogs::new(RECENT_CAPACITY);

    let filter = EnvFilter::try_from_env("VPET_LOG")
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
        .with(RecentLayer { logs: logs.clone() })
        .init();

    logs
}
