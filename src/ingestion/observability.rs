use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CatalogError;
use crate::types::SourceStats;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CatalogSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O failures: the catalog cannot be read at all).
    Critical,
}

/// Context about one record source acquisition.
#[derive(Debug, Clone)]
pub struct CatalogContext {
    /// The catalog path.
    pub path: PathBuf,
}

/// Observer interface for record source lifecycle events.
///
/// Field-level degradation (sentinel substitution) is not an event and is never reported.
pub trait CatalogObserver: Send + Sync {
    /// Called once the file handle has been opened.
    fn on_opened(&self, _ctx: &CatalogContext) {}

    /// Called exactly once per acquisition, when the file handle is released.
    fn on_closed(&self, _ctx: &CatalogContext, _stats: SourceStats) {}

    /// Called when opening or reading the catalog fails.
    fn on_failure(&self, _ctx: &CatalogContext, _severity: CatalogSeverity, _error: &CatalogError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &CatalogContext, severity: CatalogSeverity, error: &CatalogError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Severity assigned to a catalog error.
pub fn severity_for_error(e: &CatalogError) -> CatalogSeverity {
    match e {
        CatalogError::Io(_) => CatalogSeverity::Critical,
        CatalogError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => CatalogSeverity::Critical,
            _ => CatalogSeverity::Error,
        },
        CatalogError::Json(_) | CatalogError::ThreadPool(_) | CatalogError::InvalidOptions { .. } => {
            CatalogSeverity::Error
        }
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn CatalogObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn CatalogObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl CatalogObserver for CompositeObserver {
    fn on_opened(&self, ctx: &CatalogContext) {
        for o in &self.observers {
            o.on_opened(ctx);
        }
    }

    fn on_closed(&self, ctx: &CatalogContext, stats: SourceStats) {
        for o in &self.observers {
            o.on_closed(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &CatalogContext, severity: CatalogSeverity, error: &CatalogError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &CatalogContext, severity: CatalogSeverity, error: &CatalogError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs record source events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl CatalogObserver for StdErrObserver {
    fn on_opened(&self, ctx: &CatalogContext) {
        eprintln!("[catalog][open] path={}", ctx.path.display());
    }

    fn on_closed(&self, ctx: &CatalogContext, stats: SourceStats) {
        eprintln!(
            "[catalog][closed] path={} reason={:?} lines={} records={}",
            ctx.path.display(),
            stats.reason,
            stats.lines_read,
            stats.records_emitted
        );
    }

    fn on_failure(&self, ctx: &CatalogContext, severity: CatalogSeverity, error: &CatalogError) {
        eprintln!(
            "[catalog][{:?}] path={} err={}",
            severity,
            ctx.path.display(),
            error
        );
    }

    fn on_alert(&self, ctx: &CatalogContext, severity: CatalogSeverity, error: &CatalogError) {
        eprintln!(
            "[ALERT][catalog][{:?}] path={} err={}",
            severity,
            ctx.path.display(),
            error
        );
    }
}

/// Appends record source events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl CatalogObserver for FileObserver {
    fn on_opened(&self, ctx: &CatalogContext) {
        self.append_line(&format!("{} open path={}", unix_ts(), ctx.path.display()));
    }

    fn on_closed(&self, ctx: &CatalogContext, stats: SourceStats) {
        self.append_line(&format!(
            "{} closed reason={:?} path={} lines={} records={}",
            unix_ts(),
            stats.reason,
            ctx.path.display(),
            stats.lines_read,
            stats.records_emitted
        ));
    }

    fn on_failure(&self, ctx: &CatalogContext, severity: CatalogSeverity, error: &CatalogError) {
        self.append_line(&format!(
            "{} fail severity={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &CatalogContext, severity: CatalogSeverity, error: &CatalogError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.path.display(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CloseReason;

    #[test]
    fn io_errors_are_critical() {
        let err = CatalogError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(severity_for_error(&err), CatalogSeverity::Critical);

        let err = CatalogError::InvalidOptions {
            message: "chunk_size must be > 0".to_string(),
        };
        assert_eq!(severity_for_error(&err), CatalogSeverity::Error);
    }

    #[test]
    fn file_observer_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("catalog.log");
        let obs = FileObserver::new(&log);
        let ctx = CatalogContext {
            path: PathBuf::from("dvd.txt"),
        };

        obs.on_opened(&ctx);
        obs.on_closed(
            &ctx,
            SourceStats {
                lines_read: 3,
                records_emitted: 2,
                reason: CloseReason::EarlyStop,
            },
        );

        let text = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("open path=dvd.txt"));
        assert!(lines[1].contains("closed reason=EarlyStop"));
        assert!(lines[1].contains("records=2"));
    }
}
