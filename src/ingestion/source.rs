//! Lazy, single-pass record source over a catalog file.
//!
//! [`open_catalog`] only opens the file handle. Lines are read and parsed one at a time as the
//! consumer pulls from the [`RecordSource`] iterator. The handle is released exactly once:
//!
//! - when the last line has been read,
//! - when a read error ends iteration (the error is kept for [`RecordSource::finish`]),
//! - or when the source is closed or dropped before the end (e.g. after `take`).

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CatalogError, CatalogResult};
use crate::types::{CloseReason, Record, SourceStats};

use super::observability::{severity_for_error, CatalogContext, CatalogObserver, CatalogSeverity};
use super::parser::parse_record;

/// Options controlling how a catalog is opened.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct CatalogOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn CatalogObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: CatalogSeverity,
}

impl fmt::Debug for CatalogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: CatalogSeverity::Critical,
        }
    }
}

impl CatalogOptions {
    fn report_failure(&self, ctx: &CatalogContext, error: &CatalogError) {
        if let Some(obs) = self.observer.as_ref() {
            let sev = severity_for_error(error);
            obs.on_failure(ctx, sev, error);
            if sev >= self.alert_at_or_above {
                obs.on_alert(ctx, sev, error);
            }
        }
    }
}

/// Open the catalog at `path` with default options.
///
/// ```no_run
/// use media_catalog_analytics::ingestion::open_catalog;
///
/// # fn main() -> Result<(), media_catalog_analytics::CatalogError> {
/// let first: Vec<_> = open_catalog("data/dvd_csv.txt")?.take(5).collect();
/// for record in &first {
///     println!("{record}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn open_catalog(path: impl AsRef<Path>) -> CatalogResult<RecordSource> {
    open_catalog_with_options(path, &CatalogOptions::default())
}

/// Open the catalog at `path`.
///
/// A missing or unreadable file is reported to the observer (as
/// [`CatalogSeverity::Critical`]) and returned as [`CatalogError::Io`]. Nothing is parsed here.
pub fn open_catalog_with_options(
    path: impl AsRef<Path>,
    options: &CatalogOptions,
) -> CatalogResult<RecordSource> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => Ok(RecordSource::from_reader(
            path,
            BufReader::new(file),
            options.clone(),
        )),
        Err(e) => {
            let ctx = CatalogContext {
                path: path.to_path_buf(),
            };
            let err = CatalogError::from(e);
            options.report_failure(&ctx, &err);
            Err(err)
        }
    }
}

/// Forward-only cursor producing one [`Record`] per catalog line, in file order.
pub struct RecordSource {
    reader: Option<Box<dyn BufRead + Send>>,
    ctx: CatalogContext,
    options: CatalogOptions,
    buf: Vec<u8>,
    lines_read: u64,
    records_emitted: u64,
    close_reason: Option<CloseReason>,
    error: Option<CatalogError>,
}

impl fmt::Debug for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSource")
            .field("path", &self.ctx.path)
            .field("open", &self.is_open())
            .field("lines_read", &self.lines_read)
            .field("records_emitted", &self.records_emitted)
            .finish()
    }
}

impl RecordSource {
    /// Wrap an already-open line reader. `name` is only used for observer context.
    pub fn from_reader(
        name: impl Into<PathBuf>,
        reader: impl BufRead + Send + 'static,
        options: CatalogOptions,
    ) -> Self {
        let ctx = CatalogContext { path: name.into() };
        if let Some(obs) = options.observer.as_ref() {
            obs.on_opened(&ctx);
        }
        Self {
            reader: Some(Box::new(reader)),
            ctx,
            options,
            buf: Vec::new(),
            lines_read: 0,
            records_emitted: 0,
            close_reason: None,
            error: None,
        }
    }

    /// Path (or name) of the underlying catalog.
    pub fn path(&self) -> &Path {
        &self.ctx.path
    }

    /// Returns `true` while the underlying handle is still held.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Release the underlying handle now. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        self.release(CloseReason::EarlyStop);
    }

    /// Close the source and return its counters, or the read error that ended iteration.
    pub fn finish(mut self) -> CatalogResult<SourceStats> {
        self.close();
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(self.stats()),
        }
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            lines_read: self.lines_read,
            records_emitted: self.records_emitted,
            reason: self.close_reason.unwrap_or(CloseReason::EarlyStop),
        }
    }

    fn release(&mut self, reason: CloseReason) {
        if self.reader.take().is_none() {
            return;
        }
        self.close_reason = Some(reason);
        let stats = self.stats();
        if let Some(obs) = self.options.observer.as_ref() {
            obs.on_closed(&self.ctx, stats);
        }
    }

    /// Pull the next raw line (lossy UTF-8, line terminator stripped).
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let reader = self.reader.as_mut()?;
        self.buf.clear();
        match reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.release(CloseReason::Exhausted);
                None
            }
            Ok(_) => {
                self.lines_read += 1;
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                Some(String::from_utf8_lossy(&self.buf).into_owned())
            }
            Err(e) => {
                let err = CatalogError::from(e);
                self.options.report_failure(&self.ctx, &err);
                self.error = Some(err);
                self.release(CloseReason::Failed);
                None
            }
        }
    }

    /// Append up to `max` raw lines to `out`, returning how many were read.
    ///
    /// Lines pulled this way count as emitted records; the caller parses them.
    pub(crate) fn read_lines(&mut self, max: usize, out: &mut Vec<String>) -> usize {
        let mut n = 0;
        while n < max {
            match self.next_line() {
                Some(line) => {
                    self.records_emitted += 1;
                    out.push(line);
                    n += 1;
                }
                None => break,
            }
        }
        n
    }
}

impl Iterator for RecordSource {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let line = self.next_line()?;
        self.records_emitted += 1;
        Some(parse_record(&line))
    }
}

impl Drop for RecordSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingObserver {
        opened: Mutex<usize>,
        closed: Mutex<Vec<SourceStats>>,
        failures: Mutex<Vec<CatalogSeverity>>,
    }

    impl CatalogObserver for RecordingObserver {
        fn on_opened(&self, _ctx: &CatalogContext) {
            *self.opened.lock().unwrap() += 1;
        }

        fn on_closed(&self, _ctx: &CatalogContext, stats: SourceStats) {
            self.closed.lock().unwrap().push(stats);
        }

        fn on_failure(&self, _ctx: &CatalogContext, severity: CatalogSeverity, _error: &CatalogError) {
            self.failures.lock().unwrap().push(severity);
        }
    }

    fn options(obs: &Arc<RecordingObserver>) -> CatalogOptions {
        CatalogOptions {
            observer: Some(obs.clone()),
            ..Default::default()
        }
    }

    const TWO_LINES: &str = "\"A\",\"S\",\"\",\"Out\",\"\",\"DVD\",\"1\",\"PG\",\"2000\",\"Drama\",\"\"\r\n\
                             \"B\",\"S\",\"\",\"Out\",\"\",\"DVD\",\"2\",\"PG\",\"2001\",\"Drama\",\"\"\n";

    /// Yields `good` and then fails every read.
    struct FailingReader {
        good: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.good.read(buf)?;
            if n == 0 {
                return Err(io::Error::other("disk went away"));
            }
            Ok(n)
        }
    }

    #[test]
    fn exhaustion_closes_once() {
        let obs = Arc::new(RecordingObserver::default());
        let mut src = RecordSource::from_reader("mem", Cursor::new(TWO_LINES), options(&obs));

        let titles: Vec<String> = src.by_ref().map(|r| r.title).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(!src.is_open());
        assert_eq!(src.next(), None);

        let stats = src.finish().unwrap();
        assert_eq!(stats.reason, CloseReason::Exhausted);
        assert_eq!(stats.records_emitted, 2);
        assert_eq!(*obs.opened.lock().unwrap(), 1);
        assert_eq!(obs.closed.lock().unwrap().len(), 1);
    }

    #[test]
    fn early_stop_releases_on_drop() {
        let obs = Arc::new(RecordingObserver::default());
        let src = RecordSource::from_reader("mem", Cursor::new(TWO_LINES), options(&obs));

        let first: Vec<Record> = src.take(1).collect();
        assert_eq!(first.len(), 1);

        let closed = obs.closed.lock().unwrap().clone();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].reason, CloseReason::EarlyStop);
        assert_eq!(closed[0].records_emitted, 1);
    }

    #[test]
    fn explicit_close_is_idempotent() {
        let obs = Arc::new(RecordingObserver::default());
        let mut src = RecordSource::from_reader("mem", Cursor::new(TWO_LINES), options(&obs));
        src.close();
        src.close();
        assert_eq!(src.next(), None);
        drop(src);
        assert_eq!(obs.closed.lock().unwrap().len(), 1);
    }

    #[test]
    fn read_error_ends_iteration_and_surfaces_from_finish() {
        let obs = Arc::new(RecordingObserver::default());
        let reader = BufReader::new(FailingReader {
            good: Cursor::new(b"\"A\",\"S\"\n".to_vec()),
        });
        let mut src = RecordSource::from_reader("mem", reader, options(&obs));

        let records: Vec<Record> = src.by_ref().collect();
        assert_eq!(records.len(), 1);
        assert!(!src.is_open());

        let err = src.finish().unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
        assert_eq!(*obs.failures.lock().unwrap(), vec![CatalogSeverity::Critical]);

        let closed = obs.closed.lock().unwrap().clone();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].reason, CloseReason::Failed);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let bytes = b"\"Caf\xe9\",\"S\"\n".to_vec();
        let mut src = RecordSource::from_reader("mem", Cursor::new(bytes), CatalogOptions::default());
        let r = src.next().unwrap();
        assert!(r.title.starts_with("Caf"));
        assert_eq!(r.studio, "S");
    }

    #[test]
    fn missing_file_is_fatal() {
        let obs = Arc::new(RecordingObserver::default());
        let err = open_catalog_with_options("tests/fixtures/does_not_exist.txt", &options(&obs)).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
        assert_eq!(*obs.failures.lock().unwrap(), vec![CatalogSeverity::Critical]);
        assert_eq!(*obs.opened.lock().unwrap(), 0);
    }
}
