use std::sync::{Arc, Mutex};

use media_catalog_analytics::ingestion::{
    open_catalog_with_options, CatalogContext, CatalogObserver, CatalogOptions, CatalogSeverity,
};
use media_catalog_analytics::processing::count_by_year;
use media_catalog_analytics::types::{CloseReason, SourceStats};
use media_catalog_analytics::CatalogError;

#[derive(Default)]
struct RecordingObserver {
    opened: Mutex<usize>,
    closed: Mutex<Vec<SourceStats>>,
    failures: Mutex<Vec<CatalogSeverity>>,
    alerts: Mutex<Vec<CatalogSeverity>>,
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

    fn on_alert(&self, _ctx: &CatalogContext, severity: CatalogSeverity, _error: &CatalogError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options(obs: &Arc<RecordingObserver>) -> CatalogOptions {
    CatalogOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: CatalogSeverity::Critical,
    }
}

#[test]
fn observer_receives_failure_and_alert_on_missing_catalog() {
    let obs = Arc::new(RecordingObserver::default());

    let _ = open_catalog_with_options("tests/fixtures/does_not_exist.txt", &options(&obs)).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![CatalogSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![CatalogSeverity::Critical]);
    assert_eq!(*obs.opened.lock().unwrap(), 0);
    assert!(obs.closed.lock().unwrap().is_empty());
}

#[test]
fn full_run_closes_exactly_once_as_exhausted() {
    let obs = Arc::new(RecordingObserver::default());
    let source = open_catalog_with_options("tests/fixtures/dvd_sample.txt", &options(&obs)).unwrap();

    let counts = count_by_year(source).unwrap();
    assert_eq!(counts.values().sum::<u64>(), 14);

    let closed = obs.closed.lock().unwrap().clone();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].reason, CloseReason::Exhausted);
    assert_eq!(closed[0].lines_read, 14);
    assert_eq!(closed[0].records_emitted, 14);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn limit_releases_handle_once_as_early_stop() {
    let obs = Arc::new(RecordingObserver::default());
    let source = open_catalog_with_options("tests/fixtures/dvd_sample.txt", &options(&obs)).unwrap();

    let titles: Vec<String> = source.take(3).map(|r| r.title).collect();
    assert_eq!(titles, vec!["Alien", "Aliens", "Good, Bad, Ugly"]);

    let closed = obs.closed.lock().unwrap().clone();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].reason, CloseReason::EarlyStop);
    assert_eq!(closed[0].records_emitted, 3);
    assert_eq!(*obs.opened.lock().unwrap(), 1);
}
