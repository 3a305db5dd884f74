use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { operator: &'static str },
    WaveRead { lines: usize },
    ThrottleWaited { duration: Duration },
    ChunkStarted { start_line: u64, line_count: usize },
    ChunkFinished { records: usize },
    RunFinished { metrics: RunMetrics },
    /// The source failed mid-run; no result was produced.
    RunFailed { metrics: RunMetrics, error: String },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunFinished { metrics } => eprintln!("[exec] {metrics}"),
            ExecutionEvent::RunFailed { metrics, error } => eprintln!("[exec][failed] {metrics} err={error}"),
            other => eprintln!("[exec] {other:?}"),
        }
    }
}

/// What one analytic run did: how many waves were read, how many chunks were folded, and how
/// long the pool spent waiting for an in-flight slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Analytic name; `None` before the first run.
    pub operator: Option<&'static str>,
    /// Runs started on this engine, including this one.
    pub run: u64,
    pub waves: u64,
    pub chunks: u64,
    /// Parsed records folded into chunk accumulators.
    pub records: u64,
    /// Highest number of chunks folded at the same time.
    pub peak_chunks: usize,
    pub throttle_wait: Duration,
    /// Set once the run has ended, successfully or not.
    pub elapsed: Option<Duration>,
    pub failed: bool,
}

impl fmt::Display for RunMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{}: {} records in {} chunks over {} waves (peak {} in flight, throttled {:?})",
            self.operator.unwrap_or("-"),
            self.run,
            self.records,
            self.chunks,
            self.waves,
            self.peak_chunks,
            self.throttle_wait,
        )?;
        if let Some(elapsed) = self.elapsed {
            write!(f, " in {elapsed:?}")?;
        }
        Ok(())
    }
}

/// Live view of the engine's current (or last) run.
///
/// Chunk workers update it concurrently; [`ExecutionMetrics::last_run`] copies it out.
#[derive(Default)]
pub struct ExecutionMetrics {
    run: Mutex<RunMetrics>,
    in_flight: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the counters for the current or most recent run.
    pub fn last_run(&self) -> RunMetrics {
        *self.lock()
    }

    pub(crate) fn start(&self, operator: &'static str) {
        self.in_flight.store(0, Ordering::SeqCst);
        let mut run = self.lock();
        *run = RunMetrics {
            operator: Some(operator),
            run: run.run + 1,
            ..RunMetrics::default()
        };
    }

    pub(crate) fn wave_read(&self) {
        self.lock().waves += 1;
    }

    pub(crate) fn throttled(&self, waited: Duration) {
        self.lock().throttle_wait += waited;
    }

    pub(crate) fn chunk_started(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let mut run = self.lock();
        run.chunks += 1;
        run.peak_chunks = run.peak_chunks.max(now);
    }

    pub(crate) fn chunk_finished(&self, records: usize) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.lock().records += records as u64;
    }

    pub(crate) fn finish(&self, elapsed: Duration, failed: bool) -> RunMetrics {
        let mut run = self.lock();
        run.elapsed = Some(elapsed);
        run.failed = failed;
        *run
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunMetrics> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
