//! Execution engine for running catalog analytics with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) parsing and folding of catalog lines
//! - Resource limits / throttling (bounded waves of lines, in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring
//!
//! The record source is still read sequentially on the calling thread, one wave of at most
//! `chunk_size * max_in_flight_chunks` raw lines at a time. Each wave is cut into chunks that
//! are parsed and folded into a fresh accumulator on the worker pool; partial accumulators are
//! then merged in chunk order, so results match the sequential [`crate::processing::aggregate`]
//! exactly, including "first encountered" tie-breaks.

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::{CatalogError, CatalogResult};
use crate::ingestion::{parse_record, RecordSource};
use crate::processing::CatalogOperator;

pub use observer::{ExecutionEvent, ExecutionMetrics, ExecutionObserver, RunMetrics, StdErrExecutionObserver};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of catalog lines per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently folded chunks.
    ///
    /// Also bounds memory: one wave holds at most `chunk_size * max_in_flight_chunks` lines.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
        }
    }
}

/// A configurable execution engine for catalog analytics.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`CatalogError::InvalidOptions`] if `chunk_size == 0`,
    /// `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> CatalogResult<Self> {
        if opts.chunk_size == 0 {
            return Err(invalid("chunk_size must be > 0"));
        }
        if opts.max_in_flight_chunks == 0 {
            return Err(invalid("max_in_flight_chunks must be > 0"));
        }
        if opts.num_threads == Some(0) {
            return Err(invalid("num_threads must be > 0 when set"));
        }

        let n_threads = opts.num_threads.unwrap_or_else(available_threads);
        let pool = ThreadPoolBuilder::new().num_threads(n_threads).build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Run analytic `A` over `source` on the worker pool.
    ///
    /// The source is drained and released before returning. A read error ends the run and is
    /// returned instead of a partial result; the run is still closed out in the metrics and
    /// reported as [`ExecutionEvent::RunFailed`].
    pub fn aggregate<A: CatalogOperator>(&self, source: RecordSource) -> CatalogResult<A::Output> {
        let start = Instant::now();
        self.metrics.start(A::NAME);
        self.emit(ExecutionEvent::RunStarted { operator: A::NAME });

        let result = self.drain::<A>(source);

        let metrics = self.metrics.finish(start.elapsed(), result.is_err());
        match &result {
            Ok(_) => self.emit(ExecutionEvent::RunFinished { metrics }),
            Err(e) => self.emit(ExecutionEvent::RunFailed {
                metrics,
                error: e.to_string(),
            }),
        }
        result
    }

    fn drain<A: CatalogOperator>(&self, mut source: RecordSource) -> CatalogResult<A::Output> {
        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let wave_len = self.opts.chunk_size.saturating_mul(self.opts.max_in_flight_chunks);

        let mut acc = A::default();
        let mut lines = Vec::new();
        let mut first_line = 0u64;
        loop {
            lines.clear();
            let n = source.read_lines(wave_len, &mut lines);
            if n == 0 {
                break;
            }
            self.metrics.wave_read();
            self.emit(ExecutionEvent::WaveRead { lines: n });

            let partials: Vec<A> = self.pool.install(|| self.fold_wave::<A>(&lines, first_line, &sem));
            for partial in partials {
                acc.merge(partial);
            }
            first_line += n as u64;
        }
        source.finish()?;
        Ok(acc.finish())
    }

    fn fold_wave<A: CatalogOperator>(&self, lines: &[String], first_line: u64, sem: &Semaphore) -> Vec<A> {
        let chunk_size = self.opts.chunk_size;
        lines
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| {
                let (_permit, waited) = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.throttled(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.chunk_started();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_line: first_line + (i * chunk_size) as u64,
                    line_count: chunk.len(),
                });

                let mut acc = A::default();
                acc.add_all(chunk.iter().map(|line| parse_record(line)));
                self.emit(ExecutionEvent::ChunkFinished { records: chunk.len() });
                self.metrics.chunk_finished(chunk.len());
                acc
            })
            .collect()
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn invalid(message: &str) -> CatalogError {
    CatalogError::InvalidOptions {
        message: message.to_string(),
    }
}
