//! CLI tool to run catalog reports.
//!
//! Usage:
//!   catalog-report [catalog.txt]
//!   catalog-report data/dvd_csv.txt --report studios --report ratings --format json
//!   catalog-report data/dvd_csv.txt --parallel --threads 8 --log-file catalog.log
//!
//! Reports go to stdout; timings and logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use media_catalog_analytics::demo::{even_numbers, numbers_per_worker};
use media_catalog_analytics::execution::{ExecutionEngine, ExecutionOptions, StdErrExecutionObserver};
use media_catalog_analytics::ingestion::{
    open_catalog_with_options, CatalogObserver, CatalogOptions, CompositeObserver, FileObserver, StdErrObserver,
};
use media_catalog_analytics::report::{OutputFormat, ReportKind};
use media_catalog_analytics::CatalogResult;

#[derive(Debug, Parser)]
#[command(name = "catalog-report", version, about = "Run analytics over a media release catalog")]
struct Args {
    /// Catalog file (one quoted, comma-separated record per line).
    #[arg(default_value = "data/dvd_csv.txt")]
    catalog: PathBuf,

    /// Report to run; repeat to run several. Defaults to all of them.
    #[arg(short, long = "report", value_enum)]
    reports: Vec<ReportKind>,

    /// Output encoding.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Parse and aggregate on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel (default: available parallelism).
    #[arg(long)]
    threads: Option<usize>,

    /// Lines per chunk for --parallel.
    #[arg(long, default_value_t = 4_096)]
    chunk_size: usize,

    /// Log catalog and execution events to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Append catalog events to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run the iteration demonstrations before the reports.
    #[arg(long)]
    demo: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> CatalogResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.demo {
        for n in even_numbers(100) {
            writeln!(out, "{n}")?;
        }
        for (worker, numbers) in numbers_per_worker(160) {
            writeln!(out, "{worker} >> {numbers:?}")?;
        }
    }

    let options = catalog_options(args);
    let engine = if args.parallel {
        let mut opts = ExecutionOptions {
            chunk_size: args.chunk_size,
            ..Default::default()
        };
        if args.threads.is_some() {
            opts.num_threads = args.threads;
        }
        let mut engine = ExecutionEngine::new(opts)?;
        if args.verbose {
            engine = engine.with_observer(Arc::new(StdErrExecutionObserver));
        }
        Some(engine)
    } else {
        None
    };

    let reports: &[ReportKind] = if args.reports.is_empty() {
        &ReportKind::ALL
    } else {
        &args.reports
    };

    for kind in reports {
        let start = Instant::now();
        let source = open_catalog_with_options(&args.catalog, &options)?;
        let report = match &engine {
            Some(engine) => kind.run_parallel(engine, source)?,
            None => kind.run(source)?,
        };
        report.write_to(args.format, &mut out)?;
        out.flush()?;
        eprintln!("{} took {} ms", kind.operator_name(), start.elapsed().as_millis());
    }
    Ok(())
}

fn catalog_options(args: &Args) -> CatalogOptions {
    let mut observers: Vec<Arc<dyn CatalogObserver>> = Vec::new();
    if args.verbose {
        observers.push(Arc::new(StdErrObserver));
    }
    if let Some(path) = &args.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }

    let observer: Option<Arc<dyn CatalogObserver>> = match observers.len() {
        0 => None,
        1 => observers.pop(),
        _ => Some(Arc::new(CompositeObserver::new(observers))),
    };
    CatalogOptions {
        observer,
        ..Default::default()
    }
}
