//! `media-catalog-analytics` ingests a delimited catalog of physical media releases (one quoted,
//! comma-separated record per line) and runs a fixed battery of analytics over it.
//!
//! The primary entrypoint is [`ingestion::open_catalog`], which opens the file and returns a
//! lazy [`ingestion::RecordSource`]: lines are tokenized and parsed into [`types::Record`]s only
//! as they are pulled, and the file handle is released on every exit path.
//!
//! ## Catalog format
//!
//! - 11 fields per line: title, studio, release info, status, sound format, versions, cost,
//!   rating, year, genre, aspect.
//! - Fields are optionally wrapped in `"`; commas inside a quoted span do not split.
//! - No header row.
//! - Short lines yield empty trailing fields. An empty or non-numeric cost or year becomes
//!   [`types::UNKNOWN`] (`-1`); a bad line never aborts a run.
//!
//! ## Quick example
//!
//! ```no_run
//! use media_catalog_analytics::ingestion::open_catalog;
//! use media_catalog_analytics::processing::{count_by_year, studio_release_counts};
//!
//! # fn main() -> Result<(), media_catalog_analytics::CatalogError> {
//! // Each analytic drains its own acquisition of the catalog.
//! let per_year = count_by_year(open_catalog("data/dvd_csv.txt")?)?;
//! for (year, count) in &per_year {
//!     println!("{year} = {count}");
//! }
//!
//! let studios = studio_release_counts(open_catalog("data/dvd_csv.txt")?)?;
//! println!("top studio: {:?}", studios.first());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: tokenizer, record parser, lazy record source, observers
//! - [`types`]: the record model and sentinels
//! - [`processing`]: mergeable reducers and the catalog analytics
//! - [`execution`]: parallel engine with throttling and metrics
//! - [`report`]: named reports rendered as text, JSON or CSV
//! - [`demo`]: iteration demonstrations unrelated to the catalog
//! - [`error`]: error types

pub mod demo;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod report;
pub mod types;

pub use error::{CatalogError, CatalogResult};
