//! Aggregations over catalog records.
//!
//! - [`reduce`]: generic mergeable reducers ([`Counter`], [`Mean`], [`MaxBy`], [`GroupBy`],
//!   [`Distinct`]) and count ranking.
//! - [`analytics`]: the catalog analytics built from those reducers, with one entry-point
//!   function per analytic.
//!
//! ## Example: count releases per year
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use media_catalog_analytics::ingestion::{CatalogOptions, RecordSource};
//! use media_catalog_analytics::processing::count_by_year;
//!
//! let text = concat!(
//!     r#""Alpha","S1","2000","Out","5.1","DVD","9.99","PG","1999","Action","16:9""#, "\n",
//!     r#""Beta","S2","2001","Out","5.1","DVD","19.99","PG","1999","Action","16:9""#, "\n",
//! );
//! let source = RecordSource::from_reader("inline", Cursor::new(text), CatalogOptions::default());
//!
//! let counts = count_by_year(source).unwrap();
//! assert_eq!(counts[&1999], 2);
//! ```

pub mod analytics;
pub mod reduce;

pub use analytics::{
    aggregate, average_cost_by_year, clean_word, count_by_year, distinct_ratings, distinct_versions,
    max_cost_by_genre, studio_release_counts, title_tokens, title_word_counts, AverageCostByYear, CatalogOperator,
    CountByYear, DistinctRatings, DistinctVersions, GenreMaxima, MaxCostByGenre, RankedCounts,
    StudioReleaseCounts, TitleWordCounts, YearAverages, YearCounts,
};
pub use reduce::{rank_by_count, Accumulator, Counter, Distinct, GroupBy, MaxBy, Mean, RankOrder};
