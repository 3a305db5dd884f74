//! The catalog analytics.
//!
//! Each analytic is an [`Accumulator`] over [`Record`]s, so it can be driven sequentially by
//! [`aggregate`] (one entry-point function per analytic below) or in parallel by
//! [`crate::execution::ExecutionEngine::aggregate`].
//!
//! | Analytic | Kept records | Key | Result |
//! |---|---|---|---|
//! | [`CountByYear`] | all (year `-1` is its own bucket) | year | count, ascending year |
//! | [`AverageCostByYear`] | `year > 1000` and known cost | year | mean cost |
//! | [`MaxCostByGenre`] | all | genre | most expensive record, first wins ties |
//! | [`StudioReleaseCounts`] | `status == "Out"` | studio | count, top 50 descending |
//! | [`DistinctVersions`] | all | trimmed version | first-occurrence order |
//! | [`DistinctRatings`] | all | rating | space-joined, first-occurrence order |
//! | [`TitleWordCounts`] | all | cleaned title word | count, words longer than 2, ascending |

use std::collections::BTreeMap;

use crate::error::CatalogResult;
use crate::ingestion::RecordSource;
use crate::types::Record;

use super::reduce::{rank_by_count, Accumulator, Counter, Distinct, GroupBy, MaxBy, Mean, RankOrder};

/// Status of releases already on the shelves.
pub const RELEASED_STATUS: &str = "Out";

/// Number of studios kept by [`StudioReleaseCounts`].
pub const TOP_STUDIOS: usize = 50;

/// Years at or below this value are noise for [`AverageCostByYear`].
pub const MIN_PLAUSIBLE_YEAR: i32 = 1000;

/// Cleaned title words must be longer than this to be reported.
pub const MIN_WORD_LEN: usize = 2;

/// Record count per year, ascending by year.
pub type YearCounts = BTreeMap<i32, u64>;
/// Mean cost per year.
pub type YearAverages = BTreeMap<i32, f64>;
/// Most expensive record per genre.
pub type GenreMaxima = BTreeMap<String, Record>;
/// `(key, count)` pairs in ranking order.
pub type RankedCounts = Vec<(String, u64)>;

/// An analytic with a stable name, used for logging and reporting.
pub trait CatalogOperator: Accumulator<Input = Record> {
    const NAME: &'static str;
}

/// Drain `source` into `acc`, then release the source.
///
/// A read error that ended iteration early is returned instead of a partial result.
pub fn aggregate<A>(mut source: RecordSource, mut acc: A) -> CatalogResult<A::Output>
where
    A: Accumulator<Input = Record>,
{
    acc.add_all(source.by_ref());
    source.finish()?;
    Ok(acc.finish())
}

/// Number of records per year, sentinel year included.
pub fn count_by_year(source: RecordSource) -> CatalogResult<YearCounts> {
    aggregate(source, CountByYear::default())
}

/// Mean known cost per plausible year.
pub fn average_cost_by_year(source: RecordSource) -> CatalogResult<YearAverages> {
    aggregate(source, AverageCostByYear::default())
}

/// Most expensive record per genre.
pub fn max_cost_by_genre(source: RecordSource) -> CatalogResult<GenreMaxima> {
    aggregate(source, MaxCostByGenre::default())
}

/// Top studios by number of released titles.
pub fn studio_release_counts(source: RecordSource) -> CatalogResult<RankedCounts> {
    aggregate(source, StudioReleaseCounts::default())
}

/// Every distinct trimmed version string.
pub fn distinct_versions(source: RecordSource) -> CatalogResult<Vec<String>> {
    aggregate(source, DistinctVersions::default())
}

/// Every distinct rating, joined with single spaces.
pub fn distinct_ratings(source: RecordSource) -> CatalogResult<String> {
    aggregate(source, DistinctRatings::default())
}

/// Title word occurrences, rarest first.
pub fn title_word_counts(source: RecordSource) -> CatalogResult<RankedCounts> {
    aggregate(source, TitleWordCounts::default())
}

/// Split a title into raw word tokens on runs of ASCII whitespace (space, tab, line feed,
/// vertical tab, form feed, carriage return). Other Unicode spaces such as U+00A0 stay inside
/// a token.
pub fn title_tokens(title: &str) -> impl Iterator<Item = &str> {
    title
        .split(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'))
        .filter(|token| !token.is_empty())
}

/// Strip every character outside `[A-Za-z0-9 ]`.
pub fn clean_word(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct CountByYear {
    by_year: GroupBy<i32, Counter>,
}

impl Accumulator for CountByYear {
    type Input = Record;
    type Output = YearCounts;

    fn add(&mut self, record: Record) {
        self.by_year.add((record.year, ()));
    }

    fn merge(&mut self, later: Self) {
        self.by_year.merge(later.by_year);
    }

    fn finish(self) -> YearCounts {
        self.by_year.finish().into_iter().collect()
    }
}

impl CatalogOperator for CountByYear {
    const NAME: &'static str = "count-by-year";
}

#[derive(Debug, Default, Clone)]
pub struct AverageCostByYear {
    by_year: GroupBy<i32, Mean>,
}

impl Accumulator for AverageCostByYear {
    type Input = Record;
    type Output = YearAverages;

    fn add(&mut self, record: Record) {
        if record.year > MIN_PLAUSIBLE_YEAR && record.has_known_cost() {
            self.by_year.add((record.year, record.cost));
        }
    }

    fn merge(&mut self, later: Self) {
        self.by_year.merge(later.by_year);
    }

    fn finish(self) -> YearAverages {
        self.by_year.finish().into_iter().collect()
    }
}

impl CatalogOperator for AverageCostByYear {
    const NAME: &'static str = "average-cost-by-year";
}

#[derive(Debug, Default, Clone)]
pub struct MaxCostByGenre {
    by_genre: GroupBy<String, MaxBy<Record>>,
}

impl Accumulator for MaxCostByGenre {
    type Input = Record;
    type Output = GenreMaxima;

    fn add(&mut self, record: Record) {
        let genre = record.genre.clone();
        let cost = record.cost;
        self.by_genre.add((genre, (cost, record)));
    }

    fn merge(&mut self, later: Self) {
        self.by_genre.merge(later.by_genre);
    }

    fn finish(self) -> GenreMaxima {
        self.by_genre
            .finish()
            .into_iter()
            .filter_map(|(genre, best)| best.map(|r| (genre, r)))
            .collect()
    }
}

impl CatalogOperator for MaxCostByGenre {
    const NAME: &'static str = "max-cost-by-genre";
}

#[derive(Debug, Default, Clone)]
pub struct StudioReleaseCounts {
    by_studio: GroupBy<String, Counter>,
}

impl Accumulator for StudioReleaseCounts {
    type Input = Record;
    type Output = RankedCounts;

    fn add(&mut self, record: Record) {
        if record.status == RELEASED_STATUS {
            self.by_studio.add((record.studio, ()));
        }
    }

    fn merge(&mut self, later: Self) {
        self.by_studio.merge(later.by_studio);
    }

    fn finish(self) -> RankedCounts {
        rank_by_count(self.by_studio.finish(), RankOrder::Descending, Some(TOP_STUDIOS))
    }
}

impl CatalogOperator for StudioReleaseCounts {
    const NAME: &'static str = "studio-release-counts";
}

#[derive(Debug, Default, Clone)]
pub struct DistinctVersions {
    versions: Distinct<String>,
}

impl Accumulator for DistinctVersions {
    type Input = Record;
    type Output = Vec<String>;

    fn add(&mut self, record: Record) {
        self.versions.add_all(record.version_list().map(str::to_owned));
    }

    fn merge(&mut self, later: Self) {
        self.versions.merge(later.versions);
    }

    fn finish(self) -> Vec<String> {
        self.versions.finish()
    }
}

impl CatalogOperator for DistinctVersions {
    const NAME: &'static str = "distinct-versions";
}

#[derive(Debug, Default, Clone)]
pub struct DistinctRatings {
    ratings: Distinct<String>,
}

impl Accumulator for DistinctRatings {
    type Input = Record;
    type Output = String;

    fn add(&mut self, record: Record) {
        self.ratings.add(record.rating);
    }

    fn merge(&mut self, later: Self) {
        self.ratings.merge(later.ratings);
    }

    fn finish(self) -> String {
        self.ratings.finish().join(" ")
    }
}

impl CatalogOperator for DistinctRatings {
    const NAME: &'static str = "distinct-ratings";
}

#[derive(Debug, Default, Clone)]
pub struct TitleWordCounts {
    words: GroupBy<String, Counter>,
}

impl Accumulator for TitleWordCounts {
    type Input = Record;
    type Output = RankedCounts;

    fn add(&mut self, record: Record) {
        self.words
            .add_all(title_tokens(&record.title).map(|token| (clean_word(token), ())));
    }

    fn merge(&mut self, later: Self) {
        self.words.merge(later.words);
    }

    fn finish(self) -> RankedCounts {
        let mut counts = self.words.finish();
        counts.retain(|word, _| word.len() > MIN_WORD_LEN);
        rank_by_count(counts, RankOrder::Ascending, None)
    }
}

impl CatalogOperator for TitleWordCounts {
    const NAME: &'static str = "title-word-counts";
}
