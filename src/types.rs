//! Core data model types for the media catalog.
//!
//! Every catalog line becomes exactly one [`Record`]. Numeric fields that are missing or
//! unparseable carry the [`UNKNOWN`] sentinel instead of failing the line.

use std::fmt;

use serde::Serialize;

/// Number of logical fields in every catalog line.
pub const FIELD_COUNT: usize = 11;

/// Sentinel stored in [`Record::cost`] and [`Record::year`] when the source field is absent or
/// not numeric.
pub const UNKNOWN: i32 = -1;

/// Sentinel value of [`Record::cost`] as a float.
pub const UNKNOWN_COST: f64 = UNKNOWN as f64;

/// One media release entry.
///
/// Field order matches the column order of the catalog file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub title: String,
    pub studio: String,
    pub release_info: String,
    /// Release status, e.g. `Out` for titles already on the shelves.
    pub status: String,
    pub sound_format: String,
    /// Comma-joined list of versions, stored raw.
    pub versions: String,
    /// Price, or [`UNKNOWN_COST`].
    pub cost: f64,
    pub rating: String,
    /// Production year, or [`UNKNOWN`].
    pub year: i32,
    pub genre: String,
    pub aspect: String,
}

impl Record {
    /// Returns `true` when `cost` is above the `-1` sentinel, so `-0.5` counts as known and `-2.0`
    /// does not.
    pub fn has_known_cost(&self) -> bool {
        self.cost > UNKNOWN_COST
    }

    /// Iterate the trimmed entries of the raw `versions` field.
    pub fn version_list(&self) -> impl Iterator<Item = &str> {
        self.versions.split(',').map(str::trim)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} ({})", self.title, self.studio, self.status)
    }
}

/// Why a [`crate::ingestion::RecordSource`] released its file handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Every line of the file was read.
    Exhausted,
    /// The consumer stopped pulling before the end (e.g. after `take`) and dropped the source.
    EarlyStop,
    /// A read error ended iteration.
    Failed,
}

/// Counters reported when a record source is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStats {
    /// Raw lines pulled from the file.
    pub lines_read: u64,
    /// Records handed to the consumer.
    pub records_emitted: u64,
    pub reason: CloseReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(versions: &str, cost: f64) -> Record {
        Record {
            title: "Alpha".to_string(),
            studio: "S1".to_string(),
            release_info: "2000".to_string(),
            status: "Out".to_string(),
            sound_format: "5.1".to_string(),
            versions: versions.to_string(),
            cost,
            rating: "PG".to_string(),
            year: 1999,
            genre: "Action".to_string(),
            aspect: "16:9".to_string(),
        }
    }

    #[test]
    fn display_matches_title_studio_status() {
        assert_eq!(record("DVD", 9.99).to_string(), "Alpha, S1 (Out)");
    }

    #[test]
    fn version_list_trims_entries() {
        let r = record("4:3, 16:9 ,LBX", 1.0);
        assert_eq!(r.version_list().collect::<Vec<_>>(), vec!["4:3", "16:9", "LBX"]);
    }

    #[test]
    fn sentinel_cost_is_not_known() {
        assert!(!record("DVD", UNKNOWN_COST).has_known_cost());
        assert!(record("DVD", 0.0).has_known_cost());
        assert!(record("DVD", -0.5).has_known_cost());
        assert!(!record("DVD", -2.0).has_known_cost());
    }
}
