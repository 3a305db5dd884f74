//! Record parser: tokenized line -> [`Record`].
//!
//! Parsing never fails. An empty or non-numeric `cost` / `year` field becomes the
//! [`UNKNOWN`](crate::types::UNKNOWN) sentinel and the rest of the line is kept.

use crate::types::{Record, UNKNOWN, UNKNOWN_COST};

use super::tokenizer::tokenize;

/// Parse one raw catalog line into a [`Record`].
pub fn parse_record(line: &str) -> Record {
    let [
        title,
        studio,
        release_info,
        status,
        sound_format,
        versions,
        cost,
        rating,
        year,
        genre,
        aspect,
    ] = tokenize(line);

    Record {
        title: title.to_owned(),
        studio: studio.to_owned(),
        release_info: release_info.to_owned(),
        status: status.to_owned(),
        sound_format: sound_format.to_owned(),
        versions: versions.to_owned(),
        cost: parse_cost(cost),
        rating: rating.to_owned(),
        year: parse_year(year),
        genre: genre.to_owned(),
        aspect: aspect.to_owned(),
    }
}

/// Parse an already-unquoted cost field, falling back to [`UNKNOWN_COST`].
pub fn parse_cost(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => UNKNOWN_COST,
    }
}

/// Parse an already-unquoted year field, falling back to [`UNKNOWN`].
pub fn parse_year(raw: &str) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(UNKNOWN)
}
