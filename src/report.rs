//! Reporting: run a named analytic and render its result.
//!
//! Reports render as plain `key = value` lines, as JSON (`{"report": ..., "result": ...}`), or as
//! CSV with one header row per report.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CatalogResult;
use crate::execution::ExecutionEngine;
use crate::ingestion::RecordSource;
use crate::processing::{
    aggregate, AverageCostByYear, CatalogOperator, CountByYear, DistinctRatings, DistinctVersions,
    GenreMaxima, MaxCostByGenre, RankedCounts, StudioReleaseCounts, TitleWordCounts, YearAverages,
    YearCounts,
};

/// The analytics a runner can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    CountByYear,
    TitleWords,
    Studios,
    Versions,
    AverageCost,
    MaxCostByGenre,
    Ratings,
}

impl ReportKind {
    /// Every report, in the default run order.
    pub const ALL: [ReportKind; 7] = [
        ReportKind::CountByYear,
        ReportKind::TitleWords,
        ReportKind::Studios,
        ReportKind::Versions,
        ReportKind::AverageCost,
        ReportKind::MaxCostByGenre,
        ReportKind::Ratings,
    ];

    /// Name of the underlying analytic.
    pub fn operator_name(self) -> &'static str {
        match self {
            ReportKind::CountByYear => CountByYear::NAME,
            ReportKind::TitleWords => TitleWordCounts::NAME,
            ReportKind::Studios => StudioReleaseCounts::NAME,
            ReportKind::Versions => DistinctVersions::NAME,
            ReportKind::AverageCost => AverageCostByYear::NAME,
            ReportKind::MaxCostByGenre => MaxCostByGenre::NAME,
            ReportKind::Ratings => DistinctRatings::NAME,
        }
    }

    /// Run the analytic sequentially over `source`.
    pub fn run(self, source: RecordSource) -> CatalogResult<Report> {
        Ok(match self {
            ReportKind::CountByYear => Report::CountByYear(aggregate(source, CountByYear::default())?),
            ReportKind::TitleWords => Report::TitleWordCounts(aggregate(source, TitleWordCounts::default())?),
            ReportKind::Studios => Report::StudioReleaseCounts(aggregate(source, StudioReleaseCounts::default())?),
            ReportKind::Versions => Report::DistinctVersions(aggregate(source, DistinctVersions::default())?),
            ReportKind::AverageCost => Report::AverageCostByYear(aggregate(source, AverageCostByYear::default())?),
            ReportKind::MaxCostByGenre => Report::MaxCostByGenre(aggregate(source, MaxCostByGenre::default())?),
            ReportKind::Ratings => Report::DistinctRatings(aggregate(source, DistinctRatings::default())?),
        })
    }

    /// Run the analytic over `source` on `engine`'s worker pool.
    pub fn run_parallel(self, engine: &ExecutionEngine, source: RecordSource) -> CatalogResult<Report> {
        Ok(match self {
            ReportKind::CountByYear => Report::CountByYear(engine.aggregate::<CountByYear>(source)?),
            ReportKind::TitleWords => Report::TitleWordCounts(engine.aggregate::<TitleWordCounts>(source)?),
            ReportKind::Studios => Report::StudioReleaseCounts(engine.aggregate::<StudioReleaseCounts>(source)?),
            ReportKind::Versions => Report::DistinctVersions(engine.aggregate::<DistinctVersions>(source)?),
            ReportKind::AverageCost => Report::AverageCostByYear(engine.aggregate::<AverageCostByYear>(source)?),
            ReportKind::MaxCostByGenre => Report::MaxCostByGenre(engine.aggregate::<MaxCostByGenre>(source)?),
            ReportKind::Ratings => Report::DistinctRatings(engine.aggregate::<DistinctRatings>(source)?),
        })
    }
}

/// Output encodings for a [`Report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// The result of one analytic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report", content = "result", rename_all = "kebab-case")]
pub enum Report {
    CountByYear(YearCounts),
    AverageCostByYear(YearAverages),
    MaxCostByGenre(GenreMaxima),
    StudioReleaseCounts(RankedCounts),
    DistinctVersions(Vec<String>),
    DistinctRatings(String),
    TitleWordCounts(RankedCounts),
}

impl Report {
    /// Render in `format` to `out`.
    pub fn write_to<W: Write>(&self, format: OutputFormat, out: &mut W) -> CatalogResult<()> {
        match format {
            OutputFormat::Text => self.write_text(out),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
                Ok(())
            }
            OutputFormat::Csv => self.write_csv(out),
        }
    }

    fn write_text<W: Write>(&self, out: &mut W) -> CatalogResult<()> {
        match self {
            Report::CountByYear(counts) => {
                for (year, count) in counts {
                    writeln!(out, "{year} = {count}")?;
                }
            }
            Report::AverageCostByYear(averages) => {
                for (year, avg) in averages {
                    writeln!(out, "{year} = {avg:.2}")?;
                }
            }
            Report::MaxCostByGenre(maxima) => {
                for (genre, record) in maxima {
                    writeln!(out, "{genre} = {record} [{:.2}]", record.cost)?;
                }
            }
            Report::StudioReleaseCounts(ranked) | Report::TitleWordCounts(ranked) => {
                for (key, count) in ranked {
                    writeln!(out, "{key} = {count}")?;
                }
            }
            Report::DistinctVersions(versions) => {
                for version in versions {
                    writeln!(out, "{version}")?;
                }
            }
            Report::DistinctRatings(joined) => writeln!(out, "{joined}")?,
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, out: &mut W) -> CatalogResult<()> {
        let mut w = csv::Writer::from_writer(out);
        match self {
            Report::CountByYear(counts) => {
                w.write_record(["year", "count"])?;
                for (year, count) in counts {
                    w.write_record([year.to_string(), count.to_string()])?;
                }
            }
            Report::AverageCostByYear(averages) => {
                w.write_record(["year", "average_cost"])?;
                for (year, avg) in averages {
                    w.write_record([year.to_string(), avg.to_string()])?;
                }
            }
            Report::MaxCostByGenre(maxima) => {
                w.write_record(["genre", "title", "studio", "cost"])?;
                for (genre, record) in maxima {
                    w.write_record([
                        genre.as_str(),
                        record.title.as_str(),
                        record.studio.as_str(),
                        record.cost.to_string().as_str(),
                    ])?;
                }
            }
            Report::StudioReleaseCounts(ranked) => write_ranked(&mut w, "studio", ranked)?,
            Report::TitleWordCounts(ranked) => write_ranked(&mut w, "word", ranked)?,
            Report::DistinctVersions(versions) => {
                w.write_record(["version"])?;
                for version in versions {
                    w.write_record([version])?;
                }
            }
            Report::DistinctRatings(joined) => {
                w.write_record(["ratings"])?;
                w.write_record([joined])?;
            }
        }
        w.flush()?;
        Ok(())
    }
}

fn write_ranked<W: Write>(w: &mut csv::Writer<W>, key: &str, ranked: &RankedCounts) -> CatalogResult<()> {
    w.write_record([key, "count"])?;
    for (k, count) in ranked {
        w.write_record([k.clone(), count.to_string()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Cursor;

    use super::*;
    use crate::ingestion::{parse_record, CatalogOptions};

    const ALPHA: &str = r#""Alpha","S1","2000","Out","5.1","DVD","9.99","PG","1999","Action","16:9""#;
    const BETA: &str = r#""Beta","S2","2001","Out","5.1","DVD","19.99","PG","1999","Action","16:9""#;

    fn source() -> RecordSource {
        let text = format!("{ALPHA}\n{BETA}\n");
        RecordSource::from_reader("mem", Cursor::new(text), CatalogOptions::default())
    }

    fn render(report: &Report, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        report.write_to(format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn every_kind_runs() {
        for kind in ReportKind::ALL {
            let report = kind.run(source()).unwrap();
            assert!(!render(&report, OutputFormat::Text).is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn text_uses_key_equals_value_lines() {
        let report = ReportKind::CountByYear.run(source()).unwrap();
        assert_eq!(render(&report, OutputFormat::Text), "1999 = 2\n");

        let report = ReportKind::MaxCostByGenre.run(source()).unwrap();
        assert_eq!(render(&report, OutputFormat::Text), "Action = Beta, S2 (Out) [19.99]\n");
    }

    #[test]
    fn json_is_tagged_by_report() {
        let report = ReportKind::Ratings.run(source()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&render(&report, OutputFormat::Json)).unwrap();
        assert_eq!(value["report"], "distinct-ratings");
        assert_eq!(value["result"], "PG");
    }

    #[test]
    fn csv_has_header_row() {
        let mut maxima = BTreeMap::new();
        maxima.insert("Action".to_string(), parse_record(BETA));
        let report = Report::MaxCostByGenre(maxima);
        assert_eq!(
            render(&report, OutputFormat::Csv),
            "genre,title,studio,cost\nAction,Beta,S2,19.99\n"
        );
    }
}
