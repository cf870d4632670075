//! Overlap rows and their reinterpretation
//!
//! The overlap engine writes each peak followed by the matched catalog
//! interval and the overlap in bases. A peak that matched nothing gets a
//! placeholder interval with start `-1`; such peaks are relabeled
//! `upstream-beyond` and counted as overlapping themselves entirely.

use std::fmt;

/// Catalog start written by the engine for a peak without any match
pub const NO_MATCH_START: i64 = -1;

/// Feature name given to peaks that matched nothing
pub const UPSTREAM_BEYOND: &str = "upstream-beyond";

/// Header line of the classification output
pub const CLASSIFICATION_HEADER: &str =
    "#Chr\tP-start\tP-end\tF-start\tF-end\tF-name\tStrand\tOverlap";

/// Columns after the peak: catalog BED6 plus overlap length
const TRAILING_FIELDS: usize = 7;
const PEAK_FIELDS: usize = 3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OverlapParseError {
    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),
}

/// Overlap reported for one peak/feature pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    Bases(u64),
    /// The peak satisfied no overlap threshold against any catalog interval
    NoMatch,
}

/// One row of overlap engine output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapRow {
    pub chrom: String,
    pub peak_start: u64,
    pub peak_end: u64,
    pub feature_start: i64,
    pub feature_end: i64,
    pub feature_name: String,
    pub strand: String,
    pub overlap: Overlap,
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<T, OverlapParseError> {
    value
        .parse()
        .map_err(|_| OverlapParseError::InvalidNumber(field, value.to_string()))
}

impl OverlapRow {
    /// Parse an engine line: peak BED3+ columns, catalog BED6, overlap
    ///
    /// Peaks may carry extra columns, so the catalog part is located from
    /// the right-hand end of the line.
    pub fn parse(line: &str) -> Result<Self, OverlapParseError> {
        let fields: Vec<&str> = line.split('\t').collect();
        let expected = PEAK_FIELDS + TRAILING_FIELDS;
        if fields.len() < expected {
            return Err(OverlapParseError::TooFewFields {
                expected,
                found: fields.len(),
            });
        }

        let f = fields.len() - TRAILING_FIELDS;
        let feature_start: i64 = parse_number("feature start", fields[f + 1])?;
        let overlap = if feature_start == NO_MATCH_START {
            Overlap::NoMatch
        } else {
            Overlap::Bases(parse_number("overlap", fields[f + 6])?)
        };

        Ok(Self {
            chrom: fields[0].to_string(),
            peak_start: parse_number("peak start", fields[1])?,
            peak_end: parse_number("peak end", fields[2])?,
            feature_start,
            feature_end: parse_number("feature end", fields[f + 2])?,
            feature_name: fields[f + 3].to_string(),
            strand: fields[f + 5].to_string(),
            overlap,
        })
    }

    /// Length of the peak in bases
    pub fn peak_len(&self) -> u64 {
        self.peak_end.saturating_sub(self.peak_start)
    }
}

/// A classified peak, as written to the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub chrom: String,
    pub peak_start: u64,
    pub peak_end: u64,
    pub feature_start: i64,
    pub feature_end: i64,
    pub feature_name: String,
    pub strand: String,
    pub overlap: u64,
}

impl ClassifiedRow {
    pub fn is_upstream_beyond(&self) -> bool {
        self.feature_name == UPSTREAM_BEYOND
    }
}

/// Apply the no-match policy to one engine row
///
/// Matched rows keep the overlap reported by the engine.
pub fn reinterpret(row: OverlapRow) -> ClassifiedRow {
    let (feature_name, overlap) = match row.overlap {
        Overlap::NoMatch => (UPSTREAM_BEYOND.to_string(), row.peak_len()),
        Overlap::Bases(bases) => (row.feature_name, bases),
    };
    ClassifiedRow {
        overlap,
        feature_name,
        chrom: row.chrom,
        peak_start: row.peak_start,
        peak_end: row.peak_end,
        feature_start: row.feature_start,
        feature_end: row.feature_end,
        strand: row.strand,
    }
}

impl fmt::Display for ClassifiedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.peak_start,
            self.peak_end,
            self.feature_start,
            self.feature_end,
            self.feature_name,
            self.strand,
            self.overlap
        )
    }
}
