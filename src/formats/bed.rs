//! BED peak reader
//!
//! Peaks are plain BED3+ intervals without feature semantics. Only the
//! coordinates are interpreted, any further columns are carried through to
//! the overlap engine untouched.

use crate::core::{LineIterator, PeakError, Result};
use memchr::memchr;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

/// BED parsing error
#[derive(Debug, thiserror::Error)]
pub enum BedParseError {
    #[error("Empty line")]
    EmptyLine,

    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid UTF-8 in field: {0}")]
    InvalidUtf8(&'static str),

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("Invalid range: start {start} > end {end}")]
    InvalidRange { start: u64, end: u64 },
}

/// Zero-copy BED record view
/// Only parses chrom, start, end; other fields are kept as byte ranges
pub struct BedRecordView<'a> {
    line: &'a [u8],
    /// Chromosome name
    pub chrom: &'a str,
    /// Start position (0-based)
    pub start: u64,
    /// End position (exclusive)
    pub end: u64,
    field_bounds: Vec<(usize, usize)>,
}

impl<'a> BedRecordView<'a> {
    pub fn parse(line: &'a [u8]) -> std::result::Result<Self, BedParseError> {
        if line.is_empty() {
            return Err(BedParseError::EmptyLine);
        }

        let mut field_bounds = Vec::with_capacity(12);
        let mut start_pos = 0;
        loop {
            match memchr(b'\t', &line[start_pos..]) {
                Some(tab_pos) => {
                    field_bounds.push((start_pos, start_pos + tab_pos));
                    start_pos += tab_pos + 1;
                }
                None => {
                    field_bounds.push((start_pos, line.len()));
                    break;
                }
            }
        }

        // Need at least 3 fields (BED3)
        if field_bounds.len() < 3 {
            return Err(BedParseError::TooFewFields {
                expected: 3,
                found: field_bounds.len(),
            });
        }

        let field = |idx: usize, name: &'static str| -> std::result::Result<&'a str, BedParseError> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| BedParseError::InvalidUtf8(name))
        };

        let chrom = field(0, "chrom")?;
        let start_str = field(1, "start")?;
        let start: u64 = start_str
            .parse()
            .map_err(|_| BedParseError::InvalidNumber("start", start_str.to_string()))?;
        let end_str = field(2, "end")?;
        let end: u64 = end_str
            .parse()
            .map_err(|_| BedParseError::InvalidNumber("end", end_str.to_string()))?;

        if start > end {
            return Err(BedParseError::InvalidRange { start, end });
        }

        Ok(Self {
            line,
            chrom,
            start,
            end,
            field_bounds,
        })
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.field_bounds.len()
    }

    /// Get field as string slice (lazy access)
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.field_bounds
            .get(index)
            .and_then(|(start, end)| std::str::from_utf8(&self.line[*start..*end]).ok())
    }
}

/// An experimental interval to classify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    /// Columns after the third, passed through unchanged
    pub extra: Vec<String>,
}

impl PeakRecord {
    pub fn from_view(view: &BedRecordView) -> Self {
        let extra = (3..view.field_count())
            .filter_map(|i| view.field(i))
            .map(str::to_string)
            .collect();
        Self {
            chrom: view.chrom.to_string(),
            start: view.start,
            end: view.end,
            extra,
        }
    }

    /// Collapse to the single base at `floor((start + end) / 2)`
    ///
    /// # Examples
    /// ```
    /// use peak_classifier::formats::bed::PeakRecord;
    /// let peak = PeakRecord { chrom: "1".into(), start: 100, end: 200, extra: vec![] };
    /// let mid = peak.to_midpoint();
    /// assert_eq!((mid.start, mid.end), (150, 151));
    /// ```
    pub fn to_midpoint(&self) -> Self {
        let start = (self.start + self.end) / 2;
        Self {
            chrom: self.chrom.clone(),
            start,
            end: start + 1,
            extra: self.extra.clone(),
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl fmt::Display for PeakRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)?;
        for field in &self.extra {
            write!(f, "\t{}", field)?;
        }
        Ok(())
    }
}

/// Whether a BED line is a comment, track or browser line
pub fn is_header_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Copy peaks from `reader` to `writer`, collapsing them to midpoints if asked
///
/// `source` and `output` name the two streams in I/O error messages.
/// Returns the number of peaks written.
pub fn stage_peaks<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    midpoints: bool,
    source: &Path,
    output: &Path,
) -> Result<usize> {
    let mut lines = LineIterator::new(reader);
    let mut count = 0;
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        line_number += 1;
        let line = line.map_err(|e| PeakError::read(source, e))?;
        if line.trim().is_empty() || is_header_line(line) {
            continue;
        }

        let view = BedRecordView::parse(line.as_bytes())
            .map_err(|e| PeakError::data(line_number, e.to_string()))?;
        let peak = PeakRecord::from_view(&view);
        let peak = if midpoints { peak.to_midpoint() } else { peak };

        writeln!(writer, "{}", peak).map_err(|e| PeakError::write(output, e))?;
        count += 1;
    }

    Ok(count)
}
