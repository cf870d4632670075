//! GFF3 annotation reader
//!
//! Zero-copy parsing of single GFF3 lines plus a streaming reader that turns
//! an annotation file into records and `###` group terminators.
//! GFF uses 1-based inclusive coordinates (unlike BED which is 0-based).

use crate::core::{LineIterator, PeakError, Result, Strand};
use memchr::memchr;
use std::io::BufRead;
use std::path::PathBuf;

/// Literal line closing a gene block in GFF3 and in the catalog
pub const GROUP_TERMINATOR: &str = "###";

/// Directive after which only sequence data follows
const FASTA_DIRECTIVE: &str = "##FASTA";

/// Placeholder for a missing `Name=` or `ID=` attribute
pub const MISSING_ATTRIBUTE: &str = ".";

/// GFF parse error
#[derive(Debug, Clone)]
pub enum GffParseError {
    EmptyLine,
    TooFewFields { expected: usize, found: usize },
    InvalidUtf8(&'static str),
    InvalidNumber(&'static str, String),
    InvalidStrand(String),
    InvalidRange { start: u64, end: u64 },
}

impl std::fmt::Display for GffParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GffParseError::EmptyLine => write!(f, "Empty line"),
            GffParseError::TooFewFields { expected, found } => {
                write!(f, "Too few fields: expected {}, found {}", expected, found)
            }
            GffParseError::InvalidUtf8(field) => write!(f, "Invalid UTF-8 in field: {}", field),
            GffParseError::InvalidNumber(field, value) => {
                write!(f, "Invalid number in field {}: {}", field, value)
            }
            GffParseError::InvalidStrand(s) => write!(f, "Invalid strand: {}", s),
            GffParseError::InvalidRange { start, end } => {
                write!(f, "Invalid range: start {} end {}", start, end)
            }
        }
    }
}

impl std::error::Error for GffParseError {}

/// Zero-copy GFF3 record view
/// GFF format: seqid, source, type, start, end, score, strand, phase, attributes
pub struct GffRecordView<'a> {
    /// Sequence id (chromosome)
    pub seqid: &'a str,
    /// Feature type (gene, mRNA, exon, ...)
    pub feature: &'a str,
    /// Start position (1-based)
    pub start: u64,
    /// End position (1-based, inclusive)
    pub end: u64,
    /// Strand, `None` for `.` or `?`
    pub strand: Option<Strand>,
    /// Attributes column
    pub attributes: &'a str,
}

impl<'a> GffRecordView<'a> {
    /// Parse a GFF3 line with minimal allocation
    pub fn parse(line: &'a [u8]) -> std::result::Result<Self, GffParseError> {
        if line.is_empty() {
            return Err(GffParseError::EmptyLine);
        }

        // Find field boundaries using memchr for tab characters
        let mut field_bounds = Vec::with_capacity(9);
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

        if field_bounds.len() < 9 {
            return Err(GffParseError::TooFewFields {
                expected: 9,
                found: field_bounds.len(),
            });
        }

        let get_field = |idx: usize, name: &'static str| -> std::result::Result<&'a str, GffParseError> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| GffParseError::InvalidUtf8(name))
        };

        let seqid = get_field(0, "seqid")?;
        let feature = get_field(2, "type")?;

        let start_str = get_field(3, "start")?;
        let start: u64 = start_str
            .parse()
            .map_err(|_| GffParseError::InvalidNumber("start", start_str.to_string()))?;

        let end_str = get_field(4, "end")?;
        let end: u64 = end_str
            .parse()
            .map_err(|_| GffParseError::InvalidNumber("end", end_str.to_string()))?;

        if start == 0 || start > end {
            return Err(GffParseError::InvalidRange { start, end });
        }

        let strand_str = get_field(6, "strand")?;
        let strand = match strand_str {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => None,
            _ => return Err(GffParseError::InvalidStrand(strand_str.to_string())),
        };

        let attributes = get_field(8, "attributes")?;

        Ok(Self {
            seqid,
            feature,
            start,
            end,
            strand,
            attributes,
        })
    }

    /// Value of a `key=value` attribute, if present
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.attributes
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Copy the fields the catalog needs into an owned record
    pub fn to_record(&self) -> AnnotationRecord {
        AnnotationRecord {
            seqid: self.seqid.to_string(),
            feature_type: self.feature.to_string(),
            start: self.start,
            end: self.end,
            strand: self.strand,
            name: self.attribute("Name").unwrap_or(MISSING_ATTRIBUTE).to_string(),
            id: self.attribute("ID").unwrap_or(MISSING_ATTRIBUTE).to_string(),
        }
    }
}

/// One annotation row, 1-based inclusive coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub seqid: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub strand: Option<Strand>,
    pub name: String,
    pub id: String,
}

impl AnnotationRecord {
    pub fn is_gene(&self) -> bool {
        self.feature_type.contains("gene")
    }

    pub fn is_exon(&self) -> bool {
        self.feature_type == "exon"
    }
}

/// An item of the annotation stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GffEntry {
    Record(AnnotationRecord),
    /// The `###` line closing a gene block
    Terminator,
}

/// Streaming GFF3 reader
///
/// Skips blank lines, comments and directives other than `###`, and stops
/// at `##FASTA`.
pub struct GffReader<R: BufRead> {
    lines: LineIterator<R>,
    source: PathBuf,
    finished: bool,
}

impl<R: BufRead> GffReader<R> {
    /// `source` names the stream in I/O error messages
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Self {
        Self {
            lines: LineIterator::new(reader),
            source: source.into(),
            finished: false,
        }
    }

    /// Line number of the entry last returned
    pub fn line_number(&self) -> usize {
        self.lines.line_number()
    }
}

impl<R: BufRead> Iterator for GffReader<R> {
    type Item = Result<GffEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.lines.next_line()? {
                Ok(line) => line,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(PeakError::read(&self.source, e)));
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            if line == GROUP_TERMINATOR {
                return Some(Ok(GffEntry::Terminator));
            }
            if line.starts_with(FASTA_DIRECTIVE) {
                self.finished = true;
                break;
            }
            if line.starts_with('#') {
                continue;
            }

            let parsed = GffRecordView::parse(line.as_bytes()).map(|view| view.to_record());
            return Some(match parsed {
                Ok(record) => Ok(GffEntry::Record(record)),
                Err(e) => Err(PeakError::data(self.lines.line_number(), e.to_string())),
            });
        }
        None
    }
}
