//! Coordinate conventions and catalog intervals
//!
//! GFF3 coordinates are 1-based and inclusive; catalog intervals are
//! 0-based half-open like BED. [`gff_to_bed`] is the one place where the
//! conversion happens, every catalog row is built through it.

use std::fmt;

/// Strand orientation
///
/// An unknown strand is modelled as `Option<Strand>::None` and written as `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use peak_classifier::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

/// Character used for an optional strand in BED output
pub fn strand_char(strand: Option<Strand>) -> char {
    strand.map(|s| s.to_char()).unwrap_or('.')
}

/// Translate 1-based inclusive `[start, end]` into 0-based half-open `[start - 1, end)`
///
/// # Examples
/// ```
/// use peak_classifier::core::gff_to_bed;
/// assert_eq!(gff_to_bed(1000, 2000), (999, 2000));
/// ```
pub fn gff_to_bed(start: u64, end: u64) -> (i64, i64) {
    (start as i64 - 1, end as i64)
}

/// Build the `kind;name;id` label carried in the catalog name column
pub fn composite_name(kind: &str, name: &str, id: &str) -> String {
    let mut label = String::with_capacity(kind.len() + name.len() + id.len() + 2);
    label.push_str(kind);
    label.push(';');
    label.push_str(name);
    label.push(';');
    label.push_str(id);
    label
}

/// One row of the augmented feature catalog (BED6, score always 0)
///
/// Coordinates are signed: upstream bins of genes close to the start of
/// a sequence extend below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub name: String,
    pub strand: Option<Strand>,
}

impl Interval {
    /// Build an interval from annotation coordinates via [`gff_to_bed`]
    pub fn from_gff(
        chrom: &str,
        start: u64,
        end: u64,
        name: String,
        strand: Option<Strand>,
    ) -> Self {
        let (start, end) = gff_to_bed(start, end);
        Self {
            chrom: chrom.to_string(),
            start,
            end,
            name,
            strand,
        }
    }

    /// Length in bases (zero for collapsed bins)
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t0\t{}",
            self.chrom,
            self.start,
            self.end,
            self.name,
            strand_char(self.strand)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gff_to_bed_single_base() {
        assert_eq!(gff_to_bed(1, 1), (0, 1));
    }

    #[test]
    fn test_composite_name() {
        assert_eq!(composite_name("exon", "BRCA1", "exon-1"), "exon;BRCA1;exon-1");
        assert_eq!(composite_name("gene", ".", "."), "gene;.;.");
    }

    #[test]
    fn test_interval_display() {
        let iv = Interval::from_gff("1", 1001, 2000, "gene;A;g1".to_string(), Some(Strand::Minus));
        assert_eq!(iv.to_string(), "1\t1000\t2000\tgene;A;g1\t0\t-");
        assert_eq!(iv.len(), 1000);
    }

    #[test]
    fn test_interval_display_unknown_strand() {
        let iv = Interval::from_gff("2", 5, 10, "region;.;.".to_string(), None);
        assert_eq!(iv.to_string(), "2\t4\t10\tregion;.;.\t0\t.");
    }

    #[test]
    fn test_negative_interval_display() {
        let iv = Interval {
            chrom: "1".to_string(),
            start: -5001,
            end: 3999,
            name: "upstream10000;gene;A;g1".to_string(),
            strand: Some(Strand::Plus),
        };
        assert_eq!(iv.to_string(), "1\t-5001\t3999\tupstream10000;gene;A;g1\t0\t+");
    }
}
