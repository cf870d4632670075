//! Keep the highest-ranked feature per peak
//!
//! A classification file lists every catalog interval a peak overlaps.
//! Given an ordered list of feature classes (`exon intron upstream ...`),
//! this keeps, for each peak, the single row of the best-ranked class and
//! drops peaks overlapping none of the listed classes.

use crate::core::{io, LineIterator, PeakError, Result};
use std::io::{BufRead, Write};
use std::path::Path;

const NAME_COLUMN: usize = 5;
const MIN_COLUMNS: usize = 8;

/// Class of a catalog name: the part before the first `;`
pub fn feature_class(name: &str) -> &str {
    name.split(';').next().unwrap_or(name)
}

/// Whether a listed feature matches a class
///
/// Matching ignores case; a trailing run of digits on the class is allowed
/// so `upstream` covers every `upstream<distance>` bin.
pub fn feature_matches(class: &str, feature: &str) -> bool {
    if class.len() < feature.len() || !class.is_char_boundary(feature.len()) {
        return false;
    }
    let (head, tail) = class.split_at(feature.len());
    head.eq_ignore_ascii_case(feature) && tail.bytes().all(|b| b.is_ascii_digit())
}

/// 0-based position of the first listed feature matching `name`
pub fn feature_rank(name: &str, features: &[String]) -> Option<usize> {
    let class = feature_class(name);
    features.iter().position(|f| feature_matches(class, f))
}

/// Filtering statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub unique_peaks: usize,
    /// Kept rows per listed feature, in list order
    pub counts: Vec<(String, usize)>,
}

impl FilterStats {
    pub fn percent(&self, index: usize) -> f64 {
        match self.counts.get(index) {
            Some((_, count)) if self.unique_peaks > 0 => {
                100.0 * *count as f64 / self.unique_peaks as f64
            }
            _ => 0.0,
        }
    }
}

struct PeakGroup {
    key: (String, String, String),
    best: Option<(usize, String)>,
}

impl PeakGroup {
    fn flush<W: Write>(self, writer: &mut W, stats: &mut FilterStats, output: &Path) -> Result<()> {
        stats.unique_peaks += 1;
        if let Some((rank, line)) = self.best {
            stats.counts[rank].1 += 1;
            writeln!(writer, "{}", line).map_err(|e| PeakError::write(output, e))?;
        }
        Ok(())
    }
}

/// Filter a classification stream grouped by peak
pub fn filter_overlaps<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    features: &[String],
    source: &Path,
    output: &Path,
) -> Result<FilterStats> {
    let mut stats = FilterStats {
        unique_peaks: 0,
        counts: features.iter().map(|f| (f.clone(), 0)).collect(),
    };
    let mut lines = LineIterator::new(reader);
    let mut line_number = 0;
    let mut group: Option<PeakGroup> = None;

    while let Some(line) = lines.next_line() {
        line_number += 1;
        let line = line.map_err(|e| PeakError::read(source, e))?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_COLUMNS {
            return Err(PeakError::data(
                line_number,
                format!("expected {} columns, found {}", MIN_COLUMNS, fields.len()),
            ));
        }
        let key = (
            fields[0].to_string(),
            fields[1].to_string(),
            fields[2].to_string(),
        );
        let rank = feature_rank(fields[NAME_COLUMN], features);

        let same_peak = group.as_ref().map_or(false, |g| g.key == key);
        if !same_peak {
            if let Some(done) = group.take() {
                done.flush(writer, &mut stats, output)?;
            }
            group = Some(PeakGroup { key, best: None });
        }

        if let (Some(rank), Some(current)) = (rank, group.as_mut()) {
            let better = current.best.as_ref().map_or(true, |(best, _)| rank < *best);
            if better {
                current.best = Some((rank, line.to_string()));
            }
        }
    }

    if let Some(done) = group.take() {
        done.flush(writer, &mut stats, output)?;
    }
    Ok(stats)
}

/// Filter `input` into `output` (either may be `-`)
pub fn filter_file(input: &Path, output: &Path, features: &[String]) -> Result<FilterStats> {
    if features.is_empty() {
        return Err(PeakError::config("at least one feature is required"));
    }
    let reader = io::open_input(input)?;
    let result = io::create_output(output).and_then(|mut writer| {
        let stats = filter_overlaps(reader, &mut writer, features, input, output)?;
        writer.flush().map_err(|e| PeakError::write(output, e))?;
        Ok(stats)
    });
    if result.is_err() {
        io::remove_partial(output);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_feature_class() {
        assert_eq!(feature_class("exon;A;e1"), "exon");
        assert_eq!(feature_class("upstream1000;gene;A;g1"), "upstream1000");
        assert_eq!(feature_class("upstream-beyond"), "upstream-beyond");
    }

    #[test]
    fn test_feature_matches() {
        assert!(feature_matches("exon", "exon"));
        assert!(feature_matches("Exon", "EXON"));
        assert!(feature_matches("upstream1000", "upstream"));
        assert!(feature_matches("upstream1000", "upstream1000"));
        assert!(!feature_matches("upstream-beyond", "upstream"));
        assert!(feature_matches("upstream-beyond", "upstream-beyond"));
        assert!(!feature_matches("exon", "intron"));
        assert!(!feature_matches("five_prime_UTR", "five"));
    }

    #[test]
    fn test_feature_rank() {
        let list = features(&["exon", "intron", "upstream"]);
        assert_eq!(feature_rank("exon;A;e1", &list), Some(0));
        assert_eq!(feature_rank("upstream10000;gene;A;g1", &list), Some(2));
        assert_eq!(feature_rank("gene;A;g1", &list), None);
    }

    #[test]
    fn test_keeps_best_row_per_peak() {
        let input = "#Chr\tP-start\tP-end\tF-start\tF-end\tF-name\tStrand\tOverlap\n\
                     1\t100\t150\t0\t1000\tgene;A;g1\t+\t50\n\
                     1\t100\t150\t120\t400\tintron;A;e2\t+\t30\n\
                     1\t100\t150\t90\t120\texon;A;e1\t+\t20\n\
                     1\t500\t600\t450\t700\tintron;A;e3\t+\t100\n\
                     2\t10\t20\t-1\t-1\tupstream-beyond\t.\t10\n\
                     2\t50\t60\t40\t70\tupstream1000;gene;B;g2\t-\t10\n";
        let mut out = Vec::new();
        let stats = filter_overlaps(
            input.as_bytes(),
            &mut out,
            &features(&["exon", "intron", "upstream"]),
            Path::new("overlaps.tsv"),
            Path::new("filtered.tsv"),
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1\t100\t150\t90\t120\texon;A;e1\t+\t20\n\
             1\t500\t600\t450\t700\tintron;A;e3\t+\t100\n\
             2\t50\t60\t40\t70\tupstream1000;gene;B;g2\t-\t10\n"
        );
        assert_eq!(stats.unique_peaks, 4);
        assert_eq!(
            stats.counts,
            vec![("exon".to_string(), 1), ("intron".to_string(), 1), ("upstream".to_string(), 1)]
        );
        assert!((stats.percent(0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_row_is_data_error() {
        let mut out = Vec::new();
        let err = filter_overlaps(
            "1\t100\t150\n".as_bytes(),
            &mut out,
            &features(&["exon"]),
            Path::new("overlaps.tsv"),
            Path::new("filtered.tsv"),
        )
        .unwrap_err();
        assert!(matches!(err, PeakError::Data { line: 1, .. }));
    }

    #[test]
    fn test_read_error_names_source() {
        let input: &[u8] = b"1\t100\t150\t\xff\n";
        let mut out = Vec::new();
        let err = filter_overlaps(
            input,
            &mut out,
            &features(&["exon"]),
            Path::new("overlaps.tsv"),
            Path::new("filtered.tsv"),
        )
        .unwrap_err();
        match err {
            PeakError::Io { path, .. } => assert_eq!(path, Path::new("overlaps.tsv")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_requires_features() {
        let err = filter_file(Path::new("in.tsv"), Path::new("out.tsv"), &[]).unwrap_err();
        assert!(matches!(err, PeakError::Configuration(_)));
    }
}
