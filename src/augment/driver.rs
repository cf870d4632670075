//! Augmentation driver
//!
//! One forward pass over the annotation stream. Gene records open a block
//! handled by the subfeature walker and the upstream bin generator; other
//! records are converted directly. The resulting catalog keeps per-gene
//! document order and separates blocks with `###`.

use crate::augment::upstream::upstream_bins;
use crate::augment::walker::walk_subfeatures;
use crate::core::{
    composite_name, io, AugmentConfig, Interval, PeakError, Result, Strand,
};
use crate::formats::{AnnotationRecord, GffEntry, GffReader, GROUP_TERMINATOR};
use std::io::Write;
use std::path::Path;

/// First line of every augmented catalog
pub const CATALOG_HEADER: &str = "#CHROM\tFirst\tLast+1\tStrand+Feature";

/// Feature type dropped from the catalog
const CHROMOSOME_TYPE: &str = "chromosome";

/// Augmentation statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentStats {
    /// Annotation records read (terminators excluded)
    pub records: usize,
    pub genes: usize,
    pub subfeatures: usize,
    pub introns: usize,
    pub upstream_bins: usize,
    /// Non-gene records emitted as their own block
    pub standalone: usize,
    /// Records on sequences rejected by the chromosome filter
    pub filtered: usize,
    /// `chromosome` records
    pub dropped: usize,
}

/// Result of [`augment_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AugmentOutcome {
    /// A catalog of the expected name already existed and was reused as is
    Cached,
    Built(AugmentStats),
}

struct CatalogWriter<'a, W: Write> {
    inner: &'a mut W,
    path: &'a Path,
}

impl<'a, W: Write> CatalogWriter<'a, W> {
    fn interval(&mut self, interval: &Interval) -> Result<()> {
        writeln!(self.inner, "{}", interval).map_err(|e| PeakError::write(self.path, e))
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.inner, "{}", text).map_err(|e| PeakError::write(self.path, e))
    }
}

fn record_interval(record: &AnnotationRecord) -> Interval {
    Interval::from_gff(
        &record.seqid,
        record.start,
        record.end,
        composite_name(&record.feature_type, &record.name, &record.id),
        record.strand,
    )
}

/// Augment an annotation stream into `writer`
///
/// `output` only names the destination in error messages.
pub fn augment_stream<I, W>(
    entries: I,
    writer: &mut W,
    config: &AugmentConfig,
    output: &Path,
) -> Result<AugmentStats>
where
    I: Iterator<Item = Result<GffEntry>>,
    W: Write,
{
    let mut out = CatalogWriter { inner: writer, path: output };
    let mut stats = AugmentStats::default();
    let mut entries = entries;

    out.line(CATALOG_HEADER)?;

    while let Some(entry) = entries.next() {
        let record = match entry? {
            GffEntry::Record(record) => record,
            GffEntry::Terminator => {
                // Blocks are closed as they are written
                continue;
            }
        };
        stats.records += 1;

        if !config.chrom_filter.accepts(&record.seqid) {
            stats.filtered += 1;
            continue;
        }

        if record.is_gene() {
            stats.genes += 1;
            out.interval(&record_interval(&record))?;

            let bins = upstream_bins(&record, &config.boundaries);
            if record.strand == Some(Strand::Plus) {
                for bin in &bins {
                    out.interval(bin)?;
                }
            }

            let summary = walk_subfeatures(&record, &mut entries, |interval| {
                out.interval(&interval)
            })?;
            stats.records += summary.subfeatures;
            stats.subfeatures += summary.subfeatures;
            stats.introns += summary.introns;

            if record.strand == Some(Strand::Minus) {
                for bin in &bins {
                    out.interval(bin)?;
                }
            }
            stats.upstream_bins += bins.len();
            out.line(GROUP_TERMINATOR)?;
        } else if record.feature_type == CHROMOSOME_TYPE {
            stats.dropped += 1;
        } else {
            stats.standalone += 1;
            out.interval(&record_interval(&record))?;
            out.line(GROUP_TERMINATOR)?;
        }
    }

    Ok(stats)
}

/// Build the augmented catalog at `output` from the annotation at `input`
///
/// An existing `output` is reused without looking at its content unless
/// `force` is set. On failure the partial catalog is removed.
pub fn augment_file(
    input: &Path,
    output: &Path,
    config: &AugmentConfig,
    force: bool,
) -> Result<AugmentOutcome> {
    if output.exists() {
        if !force {
            log::info!("Using existing {}...", output.display());
            return Ok(AugmentOutcome::Cached);
        }
        log::info!("Rebuilding {}...", output.display());
    }

    let reader = io::open_input(input)?;
    log::info!("Augmenting GFF3 data from {}...", input.display());

    let result = io::create_output(output).and_then(|mut writer| {
        let stats = augment_stream(GffReader::new(reader, input), &mut writer, config, output)?;
        writer.flush().map_err(|e| PeakError::write(output, e))?;
        Ok(stats)
    });

    match result {
        Ok(stats) => {
            log::debug!("Augmentation stats: {:?}", stats);
            Ok(AugmentOutcome::Built(stats))
        }
        Err(e) => {
            log::error!("Augmentation failed: {}", e);
            io::remove_partial(output);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoundaryList, ChromFilter};

    fn run(gff: &str, config: &AugmentConfig) -> (String, AugmentStats) {
        let mut out = Vec::new();
        let stats = augment_stream(
            GffReader::new(gff.as_bytes(), "test.gff3"),
            &mut out,
            config,
            Path::new("test-augmented.bed"),
        )
        .unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    fn config(boundaries: &str) -> AugmentConfig {
        AugmentConfig {
            boundaries: BoundaryList::from_csv(boundaries).unwrap(),
            chrom_filter: ChromFilter::NumericOnly,
        }
    }

    #[test]
    fn test_plus_gene_block_order() {
        let gff = "##gff-version 3\n\
                   1\t.\tgene\t5000\t8000\t.\t+\t.\tID=g1;Name=A\n\
                   1\t.\tmRNA\t5000\t8000\t.\t+\t.\tID=t1;Name=A-201\n\
                   1\t.\texon\t5000\t5100\t.\t+\t.\tID=e1;Name=A-201\n\
                   1\t.\texon\t7001\t8000\t.\t+\t.\tID=e2;Name=A-201\n\
                   ###\n";
        let (text, stats) = run(gff, &config("1000,10000"));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                CATALOG_HEADER,
                "1\t4999\t8000\tgene;A;g1\t0\t+",
                "1\t-5001\t3999\tupstream10000;gene;A;g1\t0\t+",
                "1\t3999\t4999\tupstream1000;gene;A;g1\t0\t+",
                "1\t4999\t8000\tmRNA;A-201;t1\t0\t+",
                "1\t4999\t5100\texon;A-201;e1\t0\t+",
                "1\t5100\t7000\tintron;A-201;e2\t0\t+",
                "1\t7000\t8000\texon;A-201;e2\t0\t+",
                "###",
            ]
        );
        assert_eq!(stats.genes, 1);
        assert_eq!(stats.subfeatures, 3);
        assert_eq!(stats.introns, 1);
        assert_eq!(stats.upstream_bins, 2);
        assert_eq!(stats.records, 4);
    }

    #[test]
    fn test_minus_gene_bins_follow_subfeatures() {
        let gff = "1\t.\tgene\t500\t2000\t.\t-\t.\tID=g2;Name=B\n\
                   1\t.\texon\t500\t2000\t.\t-\t.\tID=e1\n\
                   ###\n";
        let (text, _) = run(gff, &config("1000,10000"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            &lines[1..],
            &[
                "1\t499\t2000\tgene;B;g2\t0\t-",
                "1\t499\t2000\texon;.;e1\t0\t-",
                "1\t2000\t3000\tupstream1000;gene;B;g2\t0\t-",
                "1\t3000\t12000\tupstream10000;gene;B;g2\t0\t-",
                "###",
            ]
        );
    }

    #[test]
    fn test_filtering_and_standalone_records() {
        let gff = "1\t.\tchromosome\t1\t248956422\t.\t.\t.\tID=chromosome:1\n\
                   X\t.\tgene\t100\t200\t.\t+\t.\tID=gx\n\
                   X\t.\texon\t100\t200\t.\t+\t.\tID=ex\n\
                   ###\n\
                   2\t.\tbiological_region\t10\t20\t.\t.\t.\tID=r1\n\
                   ###\n";
        let (text, stats) = run(gff, &config("1000"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            &lines[1..],
            &["2\t9\t20\tbiological_region;.;r1\t0\t.", "###"]
        );
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.filtered, 2);
        assert_eq!(stats.standalone, 1);
    }

    #[test]
    fn test_all_sequences_filter() {
        let gff = "X\t.\tgene\t100\t200\t.\t.\t.\tID=gx\n###\n";
        let cfg = AugmentConfig {
            chrom_filter: ChromFilter::All,
            ..config("1000")
        };
        let (text, stats) = run(gff, &cfg);
        assert_eq!(stats.genes, 1);
        // Unknown strand: gene row only, no bins
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_gene_at_end_of_input_is_closed() {
        let gff = "1\t.\tgene\t100\t200\t.\t-\t.\tID=g1\n1\t.\texon\t100\t200\t.\t-\t.\tID=e1\n";
        let (text, _) = run(gff, &config("10"));
        assert_eq!(text.lines().last(), Some("###"));
    }

    #[test]
    fn test_data_error_propagates() {
        let gff = "1\t.\tgene\t100\t200\t.\t+\t.\tID=g1\n1\t.\texon\t100\t200\t.\t+\t.\n";
        let mut out = Vec::new();
        let err = augment_stream(
            GffReader::new(gff.as_bytes(), "test.gff3"),
            &mut out,
            &config("10"),
            Path::new("out.bed"),
        )
        .unwrap_err();
        assert!(matches!(err, PeakError::Data { line: 2, .. }));
    }

    const TRUNCATED_GFF: &str = "##gff-version 3\n\
                                 1\t.\tgene\t100\t200\t.\t+\t.\tID=g1\n\
                                 1\t.\texon\t100\t200\t.\t+\t.\tID=e1\n\
                                 ###\n\
                                 1\t.\tgene\t500\tfive-hundred\t.\t+\t.\tID=g2\n";

    #[test]
    fn test_failed_build_removes_partial_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.gff3");
        let output = dir.path().join("broken-augmented.bed");
        std::fs::write(&input, TRUNCATED_GFF).unwrap();

        let err = augment_file(&input, &output, &config("1000"), false).unwrap_err();

        assert!(matches!(err, PeakError::Data { line: 5, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_failed_forced_rebuild_removes_old_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.gff3");
        let output = dir.path().join("broken-augmented.bed");
        std::fs::write(&input, TRUNCATED_GFF).unwrap();
        std::fs::write(&output, "#CHROM\tFirst\tLast+1\tStrand+Feature\n").unwrap();

        assert_eq!(
            augment_file(&input, &output, &config("1000"), false).unwrap(),
            AugmentOutcome::Cached
        );
        let err = augment_file(&input, &output, &config("1000"), true).unwrap_err();

        assert!(matches!(err, PeakError::Data { .. }));
        assert!(!output.exists());
    }
}
