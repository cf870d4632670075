//! Gene subfeature scan with intron inference
//!
//! After a gene record, its children follow until the `###` terminator.
//! Every child becomes a catalog interval; between consecutive exons of the
//! same transcript an intron interval is synthesized.

use crate::core::{composite_name, Interval, Result, Strand};
use crate::formats::{AnnotationRecord, GffEntry};

/// Whether a feature type opens a new transcript grouping
///
/// Exons listed after such a record belong to a different transcript than
/// those before it, so no intron may span the two.
pub fn is_transcript_marker(feature_type: &str) -> bool {
    feature_type.contains("RNA")
        || feature_type.contains("transcript")
        || feature_type.contains("gene_segment")
        || feature_type.ends_with("_overlapping_ncrna")
}

/// Per-gene scan state, created for one gene block and dropped at its end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptScanState {
    first_exon: bool,
    /// 1-based extent of the previous exon of the current transcript
    previous_exon: (u64, u64),
}

impl TranscriptScanState {
    pub fn new() -> Self {
        Self {
            first_exon: true,
            previous_exon: (0, 0),
        }
    }

    /// Advance over one subfeature, returning intron coordinates
    /// (0-based half-open) if the record closes one
    ///
    /// The intron is the genomic gap between this exon and the previous
    /// one, whichever order the transcript lists them in. Adjacent or
    /// overlapping exons leave no gap and close no intron.
    pub fn observe(&mut self, record: &AnnotationRecord) -> Option<(i64, i64)> {
        if is_transcript_marker(&record.feature_type) {
            self.first_exon = true;
        }
        if !record.is_exon() {
            return None;
        }

        let intron = if self.first_exon {
            None
        } else {
            let (prev_start, prev_end) = self.previous_exon;
            let start = prev_end.min(record.end) as i64;
            let end = prev_start.max(record.start) as i64 - 1;
            if start < end {
                Some((start, end))
            } else {
                log::debug!(
                    "No intron before {} {}: exons {}-{} and {}-{} leave no gap",
                    record.feature_type,
                    record.id,
                    prev_start,
                    prev_end,
                    record.start,
                    record.end
                );
                None
            }
        };
        self.previous_exon = (record.start, record.end);
        self.first_exon = false;
        intron
    }
}

impl Default for TranscriptScanState {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts from one gene block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub subfeatures: usize,
    pub introns: usize,
    /// Whether the block ended with `###` rather than end of input
    pub terminated: bool,
}

/// Consume the subfeatures of `gene` from `entries` up to the terminator
///
/// Each interval is handed to `emit` in document order, an intron right
/// before the exon that closes it. All intervals take the gene's strand.
/// The terminator itself is consumed but not emitted.
pub fn walk_subfeatures<I, F>(
    gene: &AnnotationRecord,
    entries: &mut I,
    mut emit: F,
) -> Result<WalkSummary>
where
    I: Iterator<Item = Result<GffEntry>>,
    F: FnMut(Interval) -> Result<()>,
{
    let strand: Option<Strand> = gene.strand;
    let mut state = TranscriptScanState::new();
    let mut summary = WalkSummary::default();

    for entry in entries {
        let record = match entry? {
            GffEntry::Terminator => {
                summary.terminated = true;
                break;
            }
            GffEntry::Record(record) => record,
        };

        if let Some((start, end)) = state.observe(&record) {
            emit(Interval {
                chrom: record.seqid.clone(),
                start,
                end,
                name: composite_name("intron", &record.name, &record.id),
                strand,
            })?;
            summary.introns += 1;
        }

        let name = composite_name(&record.feature_type, &record.name, &record.id);
        emit(Interval::from_gff(
            &record.seqid,
            record.start,
            record.end,
            name,
            strand,
        ))?;
        summary.subfeatures += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, start: u64, end: u64, id: &str) -> AnnotationRecord {
        AnnotationRecord {
            seqid: "1".to_string(),
            feature_type: kind.to_string(),
            start,
            end,
            strand: Some(Strand::Minus),
            name: "N".to_string(),
            id: id.to_string(),
        }
    }

    fn walk(gene: &AnnotationRecord, children: Vec<GffEntry>) -> (Vec<Interval>, WalkSummary) {
        let mut out = Vec::new();
        let mut entries = children.into_iter().map(Ok);
        let summary = walk_subfeatures(gene, &mut entries, |iv| {
            out.push(iv);
            Ok(())
        })
        .unwrap();
        (out, summary)
    }

    #[test]
    fn test_transcript_markers() {
        for kind in ["mRNA", "lnc_RNA", "transcript", "primary_transcript", "V_gene_segment", "antisense_overlapping_ncrna"] {
            assert!(is_transcript_marker(kind), "{}", kind);
        }
        for kind in ["exon", "CDS", "five_prime_UTR", "gene"] {
            assert!(!is_transcript_marker(kind), "{}", kind);
        }
    }

    #[test]
    fn test_introns_between_exons() {
        let gene = record("gene", 100, 1000, "g1");
        let (out, summary) = walk(
            &gene,
            vec![
                GffEntry::Record(record("mRNA", 100, 1000, "t1")),
                GffEntry::Record(record("exon", 100, 200, "e1")),
                GffEntry::Record(record("exon", 301, 400, "e2")),
                GffEntry::Record(record("exon", 901, 1000, "e3")),
                GffEntry::Terminator,
            ],
        );

        assert_eq!(summary.introns, 2);
        assert_eq!(summary.subfeatures, 4);
        assert!(summary.terminated);

        let names: Vec<&str> = out.iter().map(|iv| iv.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["mRNA;N;t1", "exon;N;e1", "intron;N;e2", "exon;N;e2", "intron;N;e3", "exon;N;e3"]
        );
        assert_eq!((out[2].start, out[2].end), (200, 300));
        assert_eq!((out[4].start, out[4].end), (400, 900));
    }

    #[test]
    fn test_descending_exons_give_forward_intron() {
        let gene = record("gene", 200, 29570, "g1");
        let (out, summary) = walk(
            &gene,
            vec![
                GffEntry::Record(record("lnc_RNA", 200, 29570, "t1")),
                GffEntry::Record(record("exon", 29534, 29570, "e1")),
                GffEntry::Record(record("exon", 24738, 24891, "e2")),
                GffEntry::Record(record("exon", 301, 400, "e3")),
                GffEntry::Record(record("exon", 200, 300, "e4")),
                GffEntry::Terminator,
            ],
        );

        let introns: Vec<&Interval> = out.iter().filter(|iv| iv.name.starts_with("intron;")).collect();
        assert_eq!(summary.introns, 2);
        assert_eq!((introns[0].start, introns[0].end), (24891, 29533));
        assert_eq!(introns[0].name, "intron;N;e2");
        assert_eq!((introns[1].start, introns[1].end), (400, 24737));
        assert!(out.iter().all(|iv| iv.start < iv.end));
    }

    #[test]
    fn test_adjacent_and_overlapping_exons_close_no_intron() {
        let mut state = TranscriptScanState::new();
        assert_eq!(state.observe(&record("exon", 100, 200, "e1")), None);
        assert_eq!(state.observe(&record("exon", 201, 300, "e2")), None);
        assert_eq!(state.observe(&record("exon", 250, 400, "e3")), None);
        assert_eq!(state.observe(&record("exon", 402, 500, "e4")), Some((400, 401)));
    }

    #[test]
    fn test_no_intron_across_transcripts() {
        let gene = record("gene", 100, 1000, "g1");
        let (out, summary) = walk(
            &gene,
            vec![
                GffEntry::Record(record("mRNA", 100, 1000, "t1")),
                GffEntry::Record(record("exon", 100, 200, "e1")),
                GffEntry::Record(record("lnc_RNA", 100, 1000, "t2")),
                GffEntry::Record(record("exon", 501, 600, "e2")),
                GffEntry::Terminator,
            ],
        );
        assert_eq!(summary.introns, 0);
        assert!(out.iter().all(|iv| !iv.name.starts_with("intron")));
    }

    #[test]
    fn test_cds_does_not_break_exon_chain() {
        let gene = record("gene", 100, 1000, "g1");
        let (_, summary) = walk(
            &gene,
            vec![
                GffEntry::Record(record("exon", 100, 200, "e1")),
                GffEntry::Record(record("CDS", 150, 200, "c1")),
                GffEntry::Record(record("exon", 301, 400, "e2")),
            ],
        );
        assert_eq!(summary.introns, 1);
        assert!(!summary.terminated);
    }

    #[test]
    fn test_subfeatures_take_gene_strand() {
        let mut gene = record("gene", 100, 1000, "g1");
        gene.strand = Some(Strand::Plus);
        let (out, _) = walk(
            &gene,
            vec![GffEntry::Record(record("exon", 100, 200, "e1")), GffEntry::Terminator],
        );
        assert_eq!(out[0].strand, Some(Strand::Plus));
        assert_eq!((out[0].start, out[0].end), (99, 200));
    }

    #[test]
    fn test_stops_at_terminator() {
        let gene = record("gene", 100, 1000, "g1");
        let mut entries = vec![
            GffEntry::Record(record("exon", 100, 200, "e1")),
            GffEntry::Terminator,
            GffEntry::Record(record("gene", 5000, 6000, "g2")),
        ]
        .into_iter()
        .map(Ok);
        let summary = walk_subfeatures(&gene, &mut entries, |_| Ok(())).unwrap();
        assert_eq!(summary.subfeatures, 1);
        assert!(matches!(entries.next(), Some(Ok(GffEntry::Record(r))) if r.id == "g2"));
    }
}
