//! Upstream (promoter) bin synthesis
//!
//! For a gene and a boundary list `[0, b1, b2, ...]`, bin `c` covers the
//! bases `(b[c], b[c + 1]]` upstream of the transcription start: before the
//! gene start on the plus strand, past the gene end on the minus strand.

use crate::core::{composite_name, BoundaryList, Interval, Strand};
use crate::formats::AnnotationRecord;

/// Name of an upstream bin: `upstream<far edge>;type;name;id`
fn bin_name(far_edge: u64, gene: &AnnotationRecord) -> String {
    format!(
        "upstream{};{}",
        far_edge,
        composite_name(&gene.feature_type, &gene.name, &gene.id)
    )
}

/// Generate the upstream bins of `gene`, in ascending genomic order
///
/// Plus-strand bins come out farthest first, minus-strand bins nearest
/// first. Genes without a known strand have no upstream side and yield
/// nothing.
pub fn upstream_bins(gene: &AnnotationRecord, boundaries: &BoundaryList) -> Vec<Interval> {
    let strand = match gene.strand {
        Some(strand) => strand,
        None => return Vec::new(),
    };

    let mut bins: Vec<Interval> = (0..boundaries.bin_count())
        .filter_map(|c| boundaries.bin(c))
        .map(|(near, far)| {
            let (start, end) = match strand {
                Strand::Plus => {
                    let tss = gene.start as i64;
                    (tss - far as i64 - 1, tss - near as i64 - 1)
                }
                Strand::Minus => {
                    let tss = gene.end as i64;
                    (tss + near as i64, tss + far as i64)
                }
            };
            Interval {
                chrom: gene.seqid.clone(),
                start,
                end,
                name: bin_name(far, gene),
                strand: Some(strand),
            }
        })
        .collect();

    if strand == Strand::Plus {
        bins.reverse();
    }
    bins
}
