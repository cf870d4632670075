//! Feature catalog augmentation
//!
//! Turns GFF3 annotation into a BED6 catalog that, besides the annotated
//! features, holds synthesized introns and strand-aware upstream bins.

pub mod driver;
pub mod upstream;
pub mod walker;

pub use driver::{augment_file, augment_stream, AugmentOutcome, AugmentStats, CATALOG_HEADER};
pub use upstream::upstream_bins;
pub use walker::{is_transcript_marker, walk_subfeatures, TranscriptScanState, WalkSummary};
