//! peak-classifier - classify genomic peaks by the features they overlap
//!
//! Builds an augmented feature catalog from GFF3 annotation (annotated
//! features plus synthesized introns and upstream bins) and classifies BED
//! peaks against it with an external interval intersection engine.
//!
//! # Example
//!
//! ```ignore
//! use peak_classifier::classify::{classify, BedtoolsIntersect, ExternalSort};
//! use peak_classifier::core::ClassifyConfig;
//! use std::path::Path;
//!
//! let stats = classify(
//!     Path::new("peaks.bed"),
//!     Path::new("Homo_sapiens.GRCh38.107.gff3"),
//!     Path::new("overlaps.tsv"),
//!     &ClassifyConfig::default(),
//!     &ExternalSort::detect(),
//!     &BedtoolsIntersect::default(),
//! )?;
//! ```

pub mod augment;
pub mod classify;
pub mod core;
pub mod formats;

// Re-export commonly used types
pub use augment::{augment_file, augment_stream, AugmentOutcome, AugmentStats};
pub use classify::{classify, filter_file, ClassifyStats, FilterStats};
pub use core::{
    AugmentConfig, BoundaryList, ChromFilter, ClassifyConfig, Interval, OverlapParams, PeakError,
    Result, Strand,
};
