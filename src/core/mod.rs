//! Core types shared by augmentation and classification
//!
//! Coordinate translation, the upstream boundary list, run configuration,
//! error types and stream helpers.

pub mod boundaries;
pub mod config;
pub mod coords;
mod error;
pub mod io;

pub use boundaries::{BoundaryList, DEFAULT_UPSTREAM_BOUNDARIES};
pub use config::{
    AugmentConfig, ChromFilter, ClassifyConfig, OverlapParams, MAX_OVERLAP_FRACTION,
    MIN_OVERLAP_FRACTION,
};
pub use coords::{composite_name, gff_to_bed, strand_char, Interval, Strand};
pub use error::{
    IoKind, PeakError, Result, EXIT_CANTCREAT, EXIT_DATAERR, EXIT_NOINPUT, EXIT_SOFTWARE,
    EXIT_USAGE,
};
pub use io::{create_output, open_input, remove_partial, LineIterator};
