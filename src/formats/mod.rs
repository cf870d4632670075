//! File format adapters
//!
//! Readers for GFF3 annotation and BED peak files.

pub mod bed;
pub mod gff;

pub use bed::{stage_peaks, BedParseError, BedRecordView, PeakRecord};
pub use gff::{
    AnnotationRecord, GffEntry, GffParseError, GffReader, GffRecordView, GROUP_TERMINATOR,
};
