//! Run configuration
//!
//! All values are validated here, before any file is opened.

use crate::core::boundaries::BoundaryList;
use crate::core::error::{PeakError, Result};

/// Smallest accepted minimum-overlap fraction (a single base)
pub const MIN_OVERLAP_FRACTION: f64 = 1.0e-9;
/// Largest accepted minimum-overlap fraction
pub const MAX_OVERLAP_FRACTION: f64 = 1.0;

/// Which annotation sequences take part in augmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromFilter {
    /// Keep only sequences whose id is a plain decimal number (autosomes in
    /// Ensembl-style naming)
    #[default]
    NumericOnly,
    /// Keep every sequence
    All,
}

impl ChromFilter {
    pub fn accepts(&self, seqid: &str) -> bool {
        match self {
            ChromFilter::NumericOnly => {
                !seqid.is_empty() && seqid.bytes().all(|b| b.is_ascii_digit())
            }
            ChromFilter::All => true,
        }
    }
}

/// Settings for building the augmented catalog
#[derive(Debug, Clone, Default)]
pub struct AugmentConfig {
    pub boundaries: BoundaryList,
    pub chrom_filter: ChromFilter,
}

/// Minimum-overlap requirements handed to the overlap engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapParams {
    /// Minimum fraction of the peak that must overlap (`-f`)
    pub min_peak_fraction: f64,
    /// Minimum fraction of the catalog interval that must overlap (`-F`)
    pub min_feature_fraction: f64,
    /// Either fraction suffices instead of both (`-e`)
    pub either: bool,
}

impl OverlapParams {
    pub fn new(min_peak_fraction: f64, min_feature_fraction: f64, either: bool) -> Result<Self> {
        validate_fraction("minimum peak overlap", min_peak_fraction)?;
        validate_fraction("minimum GFF overlap", min_feature_fraction)?;
        Ok(Self {
            min_peak_fraction,
            min_feature_fraction,
            either,
        })
    }
}

impl Default for OverlapParams {
    fn default() -> Self {
        Self {
            min_peak_fraction: MIN_OVERLAP_FRACTION,
            min_feature_fraction: MIN_OVERLAP_FRACTION,
            either: false,
        }
    }
}

fn validate_fraction(what: &str, value: f64) -> Result<()> {
    if !(MIN_OVERLAP_FRACTION..=MAX_OVERLAP_FRACTION).contains(&value) {
        return Err(PeakError::config(format!(
            "{} must be between {:e} and {}, got {}",
            what, MIN_OVERLAP_FRACTION, MAX_OVERLAP_FRACTION, value
        )));
    }
    Ok(())
}

/// Settings for a full classification run
#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    pub augment: AugmentConfig,
    pub overlap: OverlapParams,
    /// Reduce each peak to its midpoint base before intersecting
    pub midpoints: bool,
    /// Rebuild the augmented and sorted catalogs even if they exist
    pub force_rebuild: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            augment: AugmentConfig::default(),
            overlap: OverlapParams::default(),
            midpoints: false,
            force_rebuild: false,
        }
    }
}
