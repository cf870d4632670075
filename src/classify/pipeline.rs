//! End-to-end peak classification
//!
//! augment (cached) -> sort (cached) -> stage peaks -> intersect ->
//! reinterpret -> write. Any failing stage removes its own partial output.

use crate::augment::{augment_file, AugmentOutcome};
use crate::classify::external::{CatalogSorter, OverlapEngine};
use crate::classify::overlap::{reinterpret, OverlapRow, CLASSIFICATION_HEADER};
use crate::core::{io, ClassifyConfig, PeakError, Result};
use crate::formats::stage_peaks;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Stem used for derived file names when the annotation comes from stdin
pub const STDIN_GFF_STEM: &str = "unknown-stdin-gff";

const AUGMENTED_SUFFIX: &str = "-augmented.bed";
const SORTED_SUFFIX: &str = "-augmented+sorted.bed";

/// Cache file names derived from the annotation file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub augmented: PathBuf,
    pub sorted: PathBuf,
}

impl CatalogPaths {
    /// `<stem>-augmented.bed` and `<stem>-augmented+sorted.bed`, where the
    /// stem is the annotation path up to `.gff3`
    pub fn from_annotation(gff: &Path) -> Self {
        let stem = if io::is_stdio(gff) {
            STDIN_GFF_STEM.to_string()
        } else {
            let text = gff.to_string_lossy();
            match text.find(".gff3") {
                Some(idx) => text[..idx].to_string(),
                None => gff.with_extension("").to_string_lossy().into_owned(),
            }
        };
        Self {
            augmented: PathBuf::from(format!("{}{}", stem, AUGMENTED_SUFFIX)),
            sorted: PathBuf::from(format!("{}{}", stem, SORTED_SUFFIX)),
        }
    }
}

/// Classification statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyStats {
    pub augment: AugmentOutcome,
    pub sorted_cached: bool,
    pub peaks: usize,
    pub rows: usize,
    pub upstream_beyond: usize,
}

/// Sort the augmented catalog unless a sorted copy is already present
///
/// Returns whether the cached copy was used.
pub fn sort_catalog(
    sorter: &dyn CatalogSorter,
    paths: &CatalogPaths,
    force: bool,
) -> Result<bool> {
    if paths.sorted.exists() && !force {
        log::info!("Using existing {}...", paths.sorted.display());
        return Ok(true);
    }

    log::info!("Sorting...");
    if let Err(e) = sorter.sort(&paths.augmented, &paths.sorted) {
        log::error!("Sort failed. Removing {}...", paths.sorted.display());
        io::remove_partial(&paths.sorted);
        return Err(e);
    }
    Ok(false)
}

/// Classify the peaks in `peaks` against the annotation in `gff`
pub fn classify(
    peaks: &Path,
    gff: &Path,
    output: &Path,
    config: &ClassifyConfig,
    sorter: &dyn CatalogSorter,
    engine: &dyn OverlapEngine,
) -> Result<ClassifyStats> {
    let paths = CatalogPaths::from_annotation(gff);
    let peak_reader = io::open_input(peaks)?;

    let augment = augment_file(gff, &paths.augmented, &config.augment, config.force_rebuild)?;
    let sorted_cached = sort_catalog(sorter, &paths, config.force_rebuild)?;

    let staged = tempfile::Builder::new()
        .prefix("peak-classifier-")
        .suffix(".bed")
        .tempfile()
        .map_err(|e| PeakError::write(std::env::temp_dir(), e))?;
    let peak_count = {
        let mut writer = BufWriter::new(staged.as_file());
        let count = stage_peaks(peak_reader, &mut writer, config.midpoints, peaks, staged.path())?;
        writer.flush().map_err(|e| PeakError::write(staged.path(), e))?;
        count
    };
    if config.midpoints {
        log::info!("Reduced {} peaks to their midpoints", peak_count);
    }

    log::info!("Finding intersects...");
    let result = io::create_output(output).and_then(|mut writer| {
        let mut rows = 0;
        let mut upstream_beyond = 0;

        writeln!(writer, "{}", CLASSIFICATION_HEADER).map_err(|e| PeakError::write(output, e))?;
        engine.intersect(staged.path(), &paths.sorted, &config.overlap, &mut |line| {
            let row = OverlapRow::parse(line)
                .map_err(|e| PeakError::data(rows + 1, format!("overlap engine output: {}", e)))?;
            let classified = reinterpret(row);
            if classified.is_upstream_beyond() {
                upstream_beyond += 1;
            }
            rows += 1;
            writeln!(writer, "{}", classified).map_err(|e| PeakError::write(output, e))
        })?;
        writer.flush().map_err(|e| PeakError::write(output, e))?;
        Ok((rows, upstream_beyond))
    });

    match result {
        Ok((rows, upstream_beyond)) => Ok(ClassifyStats {
            augment,
            sorted_cached,
            peaks: peak_count,
            rows,
            upstream_beyond,
        }),
        Err(e) => {
            io::remove_partial(output);
            Err(e)
        }
    }
}
