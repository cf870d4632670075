//! peak-classifier CLI entry point
//!
//! Classify peaks in a BED file according to the GFF3 features, introns and
//! upstream regions they overlap.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use peak_classifier::augment::{augment_file, AugmentOutcome};
use peak_classifier::classify::{self, BedtoolsIntersect, CatalogPaths, ExternalSort};
use peak_classifier::core::{
    AugmentConfig, BoundaryList, ChromFilter, ClassifyConfig, OverlapParams, PeakError,
    DEFAULT_UPSTREAM_BOUNDARIES, MIN_OVERLAP_FRACTION,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Which annotation sequences to keep (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ChromFilterArg {
    /// Only purely numeric sequence ids (autosomes)
    #[default]
    #[value(name = "numeric")]
    Numeric,
    /// Every sequence
    #[value(name = "all")]
    All,
}

impl From<ChromFilterArg> for ChromFilter {
    fn from(arg: ChromFilterArg) -> Self {
        match arg {
            ChromFilterArg::Numeric => ChromFilter::NumericOnly,
            ChromFilterArg::All => ChromFilter::All,
        }
    }
}

#[derive(Parser)]
#[command(name = "peak-classifier")]
#[command(about = "Classify peaks by the GFF3 features, introns and upstream regions they overlap")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CatalogArgs {
    /// Distances upstream of the TSS delimiting upstream bins, comma-separated with no space.
    /// 1000,10000 yields bins for 1-1000 and 1001-10000 bases upstream.
    #[arg(long = "upstream-boundaries", default_value = DEFAULT_UPSTREAM_BOUNDARIES)]
    upstream_boundaries: String,
    /// Annotation sequences to include
    #[arg(long = "chrom-filter", default_value = "numeric")]
    chrom_filter: ChromFilterArg,
    /// Rebuild cached catalogs even if files of the expected name exist
    #[arg(long)]
    force: bool,
}

impl CatalogArgs {
    fn augment_config(&self) -> Result<AugmentConfig, PeakError> {
        Ok(AugmentConfig {
            boundaries: BoundaryList::from_csv(&self.upstream_boundaries)?,
            chrom_filter: self.chrom_filter.into(),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Classify BED peaks against a GFF3 annotation
    Classify {
        /// Peaks (.bed, or - for stdin)
        peaks: PathBuf,
        /// Annotation (.gff3, optionally .gz/.bz2, or - for stdin)
        gff: PathBuf,
        /// Overlaps output (.tsv, or - for stdout)
        output: PathBuf,
        #[command(flatten)]
        catalog: CatalogArgs,
        /// Minimum fraction of a peak that must overlap a feature (1e-9 to 1.0)
        #[arg(long = "min-peak-overlap", default_value_t = MIN_OVERLAP_FRACTION)]
        min_peak_overlap: f64,
        /// Minimum fraction of a feature that must overlap a peak (1e-9 to 1.0)
        #[arg(long = "min-gff-overlap", default_value_t = MIN_OVERLAP_FRACTION)]
        min_gff_overlap: f64,
        /// Either minimum suffices instead of both
        #[arg(long = "min-either-overlap")]
        min_either_overlap: bool,
        /// Only report which feature contains the midpoint of each peak
        #[arg(long)]
        midpoints: bool,
        /// bedtools executable used for intersect
        #[arg(long, default_value = "bedtools")]
        bedtools: String,
        /// sort executable (default: gsort if installed, else sort)
        #[arg(long)]
        sort: Option<String>,
    },
    /// Only build the augmented feature catalog
    Augment {
        /// Annotation (.gff3, optionally .gz/.bz2, or - for stdin)
        gff: PathBuf,
        /// Catalog output (default: <stem>-augmented.bed)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Keep the highest-ranked feature per peak of a classification file
    Filter {
        /// Classification output (.tsv, or - for stdin)
        overlaps: PathBuf,
        /// Filtered output (.tsv, or - for stdout)
        output: PathBuf,
        /// Feature classes in priority order, e.g. exon intron upstream
        #[arg(required = true)]
        features: Vec<String>,
    },
}

/// Require `suffix`, optionally followed by a compression extension
fn check_extension(path: &Path, suffix: &str) -> Result<(), PeakError> {
    if path.as_os_str() == "-" {
        return Ok(());
    }
    let name = path.to_string_lossy();
    let ok = [suffix.to_string(), format!("{}.gz", suffix), format!("{}.bz2", suffix)]
        .iter()
        .any(|s| name.ends_with(s.as_str()));
    if ok {
        Ok(())
    } else {
        Err(PeakError::config(format!("{} should end in {}", name, suffix)))
    }
}

fn print_augment_outcome(outcome: &AugmentOutcome) {
    if let AugmentOutcome::Built(stats) = outcome {
        eprintln!("\n=== Augmentation Statistics ===");
        eprintln!("Records:         {}", stats.records);
        eprintln!("Genes:           {}", stats.genes);
        eprintln!("Subfeatures:     {}", stats.subfeatures);
        eprintln!("Introns:         {}", stats.introns);
        eprintln!("Upstream bins:   {}", stats.upstream_bins);
        eprintln!("Standalone:      {}", stats.standalone);
        eprintln!("Filtered:        {}", stats.filtered);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let start = Instant::now();

    match cli.command {
        Commands::Classify {
            peaks,
            gff,
            output,
            catalog,
            min_peak_overlap,
            min_gff_overlap,
            min_either_overlap,
            midpoints,
            bedtools,
            sort,
        } => {
            check_extension(&peaks, ".bed")?;
            check_extension(&gff, ".gff3")?;
            check_extension(&output, ".tsv")?;
            let config = ClassifyConfig {
                augment: catalog.augment_config()?,
                overlap: OverlapParams::new(min_peak_overlap, min_gff_overlap, min_either_overlap)?,
                midpoints,
                force_rebuild: catalog.force,
            };
            if config.augment.boundaries.has_duplicates() {
                log::warn!("Duplicate upstream boundaries produce zero-width bins");
            }

            let sorter = match sort {
                Some(program) => ExternalSort::new(program),
                None => ExternalSort::detect(),
            };
            let engine = BedtoolsIntersect::new(bedtools);

            let stats = classify::classify(&peaks, &gff, &output, &config, &sorter, &engine)
                .with_context(|| format!("Classifying {}", peaks.display()))?;

            print_augment_outcome(&stats.augment);
            eprintln!("\n=== Classification Statistics ===");
            eprintln!("Peaks:           {}", stats.peaks);
            eprintln!("Overlap rows:    {}", stats.rows);
            eprintln!("Upstream-beyond: {}", stats.upstream_beyond);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Augment { gff, output, catalog } => {
            check_extension(&gff, ".gff3")?;
            let config = catalog.augment_config()?;
            let output = output.unwrap_or_else(|| CatalogPaths::from_annotation(&gff).augmented);

            let outcome = augment_file(&gff, &output, &config, catalog.force)
                .with_context(|| format!("Augmenting {}", gff.display()))?;

            print_augment_outcome(&outcome);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Filter { overlaps, output, features } => {
            let stats = classify::filter_file(&overlaps, &output, &features)
                .with_context(|| format!("Filtering {}", overlaps.display()))?;

            eprintln!("Total unique peaks: {}", stats.unique_peaks);
            for (i, (feature, count)) in stats.counts.iter().enumerate() {
                eprintln!(
                    "Overlaps with {:<20}: {:>7} ({:>3.1}%)",
                    feature,
                    count,
                    stats.percent(i)
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        log::error!("{:#}", err);
        let code = err
            .downcast_ref::<PeakError>()
            .map(PeakError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}
