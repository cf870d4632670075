//! Peak classification against the augmented catalog

pub mod external;
pub mod filter;
pub mod overlap;
pub mod pipeline;

pub use external::{BedtoolsIntersect, CatalogSorter, ExternalSort, OverlapEngine};
pub use filter::{feature_rank, filter_file, filter_overlaps, FilterStats};
pub use overlap::{
    reinterpret, ClassifiedRow, Overlap, OverlapRow, CLASSIFICATION_HEADER, UPSTREAM_BEYOND,
};
pub use pipeline::{classify, sort_catalog, CatalogPaths, ClassifyStats};
