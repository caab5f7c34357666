//! Collapses GWAS summary statistics into unique associated regions.
//!
//! Markers passing an index p-value threshold seed a window that keeps growing
//! while suggestive markers continue to appear within `search_space` base pairs.
//! Overlapping windows are folded into a single region per locus.
//!
//! ```no_run
//! use gwas_regions::{partition, read_marker_file, write_region_file, ClumpConfig};
//! use indicatif::ProgressBar;
//! use std::path::Path;
//!
//! let config = ClumpConfig::new(1e-5, 1e-4, 500_000)?;
//! let store = read_marker_file(Path::new("gwas.tsv"))?;
//! let partitions = partition(store.into_markers())?;
//! let regions = gwas_regions::find_regions(&partitions, &config, &ProgressBar::hidden())?;
//! write_region_file(Path::new("regions.tsv"), regions.regions())?;
//! # Ok::<(), gwas_regions::ClumpError>(())
//! ```

pub mod clump;
pub mod config;
pub mod error;
pub mod markers;
pub mod output;
pub mod partition;
pub mod region;
pub mod result_set;
pub mod window;

pub use clump::{clump_chromosome, find_regions, find_regions_parallel};
pub use config::ClumpConfig;
pub use error::{ClumpError, DataOrderingError, EmptyRegionError, RowParseError};
pub use markers::{read_marker_file, Marker, MarkerStore};
pub use output::{read_region_table, write_region_file, write_regions};
pub use partition::{partition, ChromosomePartition};
pub use region::{build_region, Region};
pub use result_set::{MergeOutcome, ResultSet};
