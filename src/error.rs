// error.rs

use std::path::PathBuf;
use thiserror::Error;

/// A single data row that could not be turned into a [`crate::markers::Marker`].
/// The loader logs these and moves on to the next row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowParseError {
    #[error("line {line}: expected at least 4 tab-separated columns, found {found}")]
    MissingColumns { line: usize, found: usize },

    #[error("line {line}: chromosome field is empty")]
    EmptyChromosome { line: usize },

    #[error("line {line}: chromosome '{value}' is not a numeric chromosome between 1 and 22")]
    InvalidChromosome { line: usize, value: String },

    #[error("line {line}: could not parse position '{value}' for marker {marker}")]
    InvalidPosition {
        line: usize,
        marker: String,
        value: String,
    },

    #[error("line {line}: could not parse p-value '{value}' for marker {marker}")]
    InvalidPValue {
        line: usize,
        marker: String,
        value: String,
    },
}

/// Markers of one chromosome are not in non-decreasing position order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "markers for chromosome {chromosome} are not in genomic order: {marker} at position {position} follows position {previous_position}"
)]
pub struct DataOrderingError {
    pub chromosome: u8,
    pub marker: String,
    pub position: u64,
    pub previous_position: u64,
}

/// A region was requested from a candidate set without a single suggestive marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no marker at or below the suggestive threshold among {candidates} candidate markers")]
pub struct EmptyRegionError {
    pub candidates: usize,
}

#[derive(Error, Debug)]
pub enum ClumpError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read tab-separated table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Input file {} is empty; a header row is required", .path.display())]
    MissingHeader { path: PathBuf },

    #[error(
        "Malformed header in {}: expected at least 4 tab-separated columns, found {columns}",
        .path.display()
    )]
    MalformedHeader { path: PathBuf, columns: usize },

    #[error("Region table line {line}: {message}")]
    RegionTable { line: usize, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Ordering(#[from] DataOrderingError),

    #[error(transparent)]
    EmptyRegion(#[from] EmptyRegionError),
}

impl ClumpError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClumpError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        ClumpError::Csv {
            path: path.into(),
            source,
        }
    }
}
