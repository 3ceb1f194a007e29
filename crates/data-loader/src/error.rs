//! Error types for the data-loader crate.
//!
//! Every variant here is structural: it stops the loader from producing a
//! usable movie table or similarity matrix. Row-level data problems are not
//! errors at all; the parser drops those rows and counts them (see
//! [`crate::parser::DataQualityIssue`]).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading source data or persisted artifacts
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// A source CSV is missing and there are no cached artifacts to fall back on
    #[error("Source file not found: {path}")]
    MissingSource { path: PathBuf },

    /// A source CSV lacks a column the pipeline needs
    #[error("Column '{column}' missing from {file}")]
    MissingColumn { file: String, column: String },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader failed outside of a single record (headers, encoding)
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// The persisted movie table could not be (de)serialized
    #[error("Movie table serialization error: {0}")]
    TableFormat(#[from] serde_json::Error),

    /// The persisted similarity matrix could not be (de)serialized
    #[error("Similarity matrix serialization error: {0}")]
    MatrixFormat(#[from] bincode::Error),

    /// Table and matrix disagree on the number of movies
    ///
    /// Row `i` of the table must be row `i` of the matrix, so any size
    /// difference means the artifacts come from different builds.
    #[error("Dimension mismatch: table has {table_rows} movies, matrix is {matrix_dim}x{matrix_dim}")]
    DimensionMismatch {
        table_rows: usize,
        matrix_dim: usize,
    },

    /// The matrix payload is not a square grid
    #[error("Similarity matrix of dimension {dim} holds {len} scores")]
    MalformedMatrix { dim: usize, len: usize },

    /// Another process holds the artifact build lock
    #[error("Artifact build already in progress (lock file {path})")]
    BuildInProgress { path: PathBuf },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
