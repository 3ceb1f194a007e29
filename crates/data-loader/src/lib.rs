//! # Data Loader Crate
//!
//! This crate owns everything that touches disk for the recommender:
//! reading the TMDB 5000 source CSVs and persisting/loading the two offline
//! artifacts (movie table and similarity matrix).
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RawMovie, MovieRecord, MovieTable, SimilarityMatrix)
//! - **parser**: Parse and join the movies/credits CSVs, dropping bad rows
//! - **store**: Save and load artifacts, with a single-writer build lock
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{parser, store::{self, ArtifactPaths}};
//! use std::path::Path;
//!
//! let raw = parser::load_raw_movies(Path::new("data"))?;
//! println!("Joined {} movies", raw.len());
//!
//! let paths = ArtifactPaths::new("artifacts");
//! if paths.exist() {
//!     let (table, matrix) = store::load_artifacts(&paths)?;
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use store::{ArtifactPaths, BuildLock};
pub use types::{
    // Type aliases
    MovieId,
    // Raw source types
    CrewMember,
    RawMovie,
    // Online state
    MovieRecord,
    MovieTable,
    SimilarityMatrix,
};
