//! Offline feature engineering and the genre filter.
//!
//! This crate provides:
//! - TextNormalizer for collapsing and stemming tokens
//! - FeatureBuilder for turning joined source rows into tagged movies
//! - CountVectorizer for bounded bag-of-words vectors
//! - The cosine similarity engine
//! - OfflinePipeline, chaining the three stages above
//! - GenreFilter for narrowing the selectable titles
//!
//! ## Architecture
//! The offline build runs once, in order:
//! 1. FeatureBuilder produces one normalized tag string per movie
//! 2. CountVectorizer fits a vocabulary and vectorizes every tag
//! 3. similarity_matrix computes the dense N×N cosine matrix
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::OfflinePipeline;
//! use data_loader::parser;
//!
//! let raw = parser::load_raw_movies(Path::new("data"))?;
//! let artifacts = OfflinePipeline::new().run(&raw)?;
//! println!("{} movies", artifacts.table.len());
//! ```

pub mod normalize;
pub mod features;
pub mod vectorizer;
pub mod similarity;
pub mod offline;
pub mod filters;

// Re-export main types
pub use features::FeatureBuilder;
pub use filters::{GenreFilter, filter_by_genre};
pub use normalize::TextNormalizer;
pub use offline::{Artifacts, OfflinePipeline};
pub use similarity::{cosine, similarity_matrix};
pub use vectorizer::{CountVector, CountVectorizer, Vocabulary};
