//! Filter implementations for the selectable movie set.

pub mod genre;

// Re-export for convenience
pub use genre::{GenreFilter, filter_by_genre};
