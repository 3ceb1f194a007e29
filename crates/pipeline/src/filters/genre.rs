//! Filter to keep only movies in the selected genres.
//!
//! This narrows the list of titles offered for selection. Recommendations
//! for the chosen title are still drawn from every genre.

use data_loader::{MovieRecord, MovieTable};
use std::collections::HashSet;
use tracing::debug;

/// Keeps movies sharing at least one genre with the selection.
///
/// ## Algorithm
/// 1. Empty selection: keep everything, order untouched
/// 2. Otherwise keep movies whose genre list intersects the selection
pub struct GenreFilter {
    selected: HashSet<String>,
}

impl GenreFilter {
    /// Create a new GenreFilter.
    ///
    /// # Arguments
    /// * `selected` - Genre labels to keep (exact, case-sensitive labels)
    pub fn new<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }

    /// Keep the matching movies, in the order received
    pub fn apply<'a>(&self, movies: Vec<&'a MovieRecord>) -> Vec<&'a MovieRecord> {
        if self.selected.is_empty() {
            return movies;
        }
        movies
            .into_iter()
            .filter(|movie| movie.has_any_genre(&self.selected))
            .collect()
    }
}

/// Movies of `table` a user may pick, given the selected genres
pub fn filter_by_genre<'a, S: AsRef<str>>(table: &'a MovieTable, selected: &[S]) -> Vec<&'a MovieRecord> {
    let filter = GenreFilter::new(selected.iter().map(|g| g.as_ref().to_string()));
    let kept = filter.apply(table.iter().collect());
    debug!("GenreFilter kept {} of {} movies", kept.len(), table.len());
    kept
}
