//! Core domain types for the TMDB movie dataset.
//!
//! Two families of types live here:
//! - Raw joined rows straight out of the CSV sources (`RawMovie`, `CrewMember`)
//! - The immutable online state (`MovieRecord`, `MovieTable`, `SimilarityMatrix`)
//!
//! A movie is addressed in two ways. `MovieId` is the external TMDB id, used
//! only to talk to the poster service. The zero-based position inside the
//! `MovieTable` is the join key into the `SimilarityMatrix`.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Type Aliases
// =============================================================================

/// External TMDB identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Raw Source Types
// =============================================================================

/// One crew credit: the person's name and their job on the film
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub job: String,
    pub name: String,
}

/// A movie row joined from the movies and credits CSVs.
///
/// Attribute lists keep their source order. Nothing has been truncated,
/// collapsed or lowercased yet; that is the feature builder's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMovie {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    /// Cast names in billing order
    pub cast: Vec<String>,
    pub crew: Vec<CrewMember>,
}

// =============================================================================
// Movie Table
// =============================================================================

/// A movie as served online
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    /// Overview split into words, for display
    pub overview: Vec<String>,
    /// Normalized, space-separated token sequence used for vectorizing
    pub tag: String,
}

impl MovieRecord {
    /// Iterate over the tokens of the tag string
    pub fn tag_tokens(&self) -> impl Iterator<Item = &str> {
        self.tag.split_whitespace()
    }

    /// True when this movie carries at least one of the given genres
    pub fn has_any_genre<'a, I>(&self, genres: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        genres.into_iter().any(|g| self.genres.contains(g))
    }
}

/// Ordered sequence of movies; position `i` is row `i` of the similarity matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieTable {
    movies: Vec<MovieRecord>,
}

impl MovieTable {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Get a movie by table position
    pub fn get(&self, index: usize) -> Option<&MovieRecord> {
        self.movies.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.movies.iter()
    }

    pub fn as_slice(&self) -> &[MovieRecord] {
        &self.movies
    }

    /// Position of the first movie whose title matches exactly.
    ///
    /// Duplicate titles exist in the source data; the earliest row wins.
    pub fn position_of_title(&self, title: &str) -> Option<usize> {
        self.movies.iter().position(|m| m.title == title)
    }

    /// Sorted, de-duplicated genre labels across the whole table
    pub fn all_genres(&self) -> Vec<String> {
        self.movies
            .iter()
            .flat_map(|m| m.genres.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Tag strings in table order, the vectorizer's corpus
    pub fn tags(&self) -> Vec<&str> {
        self.movies.iter().map(|m| m.tag.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a MovieTable {
    type Item = &'a MovieRecord;
    type IntoIter = std::slice::Iter<'a, MovieRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.movies.iter()
    }
}

// =============================================================================
// Similarity Matrix
// =============================================================================

/// Dense square matrix of cosine similarities, stored row-major.
///
/// Built once by the offline pipeline and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    dim: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Wrap a row-major score buffer, checking it is `dim * dim` long.
    pub fn new(dim: usize, scores: Vec<f32>) -> Result<Self> {
        let matrix = Self { dim, scores };
        matrix.check_shape()?;
        Ok(matrix)
    }

    /// Build from a list of rows of equal length
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.len();
        let scores: Vec<f32> = rows.into_iter().flatten().collect();
        Self::new(dim, scores)
    }

    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Scores of movie `index` against every movie, in table order
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.dim {
            return None;
        }
        let start = index * self.dim;
        Some(&self.scores[start..start + self.dim])
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.row(i).and_then(|row| row.get(j).copied())
    }

    /// Verify the buffer really is square. Deserialized matrices skip `new`,
    /// so the store calls this after loading.
    pub fn check_shape(&self) -> Result<()> {
        let expected = self.dim.checked_mul(self.dim);
        if expected != Some(self.scores.len()) {
            return Err(DataLoadError::MalformedMatrix {
                dim: self.dim,
                len: self.scores.len(),
            });
        }
        Ok(())
    }

    /// Check the matrix lines up with a movie table
    pub fn check_aligned(&self, table: &MovieTable) -> Result<()> {
        if self.dim != table.len() {
            return Err(DataLoadError::DimensionMismatch {
                table_rows: table.len(),
                matrix_dim: self.dim,
            });
        }
        Ok(())
    }
}
