//! Feature building: one tag string per movie.
//!
//! The tag concatenates, in order: overview words, genres, keywords, the
//! first few cast members and the director. Multi-word names are collapsed
//! first, then the whole string is lowercased and stemmed token by token.

use crate::normalize::{TextNormalizer, collapse_entity};
use data_loader::{MovieRecord, MovieTable, RawMovie};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Default number of billed cast members that contribute to the tag
pub const DEFAULT_CAST_LIMIT: usize = 3;

/// Crew job that contributes to the tag
const DIRECTOR_JOB: &str = "Director";

/// Turns joined source rows into `MovieRecord`s.
pub struct FeatureBuilder {
    normalizer: TextNormalizer,
    cast_limit: usize,
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            cast_limit: DEFAULT_CAST_LIMIT,
        }
    }

    /// Configure how many cast members are kept (default: 3)
    pub fn with_cast_limit(mut self, cast_limit: usize) -> Self {
        self.cast_limit = cast_limit;
        self
    }

    /// Build the record for a single movie
    pub fn build(&self, raw: &RawMovie) -> MovieRecord {
        let overview: Vec<String> = raw.overview.split_whitespace().map(String::from).collect();

        let director = raw
            .crew
            .iter()
            .find(|member| member.job == DIRECTOR_JOB)
            .map(|member| member.name.as_str());

        let entities = raw
            .genres
            .iter()
            .chain(raw.keywords.iter())
            .chain(raw.cast.iter().take(self.cast_limit))
            .map(String::as_str)
            .chain(director)
            .map(collapse_entity)
            .filter(|entity| !entity.is_empty());

        let joined = overview
            .iter()
            .cloned()
            .chain(entities)
            .collect::<Vec<_>>()
            .join(" ");

        MovieRecord {
            id: raw.id,
            title: raw.title.clone(),
            genres: raw.genres.clone(),
            overview,
            tag: self.normalizer.normalize_text(&joined),
        }
    }

    /// Build records for every movie, preserving input order
    #[instrument(skip_all, fields(movies = raw.len()))]
    pub fn build_table(&self, raw: &[RawMovie]) -> MovieTable {
        let records: Vec<MovieRecord> = raw.par_iter().map(|movie| self.build(movie)).collect();
        debug!("Built tags for {} movies", records.len());
        MovieTable::new(records)
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}
