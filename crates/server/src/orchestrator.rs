//! # Recommendation Orchestrator
//!
//! This module is the contract the presentation layer talks to:
//! 1. List every genre in the table
//! 2. Narrow the selectable titles by genre
//! 3. Resolve a title, rank its matrix row and attach posters
//!
//! The orchestrator owns no mutable state. The table and matrix sit behind an
//! `Arc<RecommenderState>` and are read without synchronization.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use data_loader::store::ArtifactPaths;
use data_loader::{MovieId, MovieRecord};
use poster_client::PosterFetcher;

use crate::config::Config;
use crate::error::RecommendError;
use crate::ranker;
use crate::state::RecommenderState;

pub const DEFAULT_TOP_K: usize = 5;

/// Final recommendation returned to the user
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub overview: Vec<String>,
    pub poster_url: String,
    pub score: f32,
}

/// Main orchestrator that serves recommendations from the online state
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    state: Arc<RecommenderState>,
    posters: Arc<dyn PosterFetcher>,
    top_k: usize,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over already loaded state
    ///
    /// # Arguments
    /// * `state` - Shared table and similarity matrix
    /// * `posters` - Poster collaborator used for every recommendation
    pub fn new(state: Arc<RecommenderState>, posters: Arc<dyn PosterFetcher>) -> Self {
        Self {
            state,
            posters,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Configure how many recommendations to return (default: 5)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Load (or build) the state described by `config` and wire up posters.
    ///
    /// The offline build is CPU-bound and runs on the blocking pool.
    pub async fn from_config(config: &Config, force_rebuild: bool) -> Result<Self> {
        let data_dir = config.data_dir.clone();
        let paths = ArtifactPaths::new(config.artifacts_dir.clone());
        let pipeline = config.pipeline();

        let state = tokio::task::spawn_blocking(move || {
            RecommenderState::load_or_build(&data_dir, &paths, &pipeline, force_rebuild)
        })
        .await
        .context("State loading task panicked")?
        .context("Failed to load recommender state")?;

        let posters = config.poster_fetcher()?;
        Ok(Self::new(Arc::new(state), posters).with_top_k(config.num_recommendations))
    }

    pub fn state(&self) -> &RecommenderState {
        &self.state
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Every genre label in the table, sorted and de-duplicated
    pub fn all_genres(&self) -> Vec<String> {
        self.state.table().all_genres()
    }

    /// Titles a user may pick given the selected genres, in table order
    pub fn filter_by_genre<S: AsRef<str>>(&self, selected: &[S]) -> Vec<&MovieRecord> {
        pipeline::filter_by_genre(self.state.table(), selected)
    }

    /// Movies whose title contains `query`, ignoring case
    pub fn search_titles(&self, query: &str) -> Vec<&MovieRecord> {
        let needle = query.to_lowercase();
        self.state
            .table()
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Main entry point: the top-K movies most similar to `title`
    ///
    /// A short table yields fewer than K recommendations rather than an error;
    /// see `recommend`.
    pub async fn get_recommendations(&self, title: &str) -> Result<Vec<MovieRecommendation>, RecommendError> {
        self.recommend(title, self.top_k).await
    }

    /// Same as `get_recommendations`, with an explicit limit
    ///
    /// Movies sharing the query's title are never recommended, whichever
    /// table row the title resolved to.
    ///
    /// # Returns
    /// Up to `limit` recommendations sorted by score (highest first), ties
    /// broken by table order. Fewer than `limit` candidates is still `Ok`;
    /// `EmptyResult` only when no movie with a different title exists.
    pub async fn recommend(&self, title: &str, limit: usize) -> Result<Vec<MovieRecommendation>, RecommendError> {
        let start_time = Instant::now();

        let query = self
            .state
            .table()
            .position_of_title(title)
            .ok_or_else(|| RecommendError::NotFound {
                title: title.to_string(),
            })?;
        debug!("Resolved '{}' to table index {}", title, query);

        let row = self
            .state
            .matrix()
            .row(query)
            .ok_or_else(|| RecommendError::NotFound {
                title: title.to_string(),
            })?;

        let table = self.state.table();
        let ranked = ranker::top_k(row, limit, |idx| {
            idx == query || table.get(idx).is_some_and(|movie| movie.title == title)
        });
        if ranked.is_empty() && table.iter().all(|movie| movie.title == title) {
            return Err(RecommendError::EmptyResult {
                title: title.to_string(),
            });
        }

        let mut recommendations = Vec::with_capacity(ranked.len());
        for (index, score) in ranked {
            let Some(movie) = self.state.movie(index) else {
                continue;
            };
            let poster_url = self.posters.fetch_poster(movie.id).await;
            recommendations.push(MovieRecommendation {
                movie_id: movie.id,
                title: movie.title.clone(),
                genres: movie.genres.clone(),
                overview: movie.overview.clone(),
                poster_url,
                score,
            });
        }

        info!(
            "Served {} recommendations for '{}' in {:.2?}",
            recommendations.len(),
            title,
            start_time.elapsed()
        );
        Ok(recommendations)
    }
}
