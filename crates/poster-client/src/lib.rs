//! Poster lookup client for the TMDB movie API.
//!
//! This crate resolves a movie id to a poster image URL. It handles:
//! - Building the lookup request with the API key and a bounded timeout
//! - Extracting `poster_path` from the JSON response
//! - Memoizing successful lookups in-process
//! - Falling back to a placeholder image on any failure
//!
//! Callers never see an error: `fetch_poster` always returns a displayable URL.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3/movie";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_PLACEHOLDER: &str = "https://via.placeholder.com/500x750?text=Poster+Not+Available";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while looking up a poster.
///
/// These never leave the client through `PosterFetcher`; they are logged and
/// replaced by the placeholder URL.
#[derive(Error, Debug)]
pub enum PosterError {
    #[error("Poster request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Poster API returned status {status} for movie {movie_id}")]
    Status { movie_id: u32, status: u16 },

    #[error("No poster_path for movie {movie_id}")]
    MissingPosterPath { movie_id: u32 },
}

/// Anything that can turn a movie id into a poster URL
#[async_trait]
pub trait PosterFetcher: Send + Sync {
    /// Poster URL for `movie_id`, or a placeholder URL if none is available
    async fn fetch_poster(&self, movie_id: u32) -> String;
}

/// Connection settings for the TMDB client
#[derive(Debug, Clone)]
pub struct PosterConfig {
    pub api_key: String,
    pub api_url: String,
    pub image_base_url: String,
    pub timeout: Duration,
    pub placeholder: String,
}

impl PosterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    poster_path: Option<String>,
}

/// TMDB-backed poster fetcher with an in-process cache.
pub struct TmdbPosterClient {
    http_client: reqwest::Client,
    config: PosterConfig,
    cache: Mutex<HashMap<u32, String>>,
}

impl TmdbPosterClient {
    /// Create a client; the timeout applies to every request
    pub fn new(config: PosterConfig) -> Result<Self, PosterError> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        info!(
            "Poster client targeting {} (timeout {:?})",
            config.api_url, config.timeout
        );
        Ok(Self {
            http_client,
            config,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn placeholder(&self) -> &str {
        &self.config.placeholder
    }

    /// Look up the poster once, surfacing every failure
    pub async fn try_fetch(&self, movie_id: u32) -> Result<String, PosterError> {
        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), movie_id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.config.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PosterError::Status {
                movie_id,
                status: status.as_u16(),
            });
        }

        let details: MovieDetails = response.json().await?;
        let poster_path = details
            .poster_path
            .filter(|p| !p.trim().is_empty())
            .ok_or(PosterError::MissingPosterPath { movie_id })?;

        Ok(format!(
            "{}/{}",
            self.config.image_base_url.trim_end_matches('/'),
            poster_path.trim_start_matches('/')
        ))
    }

    fn cached(&self, movie_id: u32) -> Option<String> {
        self.cache.lock().ok()?.get(&movie_id).cloned()
    }

    fn remember(&self, movie_id: u32, url: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(movie_id, url.to_string());
        }
    }
}

#[async_trait]
impl PosterFetcher for TmdbPosterClient {
    async fn fetch_poster(&self, movie_id: u32) -> String {
        if let Some(url) = self.cached(movie_id) {
            debug!("Poster cache hit for movie {}", movie_id);
            return url;
        }

        match self.try_fetch(movie_id).await {
            Ok(url) => {
                self.remember(movie_id, &url);
                url
            }
            Err(e) => {
                warn!("Falling back to placeholder poster: {}", e);
                self.config.placeholder.clone()
            }
        }
    }
}

/// Fetcher used when no API key is configured
#[derive(Debug, Clone)]
pub struct PlaceholderPosters {
    placeholder: String,
}

impl PlaceholderPosters {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }
}

impl Default for PlaceholderPosters {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER)
    }
}

#[async_trait]
impl PosterFetcher for PlaceholderPosters {
    async fn fetch_poster(&self, _movie_id: u32) -> String {
        self.placeholder.clone()
    }
}
