//! Runtime configuration from environment variables.
//!
//! Values come from the process environment, with a `.env` file loaded first
//! when present. Every field has a default, so an empty environment is valid.

use pipeline::OfflinePipeline;
use poster_client::{
    DEFAULT_API_URL, DEFAULT_IMAGE_BASE_URL, DEFAULT_PLACEHOLDER, PlaceholderPosters, PosterConfig,
    PosterFetcher, TmdbPosterClient,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Recommender configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the TMDB source CSVs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding movies.json and similarity.bin
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// TMDB API key; posters fall back to the placeholder without one
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    #[serde(default = "default_tmdb_poster_base_url")]
    pub tmdb_poster_base_url: String,

    /// Poster request timeout in seconds
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,

    #[serde(default = "default_placeholder_poster")]
    pub placeholder_poster: String,

    /// How many recommendations to return per query
    #[serde(default = "default_num_recommendations")]
    pub num_recommendations: usize,

    /// Vocabulary bound for the vectorizer
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Cast members contributing to each tag
    #[serde(default = "default_cast_limit")]
    pub cast_limit: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_tmdb_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_tmdb_poster_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}

fn default_api_timeout_secs() -> u64 {
    5
}

fn default_placeholder_poster() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

fn default_num_recommendations() -> usize {
    5
}

fn default_max_features() -> usize {
    5000
}

fn default_cast_limit() -> usize {
    3
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit `(NAME, value)` pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Poster client settings, or `None` when no API key is configured
    pub fn poster_config(&self) -> Option<PosterConfig> {
        let api_key = self.tmdb_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some(PosterConfig {
            api_key: api_key.to_string(),
            api_url: self.tmdb_api_url.clone(),
            image_base_url: self.tmdb_poster_base_url.clone(),
            timeout: Duration::from_secs(self.api_timeout_secs),
            placeholder: self.placeholder_poster.clone(),
        })
    }

    /// The poster fetcher this configuration calls for
    pub fn poster_fetcher(&self) -> anyhow::Result<Arc<dyn PosterFetcher>> {
        let fetcher: Arc<dyn PosterFetcher> = match self.poster_config() {
            Some(config) => Arc::new(TmdbPosterClient::new(config)?),
            None => {
                info!("TMDB_API_KEY not set, serving placeholder posters");
                Arc::new(PlaceholderPosters::new(self.placeholder_poster.clone()))
            }
        };
        Ok(fetcher)
    }

    /// Offline pipeline with the configured vocabulary and cast bounds
    pub fn pipeline(&self) -> OfflinePipeline {
        OfflinePipeline::new()
            .with_max_features(self.max_features)
            .with_cast_limit(self.cast_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(config.num_recommendations, 5);
        assert_eq!(config.max_features, 5000);
        assert_eq!(config.cast_limit, 3);
        assert_eq!(config.api_timeout_secs, 5);
        assert!(config.tmdb_api_key.is_none());
        assert!(config.poster_config().is_none());
    }

    #[test]
    fn test_unrelated_variables_are_ignored() {
        let config = Config::from_vars(vars(&[("PATH", "/usr/bin"), ("HOME", "/root")])).unwrap();
        assert_eq!(config.num_recommendations, 5);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("DATA_DIR", "/srv/tmdb"),
            ("NUM_RECOMMENDATIONS", "10"),
            ("TMDB_API_KEY", "secret"),
            ("API_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/tmdb"));
        assert_eq!(config.num_recommendations, 10);

        let posters = config.poster_config().unwrap();
        assert_eq!(posters.api_key, "secret");
        assert_eq!(posters.timeout, Duration::from_secs(2));
        assert_eq!(posters.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_blank_api_key_means_placeholders() {
        let config = Config::from_vars(vars(&[("TMDB_API_KEY", "  ")])).unwrap();
        assert!(config.poster_config().is_none());
    }

    #[test]
    fn test_bad_number_is_an_error() {
        assert!(Config::from_vars(vars(&[("NUM_RECOMMENDATIONS", "many")])).is_err());
    }
}
