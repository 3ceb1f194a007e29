//! The offline build: raw joined rows in, table and similarity matrix out.
//!
//! Stages run strictly in order and block until done:
//! 1. FeatureBuilder turns each row into a MovieRecord with a tag string
//! 2. CountVectorizer fits the vocabulary and vectorizes every tag
//! 3. The similarity engine computes the dense cosine matrix

use crate::features::{DEFAULT_CAST_LIMIT, FeatureBuilder};
use crate::similarity::similarity_matrix;
use crate::vectorizer::{CountVectorizer, DEFAULT_MAX_FEATURES};
use data_loader::{MovieTable, RawMovie, Result, SimilarityMatrix};
use std::time::Instant;
use tracing::{info, instrument};

/// Everything the online side needs
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub table: MovieTable,
    pub matrix: SimilarityMatrix,
    pub vocabulary_size: usize,
}

/// Configured offline pipeline
pub struct OfflinePipeline {
    builder: FeatureBuilder,
    vectorizer: CountVectorizer,
}

impl OfflinePipeline {
    pub fn new() -> Self {
        Self {
            builder: FeatureBuilder::new().with_cast_limit(DEFAULT_CAST_LIMIT),
            vectorizer: CountVectorizer::new().with_max_features(DEFAULT_MAX_FEATURES),
        }
    }

    /// Configure the vocabulary bound (default: 5000)
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.vectorizer = self.vectorizer.with_max_features(max_features);
        self
    }

    /// Configure how many cast members feed each tag (default: 3)
    pub fn with_cast_limit(mut self, cast_limit: usize) -> Self {
        self.builder = self.builder.with_cast_limit(cast_limit);
        self
    }

    /// Run all stages over the joined source rows
    #[instrument(skip_all, fields(movies = raw.len()))]
    pub fn run(&self, raw: &[RawMovie]) -> Result<Artifacts> {
        let start_time = Instant::now();

        let table = self.builder.build_table(raw);
        info!("Built {} movie tags in {:.2?}", table.len(), start_time.elapsed());

        let stage = Instant::now();
        let (vocabulary, vectors) = self.vectorizer.fit_transform(&table.tags());
        info!(
            "Vectorized {} movies over {} tokens in {:.2?}",
            vectors.len(),
            vocabulary.len(),
            stage.elapsed()
        );

        let stage = Instant::now();
        let matrix = similarity_matrix(&vectors)?;
        info!(
            "Computed {}x{} similarity matrix in {:.2?}",
            matrix.dim(),
            matrix.dim(),
            stage.elapsed()
        );

        info!("Offline pipeline finished in {:.2?}", start_time.elapsed());
        Ok(Artifacts {
            table,
            matrix,
            vocabulary_size: vocabulary.len(),
        })
    }
}

impl Default for OfflinePipeline {
    fn default() -> Self {
        Self::new()
    }
}
