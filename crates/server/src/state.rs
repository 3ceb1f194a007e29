//! The immutable online state: movie table plus similarity matrix.
//!
//! Loaded once at startup and shared behind an `Arc`. If the persisted
//! artifacts are missing (or a rebuild is forced) the offline pipeline runs
//! first, under the artifact build lock.

use data_loader::store::{self, ArtifactPaths, BuildLock};
use data_loader::{DataLoadError, MovieRecord, MovieTable, SimilarityMatrix, parser};
use pipeline::OfflinePipeline;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::error::RecommendError;

#[derive(Debug)]
pub struct RecommenderState {
    table: MovieTable,
    matrix: SimilarityMatrix,
}

impl RecommenderState {
    /// Pair a table with its matrix; row `i` must describe movie `i`
    pub fn new(table: MovieTable, matrix: SimilarityMatrix) -> Result<Self, DataLoadError> {
        matrix.check_shape()?;
        matrix.check_aligned(&table)?;
        Ok(Self { table, matrix })
    }

    /// Load the persisted artifacts, building them from `data_dir` first if needed.
    ///
    /// # Arguments
    /// * `data_dir` - Directory holding the TMDB source CSVs
    /// * `paths` - Where the artifacts live
    /// * `pipeline` - Offline pipeline used when a build is needed
    /// * `force` - Rebuild even if artifacts already exist
    #[instrument(skip(pipeline), fields(artifacts = ?paths.dir))]
    pub fn load_or_build(
        data_dir: &Path,
        paths: &ArtifactPaths,
        pipeline: &OfflinePipeline,
        force: bool,
    ) -> Result<Self, RecommendError> {
        let start_time = Instant::now();

        let state = if !force && paths.exist() {
            let (table, matrix) = store::load_artifacts(paths)?;
            Self::new(table, matrix)?
        } else {
            info!("Building artifacts from {:?}", data_dir);
            Self::build(data_dir, paths, pipeline)?
        };

        info!(
            "Recommender state ready with {} movies in {:.2?}",
            state.table.len(),
            start_time.elapsed()
        );
        Ok(state)
    }

    fn build(data_dir: &Path, paths: &ArtifactPaths, pipeline: &OfflinePipeline) -> Result<Self, DataLoadError> {
        let lock = BuildLock::acquire(paths)?;
        debug!("Holding {:?} for the build", lock.path());
        let raw = parser::load_raw_movies(data_dir)?;
        let artifacts = pipeline.run(&raw)?;
        store::save_artifacts(paths, &lock, &artifacts.table, &artifacts.matrix)?;
        Self::new(artifacts.table, artifacts.matrix)
    }

    pub fn table(&self) -> &MovieTable {
        &self.table
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn movie(&self, index: usize) -> Option<&MovieRecord> {
        self.table.get(index)
    }
}
