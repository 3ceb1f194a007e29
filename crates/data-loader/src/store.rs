//! Persistence of the two offline artifacts.
//!
//! - `movies.json`: the `MovieTable`, row order preserved
//! - `similarity.bin`: the `SimilarityMatrix`, bincode-encoded
//!
//! Writes go through a single-writer advisory lock and land via temp-file +
//! rename, so a reader never observes a half-written artifact. Loads verify
//! that the matrix is square and the same size as the table.

use crate::error::{DataLoadError, Result};
use crate::types::{MovieTable, SimilarityMatrix};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TABLE_FILE: &str = "movies.json";
pub const MATRIX_FILE: &str = "similarity.bin";
const LOCK_FILE: &str = ".build.lock";

/// Locations of the persisted artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table(&self) -> PathBuf {
        self.dir.join(TABLE_FILE)
    }

    pub fn matrix(&self) -> PathBuf {
        self.dir.join(MATRIX_FILE)
    }

    fn lock(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    /// True when both artifacts are present
    pub fn exist(&self) -> bool {
        self.table().is_file() && self.matrix().is_file()
    }
}

/// Exclusive claim on the artifact directory.
///
/// Backed by an OS advisory lock on `.build.lock`, so the kernel releases it
/// when the holding process exits for any reason. A lock file left behind by
/// a killed build is simply locked again.
#[derive(Debug)]
pub struct BuildLock {
    path: PathBuf,
    _file: File,
}

impl BuildLock {
    /// Lock the artifact directory, failing if another build already holds it
    pub fn acquire(paths: &ArtifactPaths) -> Result<Self> {
        fs::create_dir_all(&paths.dir)?;
        let path = paths.lock();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                return Err(DataLoadError::BuildInProgress { path });
            }
            Err(e) => return Err(e.into()),
        }

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        debug!("Acquired build lock {:?}", path);
        Ok(Self { path, _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Write through a temp file and rename into place
fn write_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp = temp_path(target);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        write(&mut writer)?;
        writer.flush()?;
    }
    fs::rename(&tmp, target)?;
    Ok(())
}

/// Persist both artifacts. The caller must hold the `BuildLock`.
pub fn save_artifacts(
    paths: &ArtifactPaths,
    _lock: &BuildLock,
    table: &MovieTable,
    matrix: &SimilarityMatrix,
) -> Result<()> {
    matrix.check_aligned(table)?;

    write_atomically(&paths.table(), |w| {
        serde_json::to_writer(w, table)?;
        Ok(())
    })?;
    write_atomically(&paths.matrix(), |w| {
        bincode::serialize_into(w, matrix)?;
        Ok(())
    })?;

    info!(
        "Saved {} movies and a {}x{} similarity matrix to {:?}",
        table.len(),
        matrix.dim(),
        matrix.dim(),
        paths.dir
    );
    Ok(())
}

/// Load both artifacts and check they belong together
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<(MovieTable, SimilarityMatrix)> {
    let table: MovieTable = serde_json::from_reader(BufReader::new(File::open(paths.table())?))?;
    let matrix: SimilarityMatrix =
        bincode::deserialize_from(BufReader::new(File::open(paths.matrix())?))?;

    matrix.check_shape()?;
    matrix.check_aligned(&table)?;

    info!(
        "Loaded {} movies and similarity matrix from {:?}",
        table.len(),
        paths.dir
    );
    Ok((table, matrix))
}
