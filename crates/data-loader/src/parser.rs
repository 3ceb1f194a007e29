//! Parser for the TMDB 5000 source files.
//!
//! Two CSV files feed the offline pipeline:
//! - `tmdb_5000_movies.csv`: one row per movie, with `genres` and `keywords`
//!   stored as embedded JSON arrays of `{"id": .., "name": ..}` objects
//! - `tmdb_5000_credits.csv`: `movie_id`, `title`, and `cast`/`crew` as JSON arrays
//!
//! The two are inner-joined on title. A row that is missing a required field,
//! or whose embedded JSON does not parse, is dropped. Drops are tallied and
//! logged once per file, never surfaced as errors.

use crate::error::{DataLoadError, Result};
use crate::types::{CrewMember, MovieId, RawMovie};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const MOVIES_FILE: &str = "tmdb_5000_movies.csv";
pub const CREDITS_FILE: &str = "tmdb_5000_credits.csv";

const MOVIE_COLUMNS: [&str; 4] = ["title", "overview", "genres", "keywords"];
const CREDIT_COLUMNS: [&str; 4] = ["movie_id", "title", "cast", "crew"];

/// Why a source row was left out of the dataset
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataQualityIssue {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("malformed {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("unreadable row: {0}")]
    UnreadableRow(String),
}

impl DataQualityIssue {
    fn label(&self) -> String {
        match self {
            DataQualityIssue::MissingField(field) => format!("missing {field}"),
            DataQualityIssue::MalformedField { field, .. } => format!("malformed {field}"),
            DataQualityIssue::UnreadableRow(_) => "unreadable".to_string(),
        }
    }
}

/// Tally of dropped rows for one source file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DropReport {
    pub kept: usize,
    pub dropped: usize,
    pub reasons: BTreeMap<String, usize>,
}

impl DropReport {
    fn record(&mut self, issue: &DataQualityIssue) {
        self.dropped += 1;
        *self.reasons.entry(issue.label()).or_insert(0) += 1;
    }

    fn log(&self, file: &str) {
        if self.dropped == 0 {
            info!("Parsed {} rows from {}", self.kept, file);
        } else {
            info!(
                "Parsed {} rows from {}, dropped {} ({:?})",
                self.kept, file, self.dropped, self.reasons
            );
        }
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct MovieRow {
    title: Option<String>,
    overview: Option<String>,
    genres: Option<String>,
    keywords: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreditsRow {
    movie_id: Option<String>,
    title: Option<String>,
    cast: Option<String>,
    crew: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

/// A movies.csv row that passed the quality gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMovie {
    pub title: String,
    pub overview: String,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
}

/// A credits.csv row that passed the quality gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCredits {
    pub movie_id: MovieId,
    pub title: String,
    pub cast: Vec<String>,
    pub crew: Vec<CrewMember>,
}

// =============================================================================
// Field Helpers
// =============================================================================

fn required(value: Option<String>, field: &'static str) -> std::result::Result<String, DataQualityIssue> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DataQualityIssue::MissingField(field)),
    }
}

/// Parse an embedded `[{"name": ...}, ...]` array into its names, in order
fn parse_names(raw: &str, field: &'static str) -> std::result::Result<Vec<String>, DataQualityIssue> {
    serde_json::from_str::<Vec<NamedEntry>>(raw)
        .map(|entries| entries.into_iter().map(|e| e.name).collect())
        .map_err(|e| DataQualityIssue::MalformedField {
            field,
            reason: e.to_string(),
        })
}

fn parse_crew(raw: &str) -> std::result::Result<Vec<CrewMember>, DataQualityIssue> {
    serde_json::from_str::<Vec<CrewMember>>(raw).map_err(|e| DataQualityIssue::MalformedField {
        field: "crew",
        reason: e.to_string(),
    })
}

fn check_columns(headers: &csv::StringRecord, required: &[&str], file: &str) -> Result<()> {
    for column in required {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(DataLoadError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn open_reader(path: &Path, required: &[&str]) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(DataLoadError::MissingSource {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path)?;
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    check_columns(reader.headers()?, required, &file)?;
    Ok(reader)
}

// =============================================================================
// Row Conversion
// =============================================================================

fn convert_movie(row: MovieRow) -> std::result::Result<SourceMovie, DataQualityIssue> {
    let title = required(row.title, "title")?;
    let overview = required(row.overview, "overview")?;
    let genres = parse_names(&required(row.genres, "genres")?, "genres")?;
    let keywords = parse_names(&required(row.keywords, "keywords")?, "keywords")?;
    Ok(SourceMovie {
        title,
        overview,
        genres,
        keywords,
    })
}

fn convert_credits(row: CreditsRow) -> std::result::Result<SourceCredits, DataQualityIssue> {
    let movie_id = required(row.movie_id, "movie_id")?;
    let movie_id = movie_id
        .trim()
        .parse::<MovieId>()
        .map_err(|e| DataQualityIssue::MalformedField {
            field: "movie_id",
            reason: e.to_string(),
        })?;
    let title = required(row.title, "title")?;
    let cast = parse_names(&required(row.cast, "cast")?, "cast")?;
    let crew = parse_crew(&required(row.crew, "crew")?)?;
    Ok(SourceCredits {
        movie_id,
        title,
        cast,
        crew,
    })
}

/// Deserialize every row of a CSV, keeping the ones `convert` accepts
fn read_rows<R, T, F>(
    reader: &mut csv::Reader<std::fs::File>,
    file: &str,
    convert: F,
) -> (Vec<T>, DropReport)
where
    R: for<'de> Deserialize<'de>,
    F: Fn(R) -> std::result::Result<T, DataQualityIssue>,
{
    let mut kept = Vec::new();
    let mut report = DropReport::default();

    for (idx, result) in reader.deserialize::<R>().enumerate() {
        let converted = result
            .map_err(|e| DataQualityIssue::UnreadableRow(e.to_string()))
            .and_then(&convert);
        match converted {
            Ok(row) => kept.push(row),
            Err(issue) => {
                debug!("Dropping row {} of {}: {}", idx + 1, file, issue);
                report.record(&issue);
            }
        }
    }
    report.kept = kept.len();
    (kept, report)
}

// =============================================================================
// Public Entry Points
// =============================================================================

/// Parse the movies CSV
pub fn parse_movies(path: &Path) -> Result<(Vec<SourceMovie>, DropReport)> {
    let mut reader = open_reader(path, &MOVIE_COLUMNS)?;
    let (movies, report) = read_rows(&mut reader, MOVIES_FILE, convert_movie);
    report.log(MOVIES_FILE);
    Ok((movies, report))
}

/// Parse the credits CSV
pub fn parse_credits(path: &Path) -> Result<(Vec<SourceCredits>, DropReport)> {
    let mut reader = open_reader(path, &CREDIT_COLUMNS)?;
    let (credits, report) = read_rows(&mut reader, CREDITS_FILE, convert_credits);
    report.log(CREDITS_FILE);
    Ok((credits, report))
}

/// Inner-join movies and credits on title.
///
/// Movies keep their file order. A movie title shared by several credits rows
/// produces one joined row per credits row, in credits file order, so
/// duplicate titles multiply exactly like a relational join.
pub fn join_on_title(movies: Vec<SourceMovie>, credits: Vec<SourceCredits>) -> Vec<RawMovie> {
    let mut by_title: HashMap<&str, Vec<&SourceCredits>> = HashMap::new();
    for credit in &credits {
        by_title.entry(credit.title.as_str()).or_default().push(credit);
    }

    let mut joined = Vec::with_capacity(movies.len());
    for movie in &movies {
        let Some(matches) = by_title.get(movie.title.as_str()) else {
            continue;
        };
        for credit in matches {
            joined.push(RawMovie {
                id: credit.movie_id,
                title: movie.title.clone(),
                overview: movie.overview.clone(),
                genres: movie.genres.clone(),
                keywords: movie.keywords.clone(),
                cast: credit.cast.clone(),
                crew: credit.crew.clone(),
            });
        }
    }
    joined
}

/// Parse both source files from `data_dir` and join them.
///
/// The two files are parsed in parallel with `rayon::join`.
pub fn load_raw_movies(data_dir: &Path) -> Result<Vec<RawMovie>> {
    let movies_path = data_dir.join(MOVIES_FILE);
    let credits_path = data_dir.join(CREDITS_FILE);

    let (movies, credits) = rayon::join(
        || parse_movies(&movies_path),
        || parse_credits(&credits_path),
    );
    let (movies, _) = movies?;
    let (credits, _) = credits?;

    let joined = join_on_title(movies, credits);
    info!("Joined {} movies on title", joined.len());
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_parse_names_keeps_order() {
        let raw = r#"[{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]"#;
        let names = parse_names(raw, "genres").unwrap();
        assert_eq!(names, vec!["Action", "Science Fiction"]);
    }

    #[test]
    fn test_parse_names_rejects_garbage() {
        let issue = parse_names("not json", "keywords").unwrap_err();
        assert!(matches!(issue, DataQualityIssue::MalformedField { field: "keywords", .. }));
    }

    #[test]
    fn test_empty_list_is_not_missing() {
        assert!(parse_names("[]", "genres").unwrap().is_empty());
    }

    #[test]
    fn test_convert_movie_requires_overview() {
        let row = MovieRow {
            title: Some("Avatar".to_string()),
            overview: None,
            genres: Some("[]".to_string()),
            keywords: Some("[]".to_string()),
        };
        assert_eq!(
            convert_movie(row).unwrap_err(),
            DataQualityIssue::MissingField("overview")
        );
    }

    #[test]
    fn test_join_multiplies_duplicate_titles() {
        let movie = |title: &str| SourceMovie {
            title: title.to_string(),
            overview: "x".to_string(),
            genres: vec![],
            keywords: vec![],
        };
        let credit = |id: MovieId, title: &str| SourceCredits {
            movie_id: id,
            title: title.to_string(),
            cast: vec![],
            crew: vec![],
        };

        let joined = join_on_title(
            vec![movie("The Host"), movie("Avatar"), movie("The Host"), movie("Orphan")],
            vec![credit(1, "Avatar"), credit(2, "The Host"), credit(3, "The Host")],
        );

        let ids: Vec<MovieId> = joined.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_load_raw_movies_drops_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            MOVIES_FILE,
            "id,genres,keywords,overview,title\n\
             19995,\"[{\"\"id\"\": 28, \"\"name\"\": \"\"Action\"\"}]\",\"[{\"\"id\"\": 1, \"\"name\"\": \"\"space war\"\"}]\",In the 22nd century a marine is sent to Pandora.,Avatar\n\
             1,[],[],,No Overview\n\
             2,broken,[],Something happens.,Broken Genres\n",
        );
        write_file(
            dir.path(),
            CREDITS_FILE,
            "movie_id,title,cast,crew\n\
             19995,Avatar,\"[{\"\"name\"\": \"\"Sam Worthington\"\"}]\",\"[{\"\"job\"\": \"\"Director\"\", \"\"name\"\": \"\"James Cameron\"\"}]\"\n\
             1,No Overview,[],[]\n\
             2,Broken Genres,[],[]\n",
        );

        let raw = load_raw_movies(dir.path()).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].id, 19995);
        assert_eq!(raw[0].genres, vec!["Action"]);
        assert_eq!(raw[0].keywords, vec!["space war"]);
        assert_eq!(raw[0].cast, vec!["Sam Worthington"]);
        assert_eq!(raw[0].crew[0].job, "Director");
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_raw_movies(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingSource { .. }));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), MOVIES_FILE, "id,title\n1,Avatar\n");
        let err = parse_movies(&dir.path().join(MOVIES_FILE)).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { .. }));
    }
}
