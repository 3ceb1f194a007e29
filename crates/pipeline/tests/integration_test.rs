//! Integration tests for the offline pipeline.
//!
//! These tests write a small TMDB-shaped dataset to disk, parse it with the
//! data-loader and run the full feature → vector → similarity build.

use data_loader::parser::{self, CREDITS_FILE, MOVIES_FILE};
use data_loader::store::{self, ArtifactPaths, BuildLock};
use pipeline::{OfflinePipeline, filter_by_genre};
use std::path::Path;

struct Fixture {
    id: u32,
    title: &'static str,
    overview: &'static str,
    genres: &'static [&'static str],
    keywords: &'static [&'static str],
    cast: &'static [&'static str],
    director: &'static str,
}

const FIXTURES: &[Fixture] = &[
    Fixture {
        id: 19995,
        title: "Avatar",
        overview: "A marine on an alien planet",
        genres: &["Action", "Adventure", "Science Fiction"],
        keywords: &["space war", "alien planet"],
        cast: &["Sam Worthington", "Zoe Saldana", "Sigourney Weaver", "Stephen Lang"],
        director: "James Cameron",
    },
    Fixture {
        id: 679,
        title: "Aliens",
        overview: "A marine squad fights alien creatures",
        genres: &["Action", "Science Fiction", "Horror"],
        keywords: &["alien", "space marine"],
        cast: &["Sigourney Weaver", "Michael Biehn"],
        director: "James Cameron",
    },
    Fixture {
        id: 597,
        title: "Titanic",
        overview: "A romance aboard a doomed ship",
        genres: &["Drama", "Romance"],
        keywords: &["ship", "iceberg"],
        cast: &["Leonardo DiCaprio", "Kate Winslet"],
        director: "James Cameron",
    },
    Fixture {
        id: 11036,
        title: "The Notebook",
        overview: "A romance across decades",
        genres: &["Drama", "Romance"],
        keywords: &["love letter"],
        cast: &["Ryan Gosling", "Rachel McAdams"],
        director: "Nick Cassavetes",
    },
    Fixture {
        id: 157336,
        title: "Interstellar",
        overview: "Explorers travel through a wormhole in space",
        genres: &["Adventure", "Drama", "Science Fiction"],
        keywords: &["space travel", "wormhole"],
        cast: &["Matthew McConaughey", "Anne Hathaway"],
        director: "Christopher Nolan",
    },
    Fixture {
        id: 27205,
        title: "Inception",
        overview: "A thief enters dreams",
        genres: &["Action", "Science Fiction", "Thriller"],
        keywords: &["dream", "heist"],
        cast: &["Leonardo DiCaprio", "Tom Hardy"],
        director: "Christopher Nolan",
    },
    Fixture {
        id: 49047,
        title: "Gravity",
        overview: "Astronauts stranded in space",
        genres: &["Drama", "Science Fiction", "Thriller"],
        keywords: &["space", "astronaut"],
        cast: &["Sandra Bullock", "George Clooney"],
        director: "Alfonso Cuaron",
    },
    Fixture {
        id: 949,
        title: "Heat",
        overview: "A detective hunts a thief",
        genres: &["Action", "Crime", "Drama"],
        keywords: &["heist", "detective"],
        cast: &["Al Pacino", "Robert De Niro"],
        director: "Michael Mann",
    },
];

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn json_names(names: &[&str]) -> String {
    let entries: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{{\"id\": {}, \"name\": \"{}\"}}", i, name))
        .collect();
    format!("[{}]", entries.join(", "))
}

fn json_crew(director: &str) -> String {
    format!(
        "[{{\"job\": \"Producer\", \"name\": \"Some Producer\"}}, {{\"job\": \"Director\", \"name\": \"{}\"}}]",
        director
    )
}

/// Write the fixtures as TMDB CSVs, plus one movie with no overview
fn write_dataset(dir: &Path) {
    let mut movies = String::from("budget,genres,id,keywords,overview,title\n");
    for f in FIXTURES {
        movies.push_str(&format!(
            "0,{},{},{},{},{}\n",
            quote(&json_names(f.genres)),
            f.id,
            quote(&json_names(f.keywords)),
            quote(f.overview),
            quote(f.title)
        ));
    }
    movies.push_str("0,[],1,[],,Untold Story\n");

    // Credits deliberately in reverse order; the join follows the movies file
    let mut credits = String::from("movie_id,title,cast,crew\n");
    for f in FIXTURES.iter().rev() {
        credits.push_str(&format!(
            "{},{},{},{}\n",
            f.id,
            quote(f.title),
            quote(&json_names(f.cast)),
            quote(&json_crew(f.director))
        ));
    }
    credits.push_str("1,Untold Story,[],[]\n");

    std::fs::write(dir.join(MOVIES_FILE), movies).unwrap();
    std::fs::write(dir.join(CREDITS_FILE), credits).unwrap();
}

fn build(dir: &Path) -> pipeline::Artifacts {
    let raw = parser::load_raw_movies(dir).unwrap();
    OfflinePipeline::new().run(&raw).unwrap()
}

#[test]
fn test_pipeline_keeps_movie_file_order_and_drops_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let artifacts = build(dir.path());

    let titles: Vec<&str> = artifacts.table.iter().map(|m| m.title.as_str()).collect();
    let expected: Vec<&str> = FIXTURES.iter().map(|f| f.title).collect();
    assert_eq!(titles, expected, "Untold Story has no overview and must be dropped");
    assert_eq!(artifacts.matrix.dim(), artifacts.table.len());
    assert!(artifacts.vocabulary_size > 0);
}

#[test]
fn test_pipeline_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let first = build(dir.path());
    let second = build(dir.path());

    assert_eq!(first.table, second.table);
    assert_eq!(first.matrix, second.matrix);
    assert_eq!(first.vocabulary_size, second.vocabulary_size);
}

#[test]
fn test_similarity_matrix_properties() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let matrix = build(dir.path()).matrix;

    for i in 0..matrix.dim() {
        assert_eq!(matrix.get(i, i), Some(1.0), "diagonal must be exactly 1");
        for j in 0..matrix.dim() {
            let score = matrix.get(i, j).unwrap();
            assert_eq!(score, matrix.get(j, i).unwrap(), "matrix must be symmetric");
            assert!((0.0..=1.0).contains(&score));
        }
    }
}

#[test]
fn test_shared_cast_and_director_drive_similarity() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let artifacts = build(dir.path());

    let avatar = artifacts.table.position_of_title("Avatar").unwrap();
    let aliens = artifacts.table.position_of_title("Aliens").unwrap();
    let notebook = artifacts.table.position_of_title("The Notebook").unwrap();

    let row = artifacts.matrix.row(avatar).unwrap();
    let best_other = (0..row.len())
        .filter(|&j| j != avatar)
        .max_by(|&a, &b| row[a].total_cmp(&row[b]))
        .unwrap();
    assert_eq!(best_other, aliens);
    assert!(row[aliens] > row[notebook]);
}

#[test]
fn test_artifacts_persist_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let artifacts = build(dir.path());

    let paths = ArtifactPaths::new(dir.path().join("artifacts"));
    let lock = BuildLock::acquire(&paths).unwrap();
    store::save_artifacts(&paths, &lock, &artifacts.table, &artifacts.matrix).unwrap();
    drop(lock);

    let (table, matrix) = store::load_artifacts(&paths).unwrap();
    assert_eq!(table, artifacts.table);
    assert_eq!(matrix, artifacts.matrix);
}

#[test]
fn test_genre_filter_on_built_table() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let table = build(dir.path()).table;

    let romance = filter_by_genre(&table, &["Romance"]);
    let titles: Vec<&str> = romance.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Titanic", "The Notebook"]);

    assert_eq!(filter_by_genre::<String>(&table, &[]).len(), table.len());
    assert!(table.all_genres().contains(&"Science Fiction".to_string()));
}
