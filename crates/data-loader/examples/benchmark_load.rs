use data_loader::{ArtifactPaths, parser, store};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data");
    let paths = ArtifactPaths::new("artifacts");

    println!("Parsing TMDB 5000 source files...\n");

    let start = Instant::now();
    let raw = parser::load_raw_movies(data_dir).expect("Failed to parse source CSVs");
    let parse_elapsed = start.elapsed();

    println!("=== Parse Complete ===");
    println!("Time taken: {:?}", parse_elapsed);
    println!("Joined movies: {}", raw.len());

    if paths.exist() {
        let start = Instant::now();
        let (table, matrix) = store::load_artifacts(&paths).expect("Failed to load artifacts");
        let load_elapsed = start.elapsed();

        println!("\n=== Artifact Load Complete ===");
        println!("Time taken: {:?}", load_elapsed);
        println!("Movies: {}", table.len());
        println!("Matrix: {}x{}", matrix.dim(), matrix.dim());
        println!(
            "\nPerformance: {:.0} scores/second",
            (matrix.dim() * matrix.dim()) as f64 / load_elapsed.as_secs_f64()
        );
    } else {
        println!("\nNo artifacts in {:?}; run `reel-recs build` first", paths.dir);
    }
}
