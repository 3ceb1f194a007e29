use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::MovieRecord;
use server::{Config, MovieRecommendation, RecommendationOrchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Content-based movie recommendations over the TMDB 5000 dataset", long_about = None)]
struct Cli {
    /// Directory holding tmdb_5000_movies.csv and tmdb_5000_credits.csv
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Directory holding the built artifacts
    #[arg(short, long)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or load) the movie table and similarity matrix
    Build {
        /// Rebuild even if artifacts already exist
        #[arg(long)]
        force: bool,
    },

    /// List every genre in the dataset
    Genres,

    /// List selectable titles, optionally narrowed by genre
    Browse {
        /// Genre to keep (repeatable); no genre keeps every title
        #[arg(long)]
        genre: Vec<String>,

        /// Maximum number of titles to print
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Get movies similar to a title
    Recommend {
        /// Exact title of the movie you liked
        #[arg(long)]
        title: String,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,

        /// Show each recommendation's overview
        #[arg(long)]
        overview: bool,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(artifacts_dir) = cli.artifacts_dir {
        config.artifacts_dir = artifacts_dir;
    }
    debug!(
        "Data dir {:?}, artifacts dir {:?}, top-k {}",
        config.data_dir, config.artifacts_dir, config.num_recommendations
    );

    let force = matches!(cli.command, Commands::Build { force: true });

    // Load (or build) the recommender state; the first run may take a while
    println!("Loading movies from {}...", config.artifacts_dir.display());
    let start = Instant::now();
    let orchestrator = RecommendationOrchestrator::from_config(&config, force)
        .await
        .context("Failed to start the recommender")?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        orchestrator.state().len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Build { .. } => handle_build(&orchestrator, &config),
        Commands::Genres => handle_genres(&orchestrator),
        Commands::Browse { genre, limit } => handle_browse(&orchestrator, &genre, limit),
        Commands::Search { title } => handle_search(&orchestrator, &title),
        Commands::Recommend {
            title,
            limit,
            overview,
        } => handle_recommend(&orchestrator, &title, limit, overview).await?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'build' command
fn handle_build(orchestrator: &RecommendationOrchestrator, config: &Config) {
    let state = orchestrator.state();
    println!("{}", "Artifacts ready:".bold().blue());
    println!("{}Directory: {}", "• ".green(), config.artifacts_dir.display());
    println!("{}Movies: {}", "• ".green(), state.len());
    println!(
        "{}Similarity matrix: {}x{}",
        "• ".green(),
        state.matrix().dim(),
        state.matrix().dim()
    );
    println!("{}Genres: {}", "• ".green(), orchestrator.all_genres().len());
}

/// Handle the 'genres' command
fn handle_genres(orchestrator: &RecommendationOrchestrator) {
    let genres = orchestrator.all_genres();
    println!("{}", format!("{} genres:", genres.len()).bold().blue());
    for genre in genres {
        let count = orchestrator.filter_by_genre(&[genre.as_str()]).len();
        println!("  - {} ({} movies)", genre, count);
    }
}

/// Handle the 'browse' command
fn handle_browse(orchestrator: &RecommendationOrchestrator, genres: &[String], limit: usize) {
    let movies = orchestrator.filter_by_genre(genres);
    let heading = if genres.is_empty() {
        format!("{} movies:", movies.len())
    } else {
        format!("{} movies in {}:", movies.len(), genres.join(" | "))
    };
    println!("{}", heading.bold().blue());
    print_movies(&movies, limit);
}

/// Handle the 'search' command
fn handle_search(orchestrator: &RecommendationOrchestrator, title: &str) {
    let title_lower = title.to_lowercase();
    let mut matches = orchestrator.search_titles(title);

    // Exact matches first; the sort is stable, so table order holds otherwise
    matches.sort_by_key(|movie| movie.title.to_lowercase() != title_lower);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    print_movies(&matches, 20);
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    title: &str,
    limit: Option<usize>,
    overview: bool,
) -> Result<()> {
    let limit = limit.unwrap_or(orchestrator.top_k());
    let recommendations = orchestrator
        .recommend(title, limit)
        .await
        .with_context(|| format!("Could not recommend movies for '{}'", title))?;

    println!("{}", format!("Because you liked '{}':", title).bold().blue());
    print_recommendations(&recommendations, overview);
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }
    if orchestrator.state().is_empty() {
        bail!("No movies loaded");
    }
    let movie_count = orchestrator.state().len();

    // Pick random query titles
    let titles: Vec<String> = (0..requests)
        .filter_map(|_| {
            let index = rand::random::<u32>() as usize % movie_count;
            orchestrator.state().movie(index).map(|m| m.title.clone())
        })
        .collect();

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let started = Instant::now();
    let mut handles = vec![];
    for title in titles {
        let orchestrator = orchestrator.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            orchestrator.get_recommendations(&title).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = started.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", timings.len(), concurrent.max(1));
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_movies(movies: &[&MovieRecord], limit: usize) {
    for movie in movies.iter().take(limit) {
        println!(
            "{}: {} [{}]",
            movie.id.to_string().cyan(),
            movie.title,
            movie.genres.join(", ")
        );
    }
    if movies.len() > limit {
        println!("  ... and {} more", movies.len() - limit);
    }
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[MovieRecommendation], overview: bool) {
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] - Score: {:.3}",
            (rank + 1).to_string().green(),
            rec.title.bold(),
            rec.genres.join(", "),
            rec.score
        );
        println!("   Poster: {}", rec.poster_url);
        if overview {
            println!("   {}", rec.overview.join(" "));
        }
    }
}
