//! MovieScope CLI: search TMDB and browse trending searches from the terminal.
//!
//! Talks to the catalog and the trending store directly, no server needed.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use moviescope_core::debounce::debounced;
use moviescope_core::session::UiState;
use moviescope_core::trending::TrendingStore;
use moviescope_core::view::{project, MovieCard};
use moviescope_core::{AppwriteStore, Config, SearchController, TmdbClient};

/// MovieScope CLI: movie search with trending searches.
#[derive(Parser)]
#[command(name = "ms", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    Search {
        /// Search query (multiple words are joined with spaces)
        #[arg(required = true)]
        query: Vec<String>,

        /// Do not count this search in trending
        #[arg(long)]
        no_record: bool,
    },
    /// List popular movies
    Popular {
        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show the most searched terms
    Trending {
        /// Number of entries (default: configured trending limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search as you type: every stdin line replaces the search text.
    /// A line reading `:more` reloads the trending list.
    Watch {
        /// Quiet period before a search is sent (default: configured debounce)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

const LOAD_MORE: &str = ":more";

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("{e}");
        eprintln!("  Set TMDB_API_KEY to a TMDB read access token.");
        std::process::exit(1);
    })
}

fn print_json(value: serde_json::Value) {
    println!("{value:#}");
}

/// Print the movie list (or the error) of `state`. Returns the exit code.
fn print_listing(state: &UiState, image_base: &str, limit: usize, json: bool) -> i32 {
    let cards: Vec<MovieCard> =
        state.movies.iter().take(limit).map(|m| MovieCard::from_movie(m, image_base)).collect();

    if json {
        print_json(serde_json::json!({
            "query": state.query.trim(),
            "movies": cards,
            "error": state.error,
        }));
        return i32::from(state.error.is_some());
    }

    if let Some(message) = &state.error {
        eprintln!("{message}");
        return 1;
    }
    if cards.is_empty() {
        eprintln!("No movies found.");
        return 1;
    }
    for card in &cards {
        println!("{card}");
    }
    eprintln!("\n{} movies (showing {})", state.movies.len(), cards.len());
    0
}

fn render(ctl: &SearchController, image_base: &str, json: bool) {
    let page = project(&ctl.snapshot(), image_base);
    if json {
        print_json(serde_json::json!(page));
    } else {
        println!("{page}");
    }
}

async fn watch(config: &Config, interval: Duration, json: bool) {
    let ctl = SearchController::from_config(config);
    let image_base = config.image_base_url.as_str();

    ctl.load_trending().await;
    ctl.search("").await;
    render(&ctl, image_base, json);

    let (input_tx, input_rx) = mpsc::channel::<String>(64);
    let (more_tx, mut more_rx) = mpsc::channel::<()>(4);
    let mut settled = debounced(input_rx, interval);

    let reader = tokio::spawn({
        let ctl = ctl.clone();
        async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim() == LOAD_MORE {
                    let _ = more_tx.send(()).await;
                    continue;
                }
                ctl.set_input(&line);
                if input_tx.send(line).await.is_err() {
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            query = settled.recv() => match query {
                Some(query) => {
                    ctl.search(&query).await;
                    render(&ctl, image_base, json);
                }
                None => break,
            },
            Some(()) = more_rx.recv() => {
                if ctl.load_trending().await {
                    render(&ctl, image_base, json);
                } else if !ctl.has_trending() {
                    eprintln!("Trending is not configured.");
                }
            }
        }
    }

    let _ = reader.await;
    ctl.flush_writes().await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("moviescope=warn".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command {
        Commands::Search { query, no_record } => {
            let query = query.join(" ");
            let ctl = if no_record {
                SearchController::new(Arc::new(TmdbClient::from_config(&config)), None)
            } else {
                SearchController::from_config(&config)
            };

            ctl.search(&query).await;
            ctl.flush_writes().await;
            let code = print_listing(&ctl.snapshot(), &config.image_base_url, usize::MAX, cli.json);
            std::process::exit(code);
        }
        Commands::Popular { limit } => {
            let ctl = SearchController::new(Arc::new(TmdbClient::from_config(&config)), None);
            ctl.search("").await;
            let code = print_listing(&ctl.snapshot(), &config.image_base_url, limit, cli.json);
            std::process::exit(code);
        }
        Commands::Trending { limit } => {
            let Some(store) = AppwriteStore::from_config(&config) else {
                eprintln!("Trending is not configured.");
                eprintln!(
                    "  Set APPWRITE_PROJECT_ID, APPWRITE_DATABASE_ID and APPWRITE_COLLECTION_ID."
                );
                std::process::exit(1);
            };

            let items = match store.top_searches(limit.unwrap_or(config.trending_limit)).await {
                Ok(items) => items,
                Err(e) => {
                    eprintln!("Could not load trending searches: {e}");
                    std::process::exit(1);
                }
            };

            if cli.json {
                print_json(serde_json::json!(items));
            } else if items.is_empty() {
                eprintln!("No searches recorded yet.");
            } else {
                for item in &items {
                    println!(
                        "{:>2}. {:<40} {:>5}  \"{}\"",
                        item.rank, item.title, item.count, item.search_term
                    );
                }
            }
        }
        Commands::Watch { debounce_ms } => {
            let interval = debounce_ms.map(Duration::from_millis).unwrap_or(config.debounce);
            watch(&config, interval, cli.json).await;
        }
    }
}
