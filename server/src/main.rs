//! MovieScope binary: serves the JSON API from [`moviescope_http`] and, when
//! a built web UI is available, its static files.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use moviescope_core::config::{config_dir, Config, LOCAL_CONFIG_FILE};
use moviescope_http::{router, AppState};

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// Movie search server: TMDB listings and trending searches as a JSON API.
#[derive(Parser)]
#[command(name = "moviescope", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to web UI dist directory
    #[arg(long)]
    dist: Option<PathBuf>,

    /// Bind to 0.0.0.0 instead of 127.0.0.1 (localhost)
    #[arg(long)]
    bind_all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration and report which services are enabled
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = ctrl_c => info!("Received SIGINT, shutting down..."),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            },
            Err(e) => {
                warn!(error = %e, "Could not register SIGTERM handler");
                let _ = ctrl_c.await;
                info!("Received SIGINT, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Web UI directory: `--dist` if given, else the first of `./dist`,
/// `../dist` and `<config dir>/dist` that holds an `index.html`.
fn resolve_dist(explicit: Option<PathBuf>, cwd: &Path, home: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let mut candidates = vec![cwd.join("dist"), cwd.join("../dist")];
    candidates.extend(home.map(|h| h.join("dist")));
    candidates.into_iter().find(|p| p.join("index.html").exists())
}

/// Ports tried in order when `PORT` is not set.
const DEFAULT_PORTS: RangeInclusive<u16> = 8432..=8441;

/// Listen on `port` when given, else on the first free port of `scan`.
async fn bind_listener(
    host: &str,
    port: Option<u16>,
    scan: RangeInclusive<u16>,
) -> Result<TcpListener, String> {
    if let Some(port) = port {
        return TcpListener::bind((host, port))
            .await
            .map_err(|e| format!("port {port} is not available ({e}); pick another PORT"));
    }
    for candidate in scan.clone() {
        if let Ok(listener) = TcpListener::bind((host, candidate)).await {
            return Ok(listener);
        }
    }
    Err(format!(
        "ports {}-{} are all taken; set PORT=<port> to choose one",
        scan.start(),
        scan.end()
    ))
}

fn load_config_or_exit() -> Config {
    Config::load().unwrap_or_else(|e| {
        error!(error = %e, "Could not load configuration");
        eprintln!("  Set TMDB_API_KEY to a TMDB read access token.");
        std::process::exit(1);
    })
}

fn run_doctor() -> i32 {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("  \u{2717} {e}");
            return 1;
        }
    };

    eprintln!("  \u{2713} TMDB token set ({})", config.tmdb_base_url);
    match &config.appwrite {
        Some(aw) => eprintln!(
            "  \u{2713} Trending store: {} (database {}, collection {})",
            aw.endpoint, aw.database_id, aw.collection_id
        ),
        None => eprintln!("  - Trending store not configured; trending is disabled"),
    }
    eprintln!("  debounce {} ms, trending limit {}", config.debounce.as_millis(), config.trending_limit);

    let local = Path::new(LOCAL_CONFIG_FILE);
    if local.exists() {
        eprintln!("  config file: {}", local.display());
    }
    if let Some(global) = config_dir().map(|d| d.join("config.toml")).filter(|p| p.exists()) {
        eprintln!("  config file: {}", global.display());
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("moviescope=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        match command {
            Commands::Doctor => std::process::exit(run_doctor()),
            Commands::Completions { shell } => {
                clap_complete::generate(
                    *shell,
                    &mut Cli::command(),
                    "moviescope",
                    &mut std::io::stdout(),
                );
                return;
            }
        }
    }

    let config = load_config_or_exit();
    let state = AppState::from_config(&config);
    info!(
        catalog = state.catalog.name(),
        trending = state.trending.as_ref().map(|s| s.name()).unwrap_or("disabled"),
        "Configured services"
    );

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let dist_dir = resolve_dist(cli.dist.clone(), &cwd, config_dir());

    let host = if cli.bind_all { "0.0.0.0" } else { "127.0.0.1" };
    let requested: Option<u16> = std::env::var("PORT").ok().and_then(|p| p.parse().ok());
    let listener = match bind_listener(host, requested, DEFAULT_PORTS).await {
        Ok(listener) => listener,
        Err(reason) => {
            error!(host = host, "Could not start listening: {reason}");
            std::process::exit(1);
        }
    };

    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(e) => {
            error!(error = %e, "Could not read bound address");
            std::process::exit(1);
        }
    };

    let mut app = router(Arc::new(state));
    match &dist_dir {
        Some(dist) => {
            let index_html = dist.join("index.html");
            app = app.fallback_service(
                ServeDir::new(dist).not_found_service(ServeFile::new(index_html)),
            );
            info!(dist = %dist.display(), "Serving web UI");
        }
        None => warn!("No dist/ directory found; serving the JSON API only"),
    }
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    info!(port = port, "http://localhost:{port}");
    // Machine-readable line for scripts (not through tracing)
    eprintln!("MOVIESCOPE_PORT={port}");

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
