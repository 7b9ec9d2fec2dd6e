//! MovieScope Desktop: Dioxus front-end over the search session.

use std::sync::Mutex;

use dioxus::prelude::*;
use moviescope_core::Config;

mod app;
mod movies;
mod search;
mod state;

use app::App;

/// Loaded before Dioxus launches, consumed on first render.
pub static INITIAL_CONFIG: Mutex<Option<Config>> = Mutex::new(None);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("moviescope=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{e}");
        eprintln!("  Set TMDB_API_KEY to a TMDB read access token.");
        std::process::exit(1);
    });
    *INITIAL_CONFIG.lock().unwrap_or_else(|p| p.into_inner()) = Some(config);

    #[cfg(feature = "desktop")]
    {
        use dioxus::desktop::{Config as WindowConfig, LogicalSize, WindowBuilder};

        LaunchBuilder::new()
            .with_cfg(
                WindowConfig::default()
                    .with_menu(None)
                    .with_background_color((3, 0, 20, 255))
                    .with_window(
                        WindowBuilder::new()
                            .with_title("MovieScope")
                            .with_inner_size(LogicalSize::new(1280.0, 900.0))
                            .with_min_inner_size(LogicalSize::new(480.0, 600.0))
                            .with_resizable(true),
                    ),
            )
            .launch(App);
    }

    #[cfg(not(feature = "desktop"))]
    {
        dioxus::launch(App);
    }
}
