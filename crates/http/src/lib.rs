//! JSON API over the movie catalog and the trending store.
//!
//! The browser UI talks to these handlers instead of TMDB directly, so the
//! bearer token and the Appwrite key stay on the server.
//!
//! | Route            | Handler          |
//! |------------------|------------------|
//! | `/api/movies`    | [`api_movies`]   |
//! | `/api/trending`  | [`api_trending`] |
//! | `/health`        | [`api_health`]   |

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use moviescope_core::catalog::{Endpoint, MovieCatalog};
use moviescope_core::config::Config;
use moviescope_core::session::fetch_listing;
use moviescope_core::trending::{record_in_background, TrendingStore};
use moviescope_core::types::TrendingMovie;
use moviescope_core::view::MovieCard;
use moviescope_core::{AppwriteStore, TmdbClient};

/// Upper bound on `/api/trending?limit=`.
pub const MAX_TRENDING_LIMIT: usize = 25;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub catalog: Arc<dyn MovieCatalog>,
    pub trending: Option<Arc<dyn TrendingStore>>,
    pub image_base: String,
    pub trending_limit: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            catalog: Arc::new(TmdbClient::from_config(config)),
            trending: AppwriteStore::from_config(config)
                .map(|store| Arc::new(store) as Arc<dyn TrendingStore>),
            image_base: config.image_base_url.clone(),
            trending_limit: config.trending_limit,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/movies", get(api_movies))
        .route("/api/trending", get(api_trending))
        .route("/health", get(api_health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct MoviesQuery {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    /// The query as searched (trimmed); empty for the popular listing.
    pub query: String,
    pub movies: Vec<MovieCard>,
    pub error: Option<String>,
}

/// Search, or list popular movies when `query` is empty. Failures come back
/// as `200` with `error` set and no movies, the way the page shows them.
pub async fn api_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MoviesQuery>,
) -> Json<MoviesResponse> {
    let endpoint = Endpoint::for_query(&q.query);
    let (listing, candidate) = fetch_listing(state.catalog.as_ref(), &endpoint).await;

    if let (Some((term, movie)), Some(store)) = (candidate, &state.trending) {
        record_in_background(Arc::clone(store), term, movie);
    }

    Json(MoviesResponse {
        query: endpoint.query().unwrap_or("").to_string(),
        movies: listing.movies.iter().map(|m| MovieCard::from_movie(m, &state.image_base)).collect(),
        error: listing.error,
    })
}

// ---------------------------------------------------------------------------
// Trending
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct TrendingQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    /// `false` when no datastore is configured.
    pub enabled: bool,
    pub items: Vec<TrendingMovie>,
}

pub async fn api_trending(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TrendingQuery>,
) -> Result<Json<TrendingResponse>, (StatusCode, Json<serde_json::Value>)> {
    let Some(store) = &state.trending else {
        return Ok(Json(TrendingResponse { enabled: false, items: Vec::new() }));
    };

    let limit = q.limit.unwrap_or(state.trending_limit).clamp(1, MAX_TRENDING_LIMIT);
    match store.top_searches(limit).await {
        Ok(items) => Ok(Json(TrendingResponse { enabled: true, items })),
        Err(e) => {
            warn!(store = store.name(), error = %e, "Error fetching trending movies");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "Trending searches are unavailable" })),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

pub async fn api_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "catalog": state.catalog.name(),
        "trending": state.trending.as_ref().map(|s| s.name()),
    }))
}
