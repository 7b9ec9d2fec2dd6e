//! Movie catalog access: endpoint selection and the TMDB HTTP client.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{CatalogResponse, Movie};

// ---------------------------------------------------------------------------
// Endpoint selection
// ---------------------------------------------------------------------------

/// Which catalog listing a query maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Free-text search for the (trimmed, non-empty) query.
    Search(String),
    /// Popular movies, most popular first.
    Discover,
}

impl Endpoint {
    /// Empty or whitespace-only queries browse popular movies.
    pub fn for_query(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            Endpoint::Discover
        } else {
            Endpoint::Search(query.to_string())
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Endpoint::Search(q) => format!("{base}/search/movie?query={}", urlencoding::encode(q)),
            Endpoint::Discover => format!("{base}/discover/movie?sort_by=popularity.desc"),
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Endpoint::Search(q) => Some(q),
            Endpoint::Discover => None,
        }
    }
}

/// What a successful round trip to the catalog produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogOutcome {
    Found(Vec<Movie>),
    /// The body flagged a logical failure; carries the message to show.
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// Source of movie listings.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch one listing. Transport failures, non-2xx statuses, and
    /// undecodable bodies are errors; a logical failure flagged in the body is
    /// [`CatalogOutcome::Rejected`].
    async fn fetch(&self, endpoint: &Endpoint) -> Result<CatalogOutcome>;

    /// Catalog name for logging.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// TMDB client
// ---------------------------------------------------------------------------

pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into(), token: token.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tmdb_base_url.clone(), config.tmdb_token.clone())
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<CatalogOutcome> {
        let url = endpoint.url(&self.base_url);
        debug!(url = %url, "Fetching catalog listing");

        let resp = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status { status: status.as_u16(), url });
        }

        let body: CatalogResponse =
            resp.json().await.map_err(|e| Error::Decode(format!("{url}: {e}")))?;

        if let Some(message) = body.rejection().map(str::to_string) {
            return Ok(CatalogOutcome::Rejected(message));
        }
        Ok(CatalogOutcome::Found(body.results))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
