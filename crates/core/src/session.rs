//! Search session: UI state, its transitions, and the controller that runs the
//! debounce → fetch → update loop.
//!
//! State moves `idle → loading → {success, error} → idle` on every settled
//! query. Each fetch is stamped with a [`SearchTicket`]; a response whose
//! ticket is older than the newest issued one is dropped, so a slow earlier
//! request can never overwrite the results of a later one.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogOutcome, Endpoint, MovieCatalog, TmdbClient};
use crate::config::{Config, DEFAULT_TRENDING_LIMIT};
use crate::error::Result;
use crate::trending::{record_in_background, AppwriteStore, TrendingStore};
use crate::types::{Movie, TrendingMovie};

/// Shown for any transport, status, or decoding failure of a search.
pub const FETCH_FAILED: &str = "Failed to fetch movies. Please try again later.";

// ---------------------------------------------------------------------------
// Listing: the user-visible result of one fetch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub movies: Vec<Movie>,
    pub error: Option<String>,
}

impl Listing {
    /// Collapse a catalog result into what the user sees: either movies, or an
    /// error message with an empty list.
    pub fn from_result(result: Result<CatalogOutcome>) -> Self {
        match result {
            Ok(CatalogOutcome::Found(movies)) => Listing { movies, error: None },
            Ok(CatalogOutcome::Rejected(message)) => {
                Listing { movies: Vec::new(), error: Some(message) }
            }
            Err(_) => Listing { movies: Vec::new(), error: Some(FETCH_FAILED.to_string()) },
        }
    }
}

/// The search term and top result to count in the trending store, if any.
/// Only searches that typed a query and found something qualify.
pub fn trending_candidate(endpoint: &Endpoint, outcome: &CatalogOutcome) -> Option<(String, Movie)> {
    match (endpoint.query(), outcome) {
        (Some(query), CatalogOutcome::Found(movies)) => {
            movies.first().map(|top| (query.to_string(), top.clone()))
        }
        _ => None,
    }
}

/// Fetch one listing and log how it went. Returns the listing together with
/// the trending candidate, if any.
pub async fn fetch_listing(
    catalog: &dyn MovieCatalog,
    endpoint: &Endpoint,
) -> (Listing, Option<(String, Movie)>) {
    let result = catalog.fetch(endpoint).await;

    match &result {
        Ok(CatalogOutcome::Found(movies)) => info!(
            catalog = catalog.name(),
            query = endpoint.query().unwrap_or(""),
            results = movies.len(),
            "Fetched movies"
        ),
        Ok(CatalogOutcome::Rejected(message)) => warn!(
            catalog = catalog.name(),
            query = endpoint.query().unwrap_or(""),
            message = message.as_str(),
            "Catalog rejected request"
        ),
        Err(e) => error!(
            catalog = catalog.name(),
            query = endpoint.query().unwrap_or(""),
            error = %e,
            "Error fetching movies"
        ),
    }

    let candidate = result.as_ref().ok().and_then(|outcome| trending_candidate(endpoint, outcome));
    (Listing::from_result(result), candidate)
}

// ---------------------------------------------------------------------------
// UI state
// ---------------------------------------------------------------------------

/// Identifies one issued search. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Everything the page shows. Lives for one session; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Raw text in the search box.
    pub input: String,
    /// Last settled query handed to the fetcher.
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
    pub movies: Vec<Movie>,
    pub trending: Vec<TrendingMovie>,
    pub(crate) latest: u64,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Enter `loading` for `query`, clearing the previous error.
    pub fn begin_search(&mut self, query: &str) -> SearchTicket {
        self.latest += 1;
        self.query = query.to_string();
        self.loading = true;
        self.error = None;
        SearchTicket(self.latest)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Apply a finished fetch and leave `loading`. Returns `false`, changing
    /// nothing, when a newer search has been issued since `ticket`.
    pub fn finish_search(&mut self, ticket: SearchTicket, listing: Listing) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.movies = listing.movies;
        self.error = listing.error;
        self.loading = false;
        true
    }

    pub fn set_trending(&mut self, items: Vec<TrendingMovie>) {
        self.trending = items;
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the session state and the two external services.
#[derive(Clone)]
pub struct SearchController {
    state: Arc<RwLock<UiState>>,
    catalog: Arc<dyn MovieCatalog>,
    trending: Option<Arc<dyn TrendingStore>>,
    trending_limit: usize,
    writes: Arc<Mutex<Vec<JoinHandle<()>>>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn MovieCatalog>, trending: Option<Arc<dyn TrendingStore>>) -> Self {
        Self {
            state: Arc::new(RwLock::new(UiState::new())),
            catalog,
            trending,
            trending_limit: DEFAULT_TRENDING_LIMIT,
            writes: Arc::new(Mutex::new(Vec::new())),
            revision: Arc::new(watch::channel(0).0),
        }
    }

    pub fn with_trending_limit(mut self, limit: usize) -> Self {
        self.trending_limit = limit;
        self
    }

    /// Controller backed by TMDB and, when configured, Appwrite.
    pub fn from_config(config: &Config) -> Self {
        let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::from_config(config));
        let trending = AppwriteStore::from_config(config)
            .map(|store| Arc::new(store) as Arc<dyn TrendingStore>);
        Self::new(catalog, trending).with_trending_limit(config.trending_limit)
    }

    pub fn has_trending(&self) -> bool {
        self.trending.is_some()
    }

    fn read(&self) -> RwLockReadGuard<'_, UiState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UiState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current state, for rendering.
    pub fn snapshot(&self) -> UiState {
        self.read().clone()
    }

    /// Receiver that wakes after every state change. Its value is a revision
    /// number; read the state itself with [`snapshot`](Self::snapshot).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn changed(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    pub fn set_input(&self, text: &str) {
        self.write().set_input(text);
        self.changed();
    }

    /// Run one search for a settled query. Returns whether the result was
    /// applied (`false` when a newer search superseded it).
    ///
    /// When a typed query finds movies, the top result is counted in the
    /// trending store on a detached task.
    pub async fn search(&self, query: &str) -> bool {
        let endpoint = Endpoint::for_query(query);
        let ticket = self.write().begin_search(query);
        self.changed();

        let (listing, candidate) = fetch_listing(self.catalog.as_ref(), &endpoint).await;

        if !self.write().finish_search(ticket, listing) {
            debug!(query, "Discarding stale search response");
            return false;
        }
        self.changed();

        if let (Some((term, movie)), Some(store)) = (candidate, &self.trending) {
            let handle = record_in_background(Arc::clone(store), term, movie);
            let mut writes = self.writes.lock().unwrap_or_else(|p| p.into_inner());
            writes.retain(|h| !h.is_finished());
            writes.push(handle);
        }
        true
    }

    /// Wait for trending writes still in flight. Short-lived front-ends call
    /// this before exiting so the last count is not lost.
    pub async fn flush_writes(&self) {
        let pending: Vec<JoinHandle<()>> = {
            let mut writes = self.writes.lock().unwrap_or_else(|p| p.into_inner());
            writes.drain(..).collect()
        };
        for handle in pending {
            let _ = handle.await;
        }
    }

    /// Refresh the trending strip. Failures are logged and the previous strip
    /// is kept. Returns whether the strip was replaced.
    pub async fn load_trending(&self) -> bool {
        let Some(store) = &self.trending else {
            return false;
        };
        match store.top_searches(self.trending_limit).await {
            Ok(items) => {
                debug!(store = store.name(), items = items.len(), "Loaded trending searches");
                self.write().set_trending(items);
                self.changed();
                true
            }
            Err(e) => {
                warn!(store = store.name(), error = %e, "Error fetching trending movies");
                false
            }
        }
    }
}
