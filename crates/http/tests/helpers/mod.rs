//! Test harness for the JSON API: serves the router on `127.0.0.1:0` backed
//! by in-process catalog and store fakes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use moviescope_core::catalog::{CatalogOutcome, Endpoint, MovieCatalog};
use moviescope_core::trending::{RecordOutcome, TrendingStore};
use moviescope_core::types::{Movie, TrendingMovie};
use moviescope_core::{Error, Result};
use moviescope_http::{router, AppState};
use tokio::sync::mpsc;

pub const IMAGE_BASE: &str = "https://img.test/w500";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start(state: AppState) -> Self {
        let app = router(Arc::new(state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        TestServer { base_url: format!("http://{addr}"), client: reqwest::Client::new() }
    }

    pub async fn get(&self, path: &str) -> (u16, serde_json::Value) {
        let resp = self.client.get(format!("{}{path}", self.base_url)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

pub fn state(catalog: Arc<FakeCatalog>, store: Option<Arc<FakeStore>>) -> AppState {
    AppState {
        catalog,
        trending: store.map(|s| s as Arc<dyn TrendingStore>),
        image_base: IMAGE_BASE.to_string(),
        trending_limit: 5,
    }
}

pub fn movie(id: u64, title: &str) -> Movie {
    serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
}

/// Catalog answering from a table keyed by query ("" for discover); unknown
/// queries fail with a 500.
#[derive(Default)]
pub struct FakeCatalog {
    responses: Mutex<HashMap<String, CatalogOutcome>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl FakeCatalog {
    pub fn with(responses: &[(&str, CatalogOutcome)]) -> Arc<Self> {
        let catalog = Self::default();
        for (query, outcome) in responses {
            catalog.responses.lock().unwrap().insert(query.to_string(), outcome.clone());
        }
        Arc::new(catalog)
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<CatalogOutcome> {
        self.calls.lock().unwrap().push(endpoint.clone());
        let key = endpoint.query().unwrap_or("");
        self.responses
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(Error::Status { status: 500, url: format!("fake://{key}") })
    }

    fn name(&self) -> &'static str {
        "fake-catalog"
    }
}

/// Store serving a fixed strip (or failing) and reporting writes on a channel.
pub struct FakeStore {
    items: Option<Vec<TrendingMovie>>,
    limits: Mutex<Vec<usize>>,
    writes: mpsc::UnboundedSender<(String, u64)>,
}

impl FakeStore {
    /// `items = None` makes every read fail.
    pub fn new(
        items: Option<Vec<TrendingMovie>>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<(String, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(FakeStore { items, limits: Mutex::new(Vec::new()), writes: tx }), rx)
    }

    pub fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrendingStore for FakeStore {
    async fn record_search(&self, query: &str, movie: &Movie) -> Result<RecordOutcome> {
        let _ = self.writes.send((query.to_string(), movie.id));
        Ok(RecordOutcome::Created)
    }

    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingMovie>> {
        self.limits.lock().unwrap().push(limit);
        match &self.items {
            Some(items) => Ok(items.iter().take(limit).cloned().collect()),
            None => Err(Error::Store("datastore unavailable".into())),
        }
    }

    fn name(&self) -> &'static str {
        "fake-store"
    }
}

pub fn trending(n: usize) -> Vec<TrendingMovie> {
    (1..=n)
        .map(|rank| TrendingMovie {
            rank,
            record_id: format!("r{rank}"),
            search_term: format!("term {rank}"),
            movie_id: rank as u64,
            title: format!("Movie {rank}"),
            poster_url: "/no-movie.png".to_string(),
            count: (100 - rank) as u64,
        })
        .collect()
}
