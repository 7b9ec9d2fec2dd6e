//! Test doubles for the catalog and the trending store.
//!
//! - [`FakeHttp`] is a real HTTP server on `127.0.0.1:0` (axum) that records
//!   every request and answers through a closure, so the reqwest clients are
//!   exercised end to end.
//! - [`FakeAppwrite`] builds on it with an in-memory document collection.
//! - [`FakeCatalog`] / [`FakeStore`] implement the traits directly for
//!   controller tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};

use moviescope_core::catalog::{CatalogOutcome, Endpoint, MovieCatalog};
use moviescope_core::trending::{RecordOutcome, TrendingStore};
use moviescope_core::types::{Movie, TrendingMovie};
use moviescope_core::{Error, Result};

// ---------------------------------------------------------------------------
// Recording HTTP server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn params(&self, name: &str) -> Vec<&str> {
        self.query.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str()).collect()
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> (StatusCode, Value) + Send + Sync>;

#[derive(Clone)]
struct Shared {
    respond: Responder,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct FakeHttp {
    pub base_url: String,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeHttp {
    pub async fn start(
        respond: impl Fn(&RecordedRequest) -> (StatusCode, Value) + Send + Sync + 'static,
    ) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = Shared { respond: Arc::new(respond), log: Arc::clone(&log) };
        let app = Router::new().fallback(handle).with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeHttp { base_url: format!("http://{addr}"), log }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }
}

async fn handle(State(shared): State<Shared>, req: Request) -> (StatusCode, Json<Value>) {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let query = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query,
        headers: parts.headers.clone(),
        body: serde_json::from_slice(&bytes).ok(),
    };
    let (status, value) = (shared.respond)(&recorded);
    shared.log.lock().unwrap().push(recorded);
    (status, Json(value))
}

// ---------------------------------------------------------------------------
// Fake Appwrite collection
// ---------------------------------------------------------------------------

pub const PROJECT: &str = "proj";
pub const DATABASE: &str = "db";
pub const COLLECTION: &str = "metrics";

pub struct FakeAppwrite {
    pub http: FakeHttp,
    pub documents: Arc<Mutex<Vec<Value>>>,
}

impl FakeAppwrite {
    pub async fn start() -> Self {
        let documents = Arc::new(Mutex::new(Vec::<Value>::new()));
        let docs = Arc::clone(&documents);
        let http = FakeHttp::start(move |req| appwrite_respond(&docs, req)).await;
        FakeAppwrite { http, documents }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1", self.http.base_url)
    }

    pub fn seed(&self, id: &str, term: &str, count: u64, title: &str) {
        self.documents.lock().unwrap().push(json!({
            "$id": id,
            "searchTerm": term,
            "count": count,
            "movie_id": 0,
            "title": title,
            "poster_url": format!("https://img.test/{id}.jpg"),
        }));
    }

    pub fn document(&self, term: &str) -> Option<Value> {
        self.documents.lock().unwrap().iter().find(|d| d["searchTerm"] == term).cloned()
    }
}

fn appwrite_respond(docs: &Mutex<Vec<Value>>, req: &RecordedRequest) -> (StatusCode, Value) {
    if req.header("x-appwrite-project") != Some(PROJECT) {
        return (StatusCode::UNAUTHORIZED, json!({ "message": "missing project" }));
    }
    let collection = format!("/v1/databases/{DATABASE}/collections/{COLLECTION}/documents");
    let mut docs = docs.lock().unwrap();

    match req.method.as_str() {
        "GET" if req.path == collection => {
            let mut matched: Vec<Value> = docs.clone();
            let mut limit = usize::MAX;
            for raw in req.params("queries[]") {
                let q: Value = serde_json::from_str(raw).unwrap();
                match q["method"].as_str().unwrap() {
                    "equal" => {
                        let attr = q["attribute"].as_str().unwrap();
                        matched.retain(|d| d[attr] == q["values"][0]);
                    }
                    "orderDesc" => {
                        let attr = q["attribute"].as_str().unwrap().to_string();
                        matched.sort_by_key(|d| std::cmp::Reverse(d[&attr].as_u64().unwrap_or(0)));
                    }
                    "limit" => limit = q["values"][0].as_u64().unwrap() as usize,
                    other => panic!("unexpected query method {other}"),
                }
            }
            matched.truncate(limit);
            (StatusCode::OK, json!({ "total": matched.len(), "documents": matched }))
        }
        "POST" if req.path == collection => {
            let body = req.body.clone().unwrap();
            assert_eq!(body["documentId"], "unique()");
            let mut doc = body["data"].clone();
            doc["$id"] = json!(format!("doc{}", docs.len() + 1));
            docs.push(doc.clone());
            (StatusCode::CREATED, doc)
        }
        "PATCH" if req.path.starts_with(&format!("{collection}/")) => {
            let id = req.path.rsplit('/').next().unwrap();
            let body = req.body.clone().unwrap();
            match docs.iter_mut().find(|d| d["$id"] == id) {
                Some(doc) => {
                    doc["count"] = body["data"]["count"].clone();
                    (StatusCode::OK, doc.clone())
                }
                None => (StatusCode::NOT_FOUND, json!({ "message": "not found" })),
            }
        }
        _ => (StatusCode::NOT_FOUND, json!({ "message": "no route" })),
    }
}

// ---------------------------------------------------------------------------
// In-process trait fakes
// ---------------------------------------------------------------------------

pub fn movie(id: u64, title: &str) -> Movie {
    serde_json::from_value(json!({ "id": id, "title": title })).unwrap()
}

/// Catalog answering from a table keyed by query ("" for discover). Unknown
/// keys fail with a 500. A gate can hold a query's response until released.
#[derive(Default)]
pub struct FakeCatalog {
    responses: Mutex<HashMap<String, CatalogOutcome>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, query: &str, outcome: CatalogOutcome) {
        self.responses.lock().unwrap().insert(query.to_string(), outcome);
    }

    /// Hold responses for `query` until the returned handle is notified.
    pub fn gate(&self, query: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(query.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<CatalogOutcome> {
        self.calls.lock().unwrap().push(endpoint.clone());
        let key = endpoint.query().unwrap_or("").to_string();

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let response = self.responses.lock().unwrap().get(&key).cloned();
        response.ok_or(Error::Status { status: 500, url: format!("fake://{key}") })
    }

    fn name(&self) -> &'static str {
        "fake-catalog"
    }
}

/// Store that reports every write on a channel and serves a fixed strip.
pub struct FakeStore {
    writes: mpsc::UnboundedSender<(String, u64)>,
    trending: Mutex<Result<Vec<TrendingMovie>>>,
    fail_writes: bool,
}

impl FakeStore {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(String, u64)>) {
        Self::build(false)
    }

    pub fn failing() -> (Arc<Self>, mpsc::UnboundedReceiver<(String, u64)>) {
        Self::build(true)
    }

    fn build(fail_writes: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<(String, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = FakeStore { writes: tx, trending: Mutex::new(Ok(Vec::new())), fail_writes };
        (Arc::new(store), rx)
    }

    pub fn set_trending(&self, result: Result<Vec<TrendingMovie>>) {
        *self.trending.lock().unwrap() = result;
    }
}

#[async_trait]
impl TrendingStore for FakeStore {
    async fn record_search(&self, query: &str, movie: &Movie) -> Result<RecordOutcome> {
        let _ = self.writes.send((query.to_string(), movie.id));
        if self.fail_writes {
            return Err(Error::Store("datastore unavailable".into()));
        }
        Ok(RecordOutcome::Created)
    }

    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingMovie>> {
        match &*self.trending.lock().unwrap() {
            Ok(items) => Ok(items.iter().take(limit).cloned().collect()),
            Err(e) => Err(Error::Store(e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "fake-store"
    }
}

pub fn trending_item(rank: usize, term: &str, title: &str, count: u64) -> TrendingMovie {
    TrendingMovie {
        rank,
        record_id: format!("r{rank}"),
        search_term: term.to_string(),
        movie_id: rank as u64,
        title: title.to_string(),
        poster_url: "/no-movie.png".to_string(),
        count,
    }
}
