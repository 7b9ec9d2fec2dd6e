//! Trending searches: a popularity counter per normalized search term, kept in
//! an Appwrite collection.
//!
//! Documents carry `searchTerm`, `count`, `movie_id`, `title`, and
//! `poster_url`. A search increments the counter of an existing term or
//! creates the term with `count = 1`; the trending strip lists the terms with
//! the highest counters.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{AppwriteConfig, Config};
use crate::error::{Error, Result};
use crate::types::{normalize_term, Movie, NewSearchTerm, SearchTermRecord, TrendingMovie};

/// What a write to the trending store did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Incremented { count: u64 },
}

#[async_trait]
pub trait TrendingStore: Send + Sync {
    /// Count one search for `query`, remembering `movie` as its top result
    /// when the term is new.
    async fn record_search(&self, query: &str, movie: &Movie) -> Result<RecordOutcome>;

    /// Up to `limit` terms, highest count first, ranked from 1. A `limit` of
    /// zero is read as one.
    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingMovie>>;

    /// Store name for logging.
    fn name(&self) -> &'static str;
}

/// Record a search on a detached task. Failures are logged and never reach
/// the caller; the handle is returned only so tests can wait on it.
pub fn record_in_background(
    store: Arc<dyn TrendingStore>,
    query: String,
    movie: Movie,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.record_search(&query, &movie).await {
            Ok(outcome) => debug!(
                store = store.name(),
                query = query.as_str(),
                movie_id = movie.id,
                outcome = ?outcome,
                "Recorded search"
            ),
            Err(e) => warn!(
                store = store.name(),
                query = query.as_str(),
                error = %e,
                "Error updating search count"
            ),
        }
    })
}

// ---------------------------------------------------------------------------
// Appwrite query strings (JSON form, Appwrite 1.5+)
// ---------------------------------------------------------------------------

pub mod queries {
    use serde_json::json;

    pub fn equal(attribute: &str, value: &str) -> String {
        json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
    }

    pub fn order_desc(attribute: &str) -> String {
        json!({ "method": "orderDesc", "attribute": attribute }).to_string()
    }

    pub fn limit(n: usize) -> String {
        json!({ "method": "limit", "values": [n] }).to_string()
    }
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<SearchTermRecord>,
}

// ---------------------------------------------------------------------------
// Appwrite store
// ---------------------------------------------------------------------------

pub struct AppwriteStore {
    http: reqwest::Client,
    config: AppwriteConfig,
    image_base: String,
}

impl AppwriteStore {
    pub fn new(config: AppwriteConfig, image_base: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), config, image_base: image_base.into() }
    }

    /// `None` when the config has no Appwrite section.
    pub fn from_config(config: &Config) -> Option<Self> {
        config.appwrite.clone().map(|aw| Self::new(aw, config.image_base_url.clone()))
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.config.database_id),
            urlencoding::encode(&self.config.collection_id),
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header("X-Appwrite-Project", &self.config.project_id);
        match &self.config.api_key {
            Some(key) => req.header("X-Appwrite-Key", key),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, url: &str) -> Result<reqwest::Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(resp)
    }

    async fn list(&self, queries: &[String]) -> Result<Vec<SearchTermRecord>> {
        let url = self.documents_url();
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let resp = self.send(self.request(Method::GET, &url).query(&params), &url).await?;
        let body: DocumentList =
            resp.json().await.map_err(|e| Error::Decode(format!("{url}: {e}")))?;
        Ok(body.documents)
    }
}

#[async_trait]
impl TrendingStore for AppwriteStore {
    async fn record_search(&self, query: &str, movie: &Movie) -> Result<RecordOutcome> {
        let term = normalize_term(query);
        if term.is_empty() {
            return Err(Error::Store("refusing to record an empty search term".into()));
        }

        let existing = self.list(&[queries::equal("searchTerm", &term), queries::limit(1)]).await?;

        match existing.into_iter().next() {
            Some(doc) => {
                let count = doc.count + 1;
                let url = format!("{}/{}", self.documents_url(), urlencoding::encode(&doc.id));
                let body = serde_json::json!({ "data": { "count": count } });
                self.send(self.request(Method::PATCH, &url).json(&body), &url).await?;
                debug!(term = term.as_str(), count, "Incremented search term");
                Ok(RecordOutcome::Incremented { count })
            }
            None => {
                let url = self.documents_url();
                let data = NewSearchTerm::first_hit(term, movie, &self.image_base);
                let body = serde_json::json!({ "documentId": "unique()", "data": data });
                self.send(self.request(Method::POST, &url).json(&body), &url).await?;
                debug!(term = data.search_term.as_str(), movie_id = movie.id, "Created search term");
                Ok(RecordOutcome::Created)
            }
        }
    }

    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingMovie>> {
        let docs =
            self.list(&[queries::limit(limit.max(1)), queries::order_desc("count")]).await?;
        Ok(docs
            .into_iter()
            .enumerate()
            .map(|(i, doc)| TrendingMovie::from_record(i + 1, doc))
            .collect())
    }

    fn name(&self) -> &'static str {
        "appwrite"
    }
}
