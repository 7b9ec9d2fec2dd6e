//! Shapes exchanged with the movie catalog and the trending datastore, plus the
//! display fallbacks applied when a field is missing.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Display fallbacks
// ---------------------------------------------------------------------------

/// Shown in place of a missing rating, year, or language.
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown in place of a missing title.
pub const UNTITLED: &str = "Untitled";

/// Poster used when the catalog has no image for a movie.
pub const FALLBACK_POSTER: &str = "/no-movie.png";

/// Default TMDB image base (w500 renditions).
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// A movie as returned by the catalog. Only `id` is required; everything else
/// is rendered with a fallback when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl Movie {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => UNTITLED,
        }
    }

    /// Rating with one decimal, e.g. `7.3`.
    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(v) if v > 0.0 => format!("{v:.1}"),
            _ => NOT_AVAILABLE.to_string(),
        }
    }

    /// Release year taken from `release_date` (`YYYY-MM-DD`).
    pub fn year_label(&self) -> &str {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn language_label(&self) -> &str {
        match self.original_language.as_deref() {
            Some(l) if !l.is_empty() => l,
            _ => NOT_AVAILABLE,
        }
    }

    /// Full poster URL under `image_base`, or [`FALLBACK_POSTER`].
    pub fn poster_url(&self, image_base: &str) -> String {
        match self.poster_path.as_deref() {
            Some(p) if !p.is_empty() => format!("{}{}", image_base.trim_end_matches('/'), p),
            _ => FALLBACK_POSTER.to_string(),
        }
    }
}

/// Logical-failure flag embedded in some catalog bodies. Seen both as a JSON
/// boolean and as the string `"False"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseFlag {
    Bool(bool),
    Text(String),
}

impl ResponseFlag {
    pub fn is_failure(&self) -> bool {
        match self {
            ResponseFlag::Bool(b) => !b,
            ResponseFlag::Text(s) => s.trim().eq_ignore_ascii_case("false"),
        }
    }
}

/// Body of the search and discover endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Movie>,
    #[serde(rename = "Response", default)]
    pub response: Option<ResponseFlag>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CatalogResponse {
    /// Embedded failure message when the body flags a logical failure.
    pub fn rejection(&self) -> Option<&str> {
        match &self.response {
            Some(flag) if flag.is_failure() => Some(
                self.error.as_deref().filter(|e| !e.trim().is_empty()).unwrap_or(REJECTED_FALLBACK),
            ),
            _ => None,
        }
    }
}

/// Message used when a logical failure carries no text of its own.
pub const REJECTED_FALLBACK: &str = "Failed to fetch movies";

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Trending types
// ---------------------------------------------------------------------------

/// A search-term document in the trending collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTermRecord {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub movie_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// Attributes written when a search term is seen for the first time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSearchTerm {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    pub title: String,
    pub poster_url: String,
}

impl NewSearchTerm {
    pub fn first_hit(search_term: String, movie: &Movie, image_base: &str) -> Self {
        Self {
            search_term,
            count: 1,
            movie_id: movie.id,
            title: movie.display_title().to_string(),
            poster_url: movie.poster_url(image_base),
        }
    }
}

/// One entry of the trending strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingMovie {
    /// 1-based position in the strip.
    pub rank: usize,
    pub record_id: String,
    pub search_term: String,
    pub movie_id: u64,
    pub title: String,
    pub poster_url: String,
    pub count: u64,
}

impl TrendingMovie {
    pub fn from_record(rank: usize, record: SearchTermRecord) -> Self {
        Self {
            rank,
            title: record.title.filter(|t| !t.is_empty()).unwrap_or_else(|| UNTITLED.to_string()),
            poster_url: record
                .poster_url
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| FALLBACK_POSTER.to_string()),
            record_id: record.id,
            search_term: record.search_term,
            movie_id: record.movie_id,
            count: record.count,
        }
    }
}

/// Key under which a query is counted: trimmed, whitespace-collapsed, lowercase.
pub fn normalize_term(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
