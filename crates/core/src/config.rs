//! Runtime configuration: defaults, then `moviescope.toml` files, then
//! environment variables. Secrets (API tokens) are only read from the
//! environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::debounce::DEFAULT_DEBOUNCE;
use crate::error::{Error, Result};
use crate::types::DEFAULT_IMAGE_BASE;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_APPWRITE_ENDPOINT: &str = "https://cloud.appwrite.io/v1";
pub const DEFAULT_TRENDING_LIMIT: usize = 5;

/// Per-project config file, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".moviescope.toml";

/// Known keys in config files, for validation.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "tmdb_base_url",
    "image_base_url",
    "debounce_ms",
    "trending_limit",
    "appwrite_endpoint",
    "appwrite_project_id",
    "appwrite_database_id",
    "appwrite_collection_id",
];

// ---------------------------------------------------------------------------
// Cross-platform path helpers
// ---------------------------------------------------------------------------

/// Platform-aware home directory: `HOME` on Unix, `USERPROFILE` on Windows.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok().map(PathBuf::from)
}

/// `~/.moviescope` on Unix, `%APPDATA%/moviescope` on Windows.
pub fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var("APPDATA").ok().map(|a| PathBuf::from(a).join("moviescope"))
    } else {
        home_dir().map(|h| h.join(".moviescope"))
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Connection details for the Appwrite collection holding search terms.
#[derive(Clone, PartialEq)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .field("collection_id", &self.collection_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    /// TMDB v4 read access token, sent as a bearer token.
    pub tmdb_token: String,
    pub tmdb_base_url: String,
    pub image_base_url: String,
    pub debounce: Duration,
    pub trending_limit: usize,
    /// `None` when the datastore is not configured; trending is then disabled.
    pub appwrite: Option<AppwriteConfig>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("tmdb_token", &"<redacted>")
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("image_base_url", &self.image_base_url)
            .field("debounce", &self.debounce)
            .field("trending_limit", &self.trending_limit)
            .field("appwrite", &self.appwrite)
            .finish()
    }
}

/// Values that may come from a config file. Later files override earlier ones.
#[derive(Debug, Default, Clone, PartialEq)]
struct FileSettings {
    tmdb_base_url: Option<String>,
    image_base_url: Option<String>,
    debounce_ms: Option<u64>,
    trending_limit: Option<usize>,
    appwrite_endpoint: Option<String>,
    appwrite_project_id: Option<String>,
    appwrite_database_id: Option<String>,
    appwrite_collection_id: Option<String>,
}

impl FileSettings {
    fn merge(&mut self, other: FileSettings) {
        macro_rules! take {
            ($($field:ident),*) => { $( if other.$field.is_some() { self.$field = other.$field; } )* };
        }
        take!(
            tmdb_base_url,
            image_base_url,
            debounce_ms,
            trending_limit,
            appwrite_endpoint,
            appwrite_project_id,
            appwrite_database_id,
            appwrite_collection_id
        );
    }
}

impl Config {
    /// Load from `~/.moviescope/config.toml`, `./.moviescope.toml`, and the
    /// process environment.
    pub fn load() -> Result<Self> {
        let mut paths = Vec::new();
        if let Some(dir) = config_dir() {
            paths.push(dir.join("config.toml"));
        }
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(LOCAL_CONFIG_FILE));
        }
        Self::load_from(&paths, |key| std::env::var(key).ok())
    }

    /// Load from explicit config files and an environment lookup.
    pub fn load_from(paths: &[PathBuf], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut file = FileSettings::default();
        for path in paths.iter().filter(|p| p.exists()) {
            debug!(path = %path.display(), "Loading config file");
            file.merge(read_config_file(path));
        }

        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tmdb_token = env("TMDB_API_KEY").or_else(|| env("VITE_TMDB_API_KEY")).ok_or_else(|| {
            Error::Config("TMDB_API_KEY is not set (a TMDB read access token is required)".into())
        })?;

        let debounce_ms = match env("MOVIESCOPE_DEBOUNCE_MS") {
            Some(raw) => raw.parse::<u64>().map(Some).unwrap_or_else(|e| {
                warn!(value = raw.as_str(), error = %e, "Invalid MOVIESCOPE_DEBOUNCE_MS, ignoring");
                file.debounce_ms
            }),
            None => file.debounce_ms,
        };

        let appwrite = appwrite_from(&file, &env);

        Ok(Config {
            tmdb_token,
            tmdb_base_url: env("TMDB_BASE_URL")
                .or(file.tmdb_base_url)
                .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string()),
            image_base_url: file.image_base_url.unwrap_or_else(|| DEFAULT_IMAGE_BASE.to_string()),
            debounce: debounce_ms.map(Duration::from_millis).unwrap_or(DEFAULT_DEBOUNCE),
            trending_limit: file.trending_limit.unwrap_or(DEFAULT_TRENDING_LIMIT).max(1),
            appwrite,
        })
    }
}

fn appwrite_from(file: &FileSettings, env: &impl Fn(&str) -> Option<String>) -> Option<AppwriteConfig> {
    let project_id = env("APPWRITE_PROJECT_ID").or_else(|| file.appwrite_project_id.clone());
    let database_id = env("APPWRITE_DATABASE_ID").or_else(|| file.appwrite_database_id.clone());
    let collection_id =
        env("APPWRITE_COLLECTION_ID").or_else(|| file.appwrite_collection_id.clone());

    match (project_id, database_id, collection_id) {
        (Some(project_id), Some(database_id), Some(collection_id)) => Some(AppwriteConfig {
            endpoint: env("APPWRITE_ENDPOINT")
                .or_else(|| file.appwrite_endpoint.clone())
                .unwrap_or_else(|| DEFAULT_APPWRITE_ENDPOINT.to_string()),
            project_id,
            database_id,
            collection_id,
            api_key: env("APPWRITE_API_KEY"),
        }),
        (None, None, None) => {
            info!("Appwrite not configured, trending searches disabled");
            None
        }
        (p, d, c) => {
            let missing: Vec<&str> = [
                ("APPWRITE_PROJECT_ID", p.is_none()),
                ("APPWRITE_DATABASE_ID", d.is_none()),
                ("APPWRITE_COLLECTION_ID", c.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| *name)
            .collect();
            warn!(missing = ?missing, "Incomplete Appwrite configuration, trending searches disabled");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Config file parsing
// ---------------------------------------------------------------------------

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Parse one config file. Unreadable or malformed files yield no settings and
/// a warning; unknown keys warn with a typo suggestion.
fn read_config_file(path: &Path) -> FileSettings {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read config file");
            return FileSettings::default();
        }
    };
    let table = match content.parse::<toml::Table>() {
        Ok(t) => t,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse config file");
            return FileSettings::default();
        }
    };

    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
        match suggestion {
            Some(s) if edit_distance(key, s) <= 3 => warn!(
                key = key.as_str(),
                suggestion = *s,
                "Unknown key in {} (did you mean '{s}'?)",
                path.display()
            ),
            _ => warn!(
                key = key.as_str(),
                "Unknown key in {} (known keys: {})",
                path.display(),
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }

    let string = |key: &str| table.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());
    let number = |key: &str| table.get(key).and_then(|v| v.as_integer()).filter(|n| *n >= 0);

    FileSettings {
        tmdb_base_url: string("tmdb_base_url"),
        image_base_url: string("image_base_url"),
        debounce_ms: number("debounce_ms").map(|n| n as u64),
        trending_limit: number("trending_limit").map(|n| n as usize),
        appwrite_endpoint: string("appwrite_endpoint"),
        appwrite_project_id: string("appwrite_project_id"),
        appwrite_database_id: string("appwrite_database_id"),
        appwrite_collection_id: string("appwrite_collection_id"),
    }
}
