//! MovieScope core: search a movie catalog as the user types, and keep a
//! popularity count of what people search for.
//!
//! # Modules
//!
//! - [`debounce`]: Trailing-edge debouncing of search input
//! - [`catalog`]: Endpoint selection and the TMDB client
//! - [`trending`]: Search-term counters in an Appwrite collection
//! - [`session`]: UI state, its transitions, and the search controller
//! - [`view`]: Rendering as a pure projection of the UI state
//! - [`types`]: Catalog and datastore shapes with display fallbacks
//! - [`config`]: Defaults, config files, and environment overrides
//! - [`error`]: Crate error type

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod session;
pub mod trending;
pub mod types;
pub mod view;

pub use catalog::{CatalogOutcome, Endpoint, MovieCatalog, TmdbClient};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{SearchController, UiState};
pub use trending::{AppwriteStore, TrendingStore};
pub use types::{Movie, TrendingMovie};
