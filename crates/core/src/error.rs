use thiserror::Error;

/// Errors raised by the catalog client, the trending store, and config loading.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("trending store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
