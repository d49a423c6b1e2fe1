// src/error.rs

/// Everything the pipeline can fail with.
///
/// Remote services report through [`Error::Status`] so the caller sees which
/// integration answered and what it said; transport failures (DNS, TLS,
/// timeouts on the socket) stay in [`Error::Http`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// A remote API answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Missing or malformed settings, secrets or criteria.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The scraper actor finished without producing a dataset.
    #[error("Actor run {run_id} ended with status {status}")]
    Actor { run_id: String, status: String },

    #[error("{what} did not finish within {seconds}s")]
    Timeout { what: String, seconds: u64 },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Unknown area: {name}")]
    UnknownArea { name: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config { message: message.into() }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
