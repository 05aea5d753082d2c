//! Error types for the weather collector
//!
//! Two layers: [`SourceError`] is the typed outcome of a single upstream
//! fetch and is always absorbed into a source status, while
//! [`CollectorError`] covers the few failures that can stop a run
//! (configuration, state store, writing the output document).

use thiserror::Error;

/// Errors that can abort a collector run
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// State store read/write errors
    #[error("State store error: {message}")]
    Store { message: String },

    /// HTTP client construction errors
    #[error("HTTP client error: {message}")]
    Client { message: String },

    /// JSON (de)serialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CollectorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new state store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new HTTP client error
    pub fn client<S: Into<String>>(message: S) -> Self {
        Self::Client {
            message: message.into(),
        }
    }
}

/// Failure of one upstream source fetch.
///
/// Never fatal: the collector records it in the source's status and carries
/// on with cached or placeholder data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx HTTP response
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Body could not be decoded or scraped
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response was well-formed but held no usable reading
    #[error("No data: {0}")]
    NoData(String),

    /// Provider answered with an explicit error payload
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl SourceError {
    /// Stable machine-readable kind, recorded next to the message
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Network(_) => "network",
            SourceError::Http(_) => "http",
            SourceError::Parse(_) => "parse",
            SourceError::NoData(_) => "no_data",
            SourceError::Upstream(_) => "upstream",
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SourceError::Http(status.as_u16())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for SourceError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(inner) => inner.into(),
            reqwest_middleware::Error::Middleware(inner) => SourceError::Network(inner.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}
