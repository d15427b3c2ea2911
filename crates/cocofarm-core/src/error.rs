//! Core error types for cocofarm-core.
//!
//! Every fallible boundary (normalization, catalog decoding, cache, HTTP
//! provider, configuration) has its own `thiserror` enum; [`CoreError`] wraps
//! them for callers that just want `?` to work.
//!
//! The feasibility evaluator and the scoring engine have no error paths.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cocofarm-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Weather payload could not be normalized
    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    /// Task catalog could not be decoded
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Offline cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Remote API errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A weather payload is missing the structure needed to build an observation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    /// Payload was null or absent
    #[error("weather payload is null")]
    NullInput,

    /// Neither a `weather` array nor a scalar `temperature` was found
    #[error("unrecognized weather payload shape")]
    UnknownShape,

    /// Live payload lacks structural fields
    #[error("missing required weather fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// A task's `weatherRestrictions` text is not a JSON array of integers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid weatherRestrictions for task '{task}': {message}")]
pub struct TaskParseError {
    pub task: String,
    pub message: String,
}

/// Task catalog decoding errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Top-level payload is not a JSON array
    #[error("task catalog must be a JSON array")]
    NotAnArray,

    /// A catalog entry could not be decoded into a task definition
    #[error("invalid task at index {index}: {source}")]
    InvalidTask {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Raw JSON text was malformed
    #[error("malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Offline cache errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the cache database
    #[error("Failed to open cache at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Cache is locked by another process
    #[error("Cache is locked")]
    Locked,

    /// In-memory store mutex was poisoned
    #[error("Cache store poisoned")]
    Poisoned,
}

/// Remote task/weather provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport or HTTP error
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Base URL could not be joined with an endpoint path
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not the expected JSON
    #[error("Invalid response body from {url}: {message}")]
    InvalidBody { url: String, message: String },

    /// Network failed and nothing was cached under the key
    #[error("'{key}' unavailable: offline and no cached copy")]
    Unavailable { key: String },

    /// Cache failed while reading a fallback or writing a fresh copy
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be prepared
    #[error("Cannot prepare data directory: {0}")]
    DataDir(#[from] std::io::Error),
}

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    CacheError::Locked
                } else {
                    CacheError::QueryFailed(err.to_string())
                }
            }
            _ => CacheError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
