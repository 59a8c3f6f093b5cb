use std::path::PathBuf;
use thiserror::Error;

use crate::corpus::CorpusError;
use crate::embedding::{EmbeddingError, VectorIndexError};
use crate::retrieval::SearchError;

/// Main error type for Versewise
#[derive(Error, Debug)]
pub enum VersewiseError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Prototype registry errors (bad regex, empty phrase set, ...)
    #[error("Prototype error: {0}")]
    Prototype(String),

    /// Corpus loading or lookup errors
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Embedding provider errors raised while building caches or indexes
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Vector index construction errors
    #[error("Vector index error: {0}")]
    VectorIndex(#[from] VectorIndexError),

    /// Retrieval engine construction errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Session related errors
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for Versewise operations
pub type Result<T> = std::result::Result<T, VersewiseError>;
