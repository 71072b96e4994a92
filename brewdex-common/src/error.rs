use std::sync::Arc;

use thiserror::Error;

use crate::registry::{IngestError, LookupError};

#[derive(Error, Debug, Clone)]
pub enum BrewdexError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Semantic Versioning Error: {0}")]
    SemVer(#[from] Arc<semver::Error>),

    #[error("URL Error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Cache Error: {0}")]
    Cache(String),

    #[error("Ingest Error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Lookup Error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Parsing Error in {0}: {1}")]
    ParseError(String, String),

    #[error("Version error: {0}")]
    VersionError(String),

    #[error("Checksum Error: {0}")]
    ChecksumError(String),

    #[error("Checksum Mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl From<std::io::Error> for BrewdexError {
    fn from(err: std::io::Error) -> Self {
        BrewdexError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for BrewdexError {
    fn from(err: serde_json::Error) -> Self {
        BrewdexError::Json(Arc::new(err))
    }
}

impl From<semver::Error> for BrewdexError {
    fn from(err: semver::Error) -> Self {
        BrewdexError::SemVer(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BrewdexError>;
