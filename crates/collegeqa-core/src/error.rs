use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A single record could not be read or normalized. Callers skip it.
    #[error("Malformed record {}: {reason}", path.display())]
    RecordParse { path: PathBuf, reason: String },

    /// The embedding backend could not be initialized or failed while
    /// embedding the corpus. The engine degrades to lexical search.
    #[error("Embedding backend unavailable: {0}")]
    EmbeddingBackendUnavailable(String),

    #[error("Invalid query: query text is empty")]
    InvalidQuery,

    /// A query-time failure of the backend (not "no matches").
    #[error("Search failed: {0}")]
    Search(String),

    #[error("Embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn record(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::RecordParse { path: path.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
