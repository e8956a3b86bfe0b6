use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single collector query. Never escapes a tick.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("[{section}] {key} not found")]
    NotFound { section: String, key: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed server catalog: {0}")]
    Catalog(#[from] serde_json::Error),
    #[error("server {0} is not in the catalog")]
    UnknownServer(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("no vpn interface found")]
    NoInterface,
    #[error("connectivity probe failed: {0}")]
    Probe(String),
}

impl QueryError {
    /// Expected absences that show up every tick while disconnected.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            QueryError::NotFound { .. } | QueryError::UnknownServer(_) | QueryError::NoInterface
        )
    }
}
