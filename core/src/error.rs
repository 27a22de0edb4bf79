use cloud_incr_config::ConfigError;
use cloud_incr_protocol::RelationParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single fetch invocation. Whatever the variant, no checkpoint
/// was produced and the caller must keep the one it already has.
#[derive(Debug, Error)]
pub enum IncrSourceError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("failed to resolve instant range: {0}")]
    RangeResolution(#[from] TimelineError),
    #[error("metadata scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("object fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("no timeline found at {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read timeline at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read commit {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse commit {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: RelationParseError,
    },
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("object not found: {path}")]
    NotFound { path: String },
    #[error("object path escapes the store root: {path}")]
    InvalidPath { path: String },
    #[error("failed to access object {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error("metadata row {index} is invalid: {message}")]
    InvalidMetadata { index: usize, message: String },
    #[error("failed to parse object {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: RelationParseError,
    },
    #[error("object {path} has no `{field}=` segment in its path")]
    MissingPartitionField { path: String, field: String },
}
