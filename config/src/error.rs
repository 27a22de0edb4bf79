use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems. None of these are retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option `{key}`")]
    MissingRequired { key: &'static str },

    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error(
        "no checkpoint to resume from and `missing_checkpoint_strategy` is not set; \
         set it to `from_earliest_retained` or `from_latest`"
    )]
    MissingCheckpointStrategy,

    #[error("invalid override `{raw}`: {message}")]
    InvalidOverride { raw: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}
