use serde::Deserialize;
use serde::Serialize;

/// Where to start reading when there is no usable checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MissingCheckpointStrategy {
    /// Start before the oldest instant still retained and work through the
    /// backlog.
    #[serde(alias = "read_upto_latest_commit", alias = "READ_UPTO_LATEST_COMMIT")]
    FromEarliestRetained,
    /// Skip the backlog and read only the most recent instant.
    #[serde(alias = "read_latest", alias = "READ_LATEST")]
    FromLatest,
}
