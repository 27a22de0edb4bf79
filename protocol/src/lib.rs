//! Types shared between the incremental fetch core, its collaborators and
//! the callers that persist checkpoints.
//!
//! Nothing in this crate performs I/O. The fetch protocol itself lives in
//! `cloud-incr-core`.

mod fetch;
mod format;
mod instant;
mod object;
mod query;
mod relation;
mod strategy;

pub use fetch::FetchOutcome;
pub use fetch::FetchResult;
pub use format::FileFormat;
pub use instant::Instant;
pub use instant::ORIGIN_INSTANT;
pub use instant::begin_instant_from_checkpoint;
pub use object::CloudObjectMetadata;
pub use query::QueryInfo;
pub use query::QueryType;
pub use relation::Record;
pub use relation::Relation;
pub use relation::RelationParseError;
pub use relation::parse_records;
pub use strategy::MissingCheckpointStrategy;
