//! Checkpoint-driven incremental fetch over a timeline of object changes.
//!
//! [`CloudObjectsIncrSource`] resolves the next instant range from the last
//! checkpoint, scans the timeline for objects changed in that range, fetches
//! their content and hands back the rows together with the checkpoint to
//! persist. Storage access sits behind the [`Timeline`], [`MetadataScanner`],
//! [`BlobStore`] and [`ObjectDataFetcher`] traits; the `Local*` types
//! implement them on a local filesystem.

mod blob;
mod error;
mod fetcher;
mod local_timeline;
mod metadata;
mod resolver;
mod scanner;
mod source;
mod timeline;

pub use blob::BlobStore;
pub use blob::LocalBlobStore;
pub use error::BlobError;
pub use error::FetchError;
pub use error::IncrSourceError;
pub use error::ScanError;
pub use error::TimelineError;
pub use fetcher::BlobObjectDataFetcher;
pub use fetcher::ObjectDataFetcher;
pub use local_timeline::ARCHIVED_SUBDIR;
pub use local_timeline::COMMIT_SUFFIX;
pub use local_timeline::LocalTimeline;
pub use local_timeline::TIMELINE_SUBDIR;
pub use metadata::ObjectMetadataFetcher;
pub use resolver::resolve_query_info;
pub use scanner::InMemoryMetadataRows;
pub use scanner::MetadataRows;
pub use scanner::MetadataScanner;
pub use source::CloudObjectsIncrSource;
pub use timeline::CompletedTimeline;
pub use timeline::Timeline;
