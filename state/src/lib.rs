//! SQLite-backed checkpoint store for incremental sources.
//!
//! Each source id keeps its latest checkpoint plus a history of the batches
//! that produced it. A checkpoint and its history row are always written in
//! the same transaction.

mod migrations;
mod model;
mod runtime;

pub use model::BatchOutcome;
pub use model::BatchRecord;
/// Preferred entrypoint.
pub use runtime::StateRuntime;
pub use runtime::STATE_DB_FILENAME;
pub use runtime::STATE_DB_VERSION;
pub use runtime::state_db_filename;
pub use runtime::state_db_path;
