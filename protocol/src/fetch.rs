use crate::Instant;
use crate::Relation;
use serde::Serialize;

/// Terminal state a fetch invocation reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The resolved range was empty; the checkpoint is held.
    CaughtUp,
    /// The range was scanned and referenced no objects; the checkpoint
    /// advances.
    EmptyRange,
    /// Objects were fetched. `rows` may be zero when every object vanished
    /// or held no rows; the checkpoint still advances.
    Fetched { objects: usize, rows: usize },
}

/// The unit of progress handed back on every invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub payload: Option<Relation>,
    pub next_checkpoint: Instant,
    pub outcome: FetchOutcome,
}

impl FetchResult {
    pub fn caught_up(start_instant: Instant) -> Self {
        Self {
            payload: None,
            next_checkpoint: start_instant,
            outcome: FetchOutcome::CaughtUp,
        }
    }

    pub fn empty_range(end_instant: Instant) -> Self {
        Self {
            payload: None,
            next_checkpoint: end_instant,
            outcome: FetchOutcome::EmptyRange,
        }
    }

    pub fn fetched(payload: Option<Relation>, end_instant: Instant, objects: usize) -> Self {
        let rows = payload.as_ref().map_or(0, Relation::len);
        Self {
            payload,
            next_checkpoint: end_instant,
            outcome: FetchOutcome::Fetched { objects, rows },
        }
    }

    /// The `(data-or-absent, checkpoint)` pair callers persist.
    pub fn into_parts(self) -> (Option<Relation>, String) {
        (self.payload, self.next_checkpoint.into_string())
    }
}
