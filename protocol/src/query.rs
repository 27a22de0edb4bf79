use crate::Instant;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryType {
    /// The start instant is still on the active timeline; read the commits
    /// in range directly.
    Incremental,
    /// The start instant precedes the active timeline (expired checkpoint or
    /// reading from the origin); archived commits must be consulted too.
    Snapshot,
}

/// The range one fetch covers: `(start_instant, end_instant]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub query_type: QueryType,
    /// Retained instant immediately before `start_instant`, or
    /// `start_instant` itself when there is none.
    pub previous_instant: Instant,
    pub start_instant: Instant,
    pub end_instant: Instant,
}

impl QueryInfo {
    pub fn new(
        query_type: QueryType,
        previous_instant: Instant,
        start_instant: Instant,
        end_instant: Instant,
    ) -> Self {
        Self {
            query_type,
            previous_instant,
            start_instant,
            end_instant,
        }
    }

    pub fn are_start_and_end_instants_equal(&self) -> bool {
        self.start_instant == self.end_instant
    }

    pub fn is_incremental(&self) -> bool {
        self.query_type == QueryType::Incremental
    }

    pub fn is_snapshot(&self) -> bool {
        self.query_type == QueryType::Snapshot
    }

    /// Exclusive start, inclusive end.
    pub fn contains(&self, instant: &Instant) -> bool {
        *instant > self.start_instant && *instant <= self.end_instant
    }
}
