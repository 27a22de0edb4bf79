use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Begin boundary that sorts before every instant a timeline can hold.
pub const ORIGIN_INSTANT: &str = "000";

/// Position on a timeline.
///
/// Instants are fixed-width timestamps (`20240105093000123`) and compare
/// lexicographically. No arithmetic is defined on them: stepping forward or
/// backward is always answered by the timeline that owns them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(String);

impl Instant {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn origin() -> Self {
        Self(ORIGIN_INSTANT.to_string())
    }

    pub fn is_origin(&self) -> bool {
        self.0 == ORIGIN_INSTANT
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instant {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Instant {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Interpret a persisted checkpoint. An empty string means no progress was
/// ever recorded, exactly like an absent one.
pub fn begin_instant_from_checkpoint(checkpoint: Option<&str>) -> Option<Instant> {
    checkpoint
        .filter(|checkpoint| !checkpoint.is_empty())
        .map(Instant::from)
}
