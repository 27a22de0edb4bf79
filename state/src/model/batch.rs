use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// One committed fetch cycle for a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRecord {
    /// Checkpoint the cycle started from, `None` on the first run.
    pub previous_checkpoint: Option<String>,
    /// Checkpoint persisted by the cycle.
    pub checkpoint: String,
    pub outcome: BatchOutcome,
    pub objects: u64,
    pub rows: u64,
    pub committed_at: DateTime<Utc>,
}

impl BatchRecord {
    pub(crate) fn try_from_row(row: &SqliteRow) -> Result<Self> {
        let outcome: String = row.try_get("outcome")?;
        let objects: i64 = row.try_get("object_count")?;
        let rows: i64 = row.try_get("row_count")?;
        Ok(Self {
            previous_checkpoint: row.try_get("previous_checkpoint")?,
            checkpoint: row.try_get("checkpoint")?,
            outcome: BatchOutcome::parse(outcome.as_str())?,
            objects: u64::try_from(objects)?,
            rows: u64::try_from(rows)?,
            committed_at: epoch_seconds_to_datetime(row.try_get("committed_at")?)?,
        })
    }
}

/// How a fetch cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    CaughtUp,
    EmptyRange,
    Fetched,
}

impl BatchOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            BatchOutcome::CaughtUp => "caught_up",
            BatchOutcome::EmptyRange => "empty_range",
            BatchOutcome::Fetched => "fetched",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "caught_up" => Ok(Self::CaughtUp),
            "empty_range" => Ok(Self::EmptyRange),
            "fetched" => Ok(Self::Fetched),
            _ => Err(anyhow::anyhow!("invalid batch outcome: {value}")),
        }
    }
}

pub(crate) fn datetime_to_epoch_seconds(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

fn epoch_seconds_to_datetime(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid unix timestamp: {secs}"))
}
