use crate::output::BatchSink;
use chrono::Utc;
use cloud_incr_core::CloudObjectsIncrSource;
use cloud_incr_core::IncrSourceError;
use cloud_incr_protocol::FetchOutcome;
use cloud_incr_state::BatchOutcome;
use cloud_incr_state::BatchRecord;
use cloud_incr_state::StateRuntime;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::error;
use tracing::info;

/// Drives one source against its stored checkpoint.
pub struct SyncRunner {
    source: CloudObjectsIncrSource,
    state: Arc<StateRuntime>,
    source_id: String,
    source_limit: u64,
    sink: BatchSink,
}

impl SyncRunner {
    pub fn new(
        source: CloudObjectsIncrSource,
        state: Arc<StateRuntime>,
        source_id: String,
        source_limit: u64,
        sink: BatchSink,
    ) -> Self {
        Self {
            source,
            state,
            source_id,
            source_limit,
            sink,
        }
    }

    /// Fetch one batch, write it, then commit the new checkpoint. Nothing is
    /// committed unless every earlier step succeeded.
    pub async fn run_once(&self) -> anyhow::Result<FetchOutcome> {
        let previous = self.state.get_checkpoint(&self.source_id).await?;
        let result = self
            .source
            .fetch_next_batch(previous.as_deref(), self.source_limit)
            .await?;
        let outcome = result.outcome;
        let (payload, checkpoint) = result.into_parts();

        if let Some(payload) = payload.as_ref()
            && let Some(path) = self.sink.write(payload, &checkpoint).await?
        {
            info!("wrote {} rows to {}", payload.len(), path.display());
        }

        let (batch_outcome, objects, rows) = match outcome {
            FetchOutcome::CaughtUp => return Ok(outcome),
            FetchOutcome::EmptyRange => (BatchOutcome::EmptyRange, 0, 0),
            FetchOutcome::Fetched { objects, rows } => (BatchOutcome::Fetched, objects, rows),
        };
        let record = BatchRecord {
            previous_checkpoint: previous,
            checkpoint,
            outcome: batch_outcome,
            objects: objects as u64,
            rows: rows as u64,
            committed_at: Utc::now(),
        };
        self.state.commit_batch(&self.source_id, &record).await?;
        info!(
            source_id = %self.source_id,
            outcome = batch_outcome.as_str(),
            "committed checkpoint {}",
            record.checkpoint
        );
        Ok(outcome)
    }

    /// Run batches until Ctrl-C. A failed batch is logged and retried on the
    /// next tick from the same checkpoint, except configuration errors,
    /// which end the loop.
    pub async fn run_continuous(&self, min_sync_interval: Duration) -> anyhow::Result<()> {
        loop {
            let started = Instant::now();
            tokio::select! {
                result = self.run_once() => {
                    match result {
                        Err(err) if is_fatal(&err) => return Err(err),
                        Err(err) => error!("batch for {} failed: {err:#}", self.source_id),
                        Ok(_) => {}
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted; stopping");
                    return Ok(());
                }
            }
            tokio::select! {
                _ = tokio::time::sleep_until(started + min_sync_interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted; stopping");
                    return Ok(());
                }
            }
        }
    }
}

/// Errors that retrying from the same checkpoint cannot fix.
fn is_fatal(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<IncrSourceError>(),
        Some(IncrSourceError::Configuration(_))
    )
}
