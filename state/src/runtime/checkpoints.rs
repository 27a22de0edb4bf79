use super::*;

impl StateRuntime {
    /// Last committed checkpoint for `source_id`, if any.
    pub async fn get_checkpoint(&self, source_id: &str) -> anyhow::Result<Option<String>> {
        let checkpoint = sqlx::query_scalar::<_, String>(
            r#"
SELECT checkpoint
FROM source_checkpoints
WHERE source_id = ?
            "#,
        )
        .bind(source_id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(checkpoint)
    }

    /// Persist `batch.checkpoint` for `source_id` and record the batch in
    /// its history. Both writes land or neither does.
    pub async fn commit_batch(&self, source_id: &str, batch: &BatchRecord) -> anyhow::Result<()> {
        let committed_at = datetime_to_epoch_seconds(batch.committed_at);
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
INSERT INTO source_checkpoints (source_id, checkpoint, updated_at)
VALUES (?, ?, ?)
ON CONFLICT(source_id) DO UPDATE SET
    checkpoint = excluded.checkpoint,
    updated_at = excluded.updated_at
            "#,
        )
        .bind(source_id)
        .bind(batch.checkpoint.as_str())
        .bind(committed_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"
INSERT INTO batch_history (
    source_id,
    previous_checkpoint,
    checkpoint,
    outcome,
    object_count,
    row_count,
    committed_at
) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(source_id)
        .bind(batch.previous_checkpoint.as_deref())
        .bind(batch.checkpoint.as_str())
        .bind(batch.outcome.as_str())
        .bind(i64::try_from(batch.objects)?)
        .bind(i64::try_from(batch.rows)?)
        .bind(committed_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Up to `limit` most recent batches for `source_id`, newest first.
    pub async fn recent_batches(
        &self,
        source_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<BatchRecord>> {
        let rows = sqlx::query(
            r#"
SELECT previous_checkpoint, checkpoint, outcome, object_count, row_count, committed_at
FROM batch_history
WHERE source_id = ?
ORDER BY id DESC
LIMIT ?
            "#,
        )
        .bind(source_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(BatchRecord::try_from_row).collect()
    }
}
