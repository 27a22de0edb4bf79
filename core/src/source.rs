use crate::BlobObjectDataFetcher;
use crate::BlobStore;
use crate::IncrSourceError;
use crate::LocalBlobStore;
use crate::LocalTimeline;
use crate::MetadataScanner;
use crate::ObjectDataFetcher;
use crate::ObjectMetadataFetcher;
use crate::Timeline;
use crate::resolve_query_info;
use cloud_incr_config::SourceConfig;
use cloud_incr_protocol::FetchResult;
use cloud_incr_protocol::MissingCheckpointStrategy;
use cloud_incr_protocol::QueryInfo;
use std::sync::Arc;
use tracing::debug;
use tracing::info;

/// Incremental source over a timeline of changed cloud objects.
///
/// Each call to [`fetch_next_batch`](Self::fetch_next_batch) covers the
/// instants after the given checkpoint and returns the rows found together
/// with the checkpoint to persist. The source keeps no state between calls.
pub struct CloudObjectsIncrSource {
    num_instants_per_fetch: usize,
    missing_checkpoint_strategy: Option<MissingCheckpointStrategy>,
    check_if_file_exists: bool,
    timeline: Arc<dyn Timeline>,
    scanner: Arc<dyn MetadataScanner>,
    metadata_fetcher: ObjectMetadataFetcher,
    data_fetcher: Arc<dyn ObjectDataFetcher>,
}

impl CloudObjectsIncrSource {
    /// Source backed by the local timeline under `src_path` and the blob
    /// store rooted at `blob_root`.
    pub fn from_config(config: &SourceConfig) -> Self {
        let timeline = Arc::new(LocalTimeline::new(
            config.src_path.clone(),
            config.source_file_format,
        ));
        let blob_store: Arc<dyn BlobStore> =
            Arc::new(LocalBlobStore::new(config.blob_root.clone()));
        let data_fetcher = Arc::new(
            BlobObjectDataFetcher::new(Arc::clone(&blob_store), config.data_file_format)
                .with_partition_fields(config.cloud.partition_fields_from_path.clone())
                .with_parallelism(config.cloud.fetch_parallelism),
        );
        info!("src_path: {}", config.src_path.display());
        info!("blob_root: {}", config.blob_root.display());
        Self::with_collaborators(
            config,
            timeline.clone(),
            timeline,
            blob_store,
            data_fetcher,
        )
    }

    pub fn with_collaborators(
        config: &SourceConfig,
        timeline: Arc<dyn Timeline>,
        scanner: Arc<dyn MetadataScanner>,
        blob_store: Arc<dyn BlobStore>,
        data_fetcher: Arc<dyn ObjectDataFetcher>,
    ) -> Self {
        match config.missing_checkpoint_strategy {
            Some(strategy) => info!("missing_checkpoint_strategy: {strategy}"),
            None => info!("missing_checkpoint_strategy: unset"),
        }
        info!("num_instants_per_fetch: {}", config.num_instants_per_fetch);
        info!("check_if_file_exists: {}", config.check_if_file_exists);
        Self {
            num_instants_per_fetch: config.num_instants_per_fetch,
            missing_checkpoint_strategy: config.missing_checkpoint_strategy,
            check_if_file_exists: config.check_if_file_exists,
            timeline,
            scanner,
            metadata_fetcher: ObjectMetadataFetcher::new(config.cloud.clone(), blob_store),
            data_fetcher,
        }
    }

    /// Resolve the range the next fetch would cover, without fetching.
    pub async fn query_info(
        &self,
        last_checkpoint: Option<&str>,
    ) -> Result<QueryInfo, IncrSourceError> {
        let timeline = self.timeline.completed_instants().await?;
        let query = resolve_query_info(
            &timeline,
            last_checkpoint,
            self.num_instants_per_fetch,
            self.missing_checkpoint_strategy,
        )?;
        debug!(
            query_type = %query.query_type,
            previous_instant = %query.previous_instant,
            start_instant = %query.start_instant,
            end_instant = %query.end_instant,
            "resolved query info"
        );
        Ok(query)
    }

    /// Fetch the next batch after `last_checkpoint`.
    ///
    /// The returned checkpoint stays at the start instant when there was
    /// nothing new to read, and moves to the end instant whenever the range
    /// was examined, even if it produced no rows. Any error leaves the
    /// caller's checkpoint as it was.
    pub async fn fetch_next_batch(
        &self,
        last_checkpoint: Option<&str>,
        source_limit: u64,
    ) -> Result<FetchResult, IncrSourceError> {
        let query = self.query_info(last_checkpoint).await?;

        if query.are_start_and_end_instants_equal() {
            info!(
                "Already caught up. Begin checkpoint was: {}",
                query.start_instant
            );
            return Ok(FetchResult::caught_up(query.start_instant));
        }

        let mut metadata = self.scanner.scan(&query).await?;
        if metadata.is_empty().await? {
            info!(
                "Source of file names is empty. Returning empty result and end instant: {}",
                query.end_instant
            );
            return Ok(FetchResult::empty_range(query.end_instant));
        }

        let rows = metadata.collect().await?;
        let objects = self
            .metadata_fetcher
            .object_metadata(rows, self.check_if_file_exists)
            .await?;
        let payload = self.data_fetcher.fetch(&objects, source_limit).await?;
        let result = FetchResult::fetched(payload, query.end_instant, objects.len());
        info!(
            outcome = ?result.outcome,
            "fetched ({}, {}]",
            query.start_instant,
            result.next_checkpoint
        );
        Ok(result)
    }
}
