use crate::BlobStore;
use crate::FetchError;
use async_trait::async_trait;
use cloud_incr_protocol::CloudObjectMetadata;
use cloud_incr_protocol::FileFormat;
use cloud_incr_protocol::Record;
use cloud_incr_protocol::Relation;
use cloud_incr_protocol::parse_records;
use futures::StreamExt;
use futures::TryStreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Reads the content of selected objects into one relation.
#[async_trait]
pub trait ObjectDataFetcher: Send + Sync {
    /// `None` when no rows were produced, including when `objects` is empty.
    /// `source_limit` is advisory.
    async fn fetch(
        &self,
        objects: &[CloudObjectMetadata],
        source_limit: u64,
    ) -> Result<Option<Relation>, FetchError>;
}

/// Fetches objects from a [`BlobStore`] concurrently and parses them with a
/// single format.
pub struct BlobObjectDataFetcher {
    blob_store: Arc<dyn BlobStore>,
    format: FileFormat,
    partition_fields: Vec<String>,
    parallelism: usize,
}

impl BlobObjectDataFetcher {
    pub fn new(blob_store: Arc<dyn BlobStore>, format: FileFormat) -> Self {
        Self {
            blob_store,
            format,
            partition_fields: Vec::new(),
            parallelism: 1,
        }
    }

    /// Columns to lift out of `<field>=<value>` path segments.
    pub fn with_partition_fields(mut self, fields: Vec<String>) -> Self {
        self.partition_fields = fields;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    async fn fetch_one(
        &self,
        index: usize,
        object: CloudObjectMetadata,
    ) -> Result<(usize, Vec<Record>), FetchError> {
        let bytes = self.blob_store.read(&object.path).await?;
        let mut rows = parse_records(self.format, &bytes).map_err(|source| FetchError::Parse {
            path: object.path.clone(),
            source,
        })?;
        if !self.partition_fields.is_empty() {
            let partition_values = partition_values(&object.path, &self.partition_fields)?;
            for row in &mut rows {
                for (field, value) in &partition_values {
                    row.insert(field.clone(), Value::String(value.clone()));
                }
            }
        }
        Ok((index, rows))
    }
}

#[async_trait]
impl ObjectDataFetcher for BlobObjectDataFetcher {
    async fn fetch(
        &self,
        objects: &[CloudObjectMetadata],
        source_limit: u64,
    ) -> Result<Option<Relation>, FetchError> {
        if objects.is_empty() {
            return Ok(None);
        }
        // Sizes come from metadata rows and may be arbitrary.
        let total_bytes = objects
            .iter()
            .map(|object| object.size)
            .fold(0u64, u64::saturating_add);
        debug!(
            source_limit,
            total_bytes,
            "fetching {} objects as {}",
            objects.len(),
            self.format
        );

        let mut fetched: Vec<(usize, Vec<Record>)> =
            futures::stream::iter(objects.to_vec().into_iter().enumerate())
                .map(|(index, object)| self.fetch_one(index, object))
                .buffer_unordered(self.parallelism)
                .try_collect()
                .await?;
        // Reads complete in any order; merge in object order.
        fetched.sort_by_key(|(index, _)| *index);

        let relation: Relation = fetched.into_iter().flat_map(|(_, rows)| rows).collect();
        if relation.is_empty() {
            Ok(None)
        } else {
            Ok(Some(relation))
        }
    }
}

/// Values of `fields` taken from `<field>=<value>` segments of `path`.
fn partition_values(path: &str, fields: &[String]) -> Result<Vec<(String, String)>, FetchError> {
    fields
        .iter()
        .map(|field| {
            let prefix = format!("{field}=");
            path.split('/')
                .find_map(|segment| segment.strip_prefix(prefix.as_str()))
                .map(|value| (field.clone(), value.to_string()))
                .ok_or_else(|| FetchError::MissingPartitionField {
                    path: path.to_string(),
                    field: field.clone(),
                })
        })
        .collect()
}
