use crate::BlobStore;
use crate::FetchError;
use cloud_incr_config::CloudSourceOptions;
use cloud_incr_protocol::CloudObjectMetadata;
use cloud_incr_protocol::Record;
use futures::StreamExt;
use futures::TryStreamExt;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use tracing::warn;

/// Turns scanned metadata rows into the objects whose content to fetch.
pub struct ObjectMetadataFetcher {
    options: CloudSourceOptions,
    blob_store: Arc<dyn BlobStore>,
}

impl ObjectMetadataFetcher {
    pub fn new(options: CloudSourceOptions, blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            options,
            blob_store,
        }
    }

    /// Distinct objects selected by the path filters, in row order. With
    /// `check_if_file_exists`, objects the blob store no longer holds are
    /// dropped instead of failing the later read.
    pub async fn object_metadata(
        &self,
        rows: Vec<Record>,
        check_if_file_exists: bool,
    ) -> Result<Vec<CloudObjectMetadata>, FetchError> {
        let total = rows.len();
        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let bucket = string_field(row, "bucket", index)?;
            let name = string_field(row, "name", index)?;
            if !self.is_selected(name) {
                continue;
            }
            let path = format!("{bucket}/{name}");
            if seen.insert(path.clone()) {
                selected.push(CloudObjectMetadata::new(path, size_field(row)));
            }
        }
        debug!(
            "selected {} of {total} metadata rows after path filters",
            selected.len()
        );

        if !check_if_file_exists {
            return Ok(selected);
        }

        let existing: Vec<Option<CloudObjectMetadata>> = futures::stream::iter(selected)
            .map(|object| self.keep_if_exists(object))
            .buffered(self.options.fetch_parallelism.max(1))
            .try_collect()
            .await?;
        Ok(existing.into_iter().flatten().collect())
    }

    async fn keep_if_exists(
        &self,
        object: CloudObjectMetadata,
    ) -> Result<Option<CloudObjectMetadata>, FetchError> {
        if self.blob_store.exists(&object.path).await? {
            Ok(Some(object))
        } else {
            warn!("skipping {}: object no longer exists", object.path);
            Ok(None)
        }
    }

    fn is_selected(&self, name: &str) -> bool {
        let options = &self.options;
        if let Some(prefix) = options.select_relpath_prefix.as_deref()
            && !name.starts_with(prefix)
        {
            return false;
        }
        if let Some(prefix) = options.ignore_relpath_prefix.as_deref()
            && name.starts_with(prefix)
        {
            return false;
        }
        if let Some(substring) = options.ignore_relpath_substring.as_deref()
            && name.contains(substring)
        {
            return false;
        }
        name.ends_with(options.select_file_extension.as_str())
    }
}

fn string_field<'a>(row: &'a Record, field: &str, index: usize) -> Result<&'a str, FetchError> {
    row.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| FetchError::InvalidMetadata {
            index,
            message: format!("missing string field `{field}`"),
        })
}

/// Sizes arrive as numbers or, from CSV commits, as strings.
fn size_field(row: &Record) -> u64 {
    match row.get("size") {
        Some(Value::Number(number)) => number.as_u64().unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
