use crate::ScanError;
use async_trait::async_trait;
use cloud_incr_protocol::QueryInfo;
use cloud_incr_protocol::Record;

/// Finds the metadata rows of objects changed in a range.
#[async_trait]
pub trait MetadataScanner: Send + Sync {
    /// Rows for `(query.start_instant, query.end_instant]`. Only called with
    /// `start_instant < end_instant`. The returned rows may be lazy.
    async fn scan(&self, query: &QueryInfo) -> Result<Box<dyn MetadataRows>, ScanError>;
}

/// Possibly lazy result of a metadata scan.
#[async_trait]
pub trait MetadataRows: Send {
    /// Whether the scan produced no rows. Implementations should stop
    /// reading as soon as one row is found.
    async fn is_empty(&mut self) -> Result<bool, ScanError>;

    /// Materialize every row, in timeline order.
    async fn collect(self: Box<Self>) -> Result<Vec<Record>, ScanError>;
}

/// Rows that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataRows {
    rows: Vec<Record>,
}

impl InMemoryMetadataRows {
    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl MetadataRows for InMemoryMetadataRows {
    async fn is_empty(&mut self) -> Result<bool, ScanError> {
        Ok(self.rows.is_empty())
    }

    async fn collect(self: Box<Self>) -> Result<Vec<Record>, ScanError> {
        Ok(self.rows)
    }
}
