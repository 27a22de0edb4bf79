use serde::Deserialize;
use serde::Serialize;

/// A blob referenced by the timeline, as produced by the metadata phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CloudObjectMetadata {
    /// `<bucket>/<name>`, relative to the blob store root.
    pub path: String,
    pub size: u64,
}

impl CloudObjectMetadata {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}
