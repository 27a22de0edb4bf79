use cloud_incr_protocol::Relation;
use std::path::Path;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Where fetched batches are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSink {
    /// JSON lines on stdout.
    Stdout,
    /// One `batch-<checkpoint>.jsonl` file per batch.
    Directory(PathBuf),
}

impl BatchSink {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        output_dir.map_or(Self::Stdout, Self::Directory)
    }

    /// Write `relation` for the batch ending at `checkpoint`. Returns the
    /// file written, if any.
    pub async fn write(
        &self,
        relation: &Relation,
        checkpoint: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        let body = relation.to_jsonl()?;
        match self {
            BatchSink::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(body.as_bytes()).await?;
                stdout.flush().await?;
                Ok(None)
            }
            BatchSink::Directory(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let path = batch_path(dir, checkpoint);
                tokio::fs::write(&path, body).await?;
                Ok(Some(path))
            }
        }
    }
}

pub fn batch_path(dir: &Path, checkpoint: &str) -> PathBuf {
    dir.join(format!("batch-{checkpoint}.jsonl"))
}
