use crate::CompletedTimeline;
use crate::MetadataRows;
use crate::MetadataScanner;
use crate::ScanError;
use crate::Timeline;
use crate::TimelineError;
use async_trait::async_trait;
use cloud_incr_protocol::FileFormat;
use cloud_incr_protocol::Instant;
use cloud_incr_protocol::QueryInfo;
use cloud_incr_protocol::Record;
use cloud_incr_protocol::parse_records;
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

pub const TIMELINE_SUBDIR: &str = ".timeline";
pub const ARCHIVED_SUBDIR: &str = "archived";
pub const COMMIT_SUFFIX: &str = ".commit";

/// Timeline kept as files under `<src_path>/.timeline/`.
///
/// Every completed instant is a `<instant>.commit` file holding the metadata
/// rows (`bucket`, `name`, `size`) of the objects it changed. Any other file
/// (in-flight commits included) is ignored. Instants moved to
/// `.timeline/archived/` leave the active timeline and are only read by
/// snapshot scans.
#[derive(Debug, Clone)]
pub struct LocalTimeline {
    src_path: PathBuf,
    format: FileFormat,
}

impl LocalTimeline {
    pub fn new(src_path: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            src_path: src_path.into(),
            format,
        }
    }

    pub fn timeline_dir(&self) -> PathBuf {
        self.src_path.join(TIMELINE_SUBDIR)
    }

    pub fn archived_dir(&self) -> PathBuf {
        self.timeline_dir().join(ARCHIVED_SUBDIR)
    }
}

#[async_trait]
impl Timeline for LocalTimeline {
    async fn completed_instants(&self) -> Result<CompletedTimeline, TimelineError> {
        let dir = self.timeline_dir();
        match tokio::fs::try_exists(&dir).await {
            Ok(true) => {}
            Ok(false) => return Err(TimelineError::Missing { path: dir }),
            Err(source) => return Err(TimelineError::Io { path: dir, source }),
        }
        let commits = list_commits(&dir)
            .await
            .map_err(|source| TimelineError::Io { path: dir, source })?;
        Ok(CompletedTimeline::new(commits.into_keys().collect()))
    }
}

#[async_trait]
impl MetadataScanner for LocalTimeline {
    async fn scan(&self, query: &QueryInfo) -> Result<Box<dyn MetadataRows>, ScanError> {
        let mut commits = BTreeMap::new();
        if query.is_snapshot() {
            let archived = self.archived_dir();
            let has_archive =
                tokio::fs::try_exists(&archived)
                    .await
                    .map_err(|source| ScanError::Io {
                        path: archived.clone(),
                        source,
                    })?;
            if has_archive {
                commits.extend(
                    list_commits(&archived)
                        .await
                        .map_err(|source| ScanError::Io {
                            path: archived.clone(),
                            source,
                        })?,
                );
            }
        }
        let active = self.timeline_dir();
        commits.extend(list_commits(&active).await.map_err(|source| ScanError::Io {
            path: active.clone(),
            source,
        })?);

        let pending: VecDeque<PathBuf> = commits
            .into_iter()
            .filter(|(instant, _)| query.contains(instant))
            .map(|(_, path)| path)
            .collect();
        debug!(
            query_type = %query.query_type,
            commits = pending.len(),
            "scanning metadata commits in ({}, {}]",
            query.start_instant,
            query.end_instant
        );
        Ok(Box::new(LocalCommitRows {
            format: self.format,
            pending,
            loaded: Vec::new(),
        }))
    }
}

/// Commits still to read plus the rows read so far, so an emptiness check
/// never reads a commit twice.
struct LocalCommitRows {
    format: FileFormat,
    pending: VecDeque<PathBuf>,
    loaded: Vec<Record>,
}

impl LocalCommitRows {
    async fn load_next(&mut self) -> Result<bool, ScanError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(false);
        };
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| ScanError::Io {
                path: path.clone(),
                source,
            })?;
        let rows = parse_records(self.format, &bytes)
            .map_err(|source| ScanError::Parse { path, source })?;
        self.loaded.extend(rows);
        Ok(true)
    }
}

#[async_trait]
impl MetadataRows for LocalCommitRows {
    async fn is_empty(&mut self) -> Result<bool, ScanError> {
        while self.loaded.is_empty() {
            if !self.load_next().await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn collect(self: Box<Self>) -> Result<Vec<Record>, ScanError> {
        let mut rows = *self;
        while rows.load_next().await? {}
        Ok(rows.loaded)
    }
}

/// Completed commits in `dir`, keyed by instant.
async fn list_commits(dir: &Path) -> std::io::Result<BTreeMap<Instant, PathBuf>> {
    let mut commits = BTreeMap::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(instant) = file_name
            .to_str()
            .and_then(|name| name.strip_suffix(COMMIT_SUFFIX))
            .filter(|instant| !instant.is_empty())
        else {
            continue;
        };
        commits.insert(Instant::from(instant), entry.path());
    }
    Ok(commits)
}
