use cloud_incr_config::CloudSourceOptionsToml;
use cloud_incr_config::SourceConfig;
use cloud_incr_config::SourceConfigToml;
use cloud_incr_core::ARCHIVED_SUBDIR;
use cloud_incr_core::COMMIT_SUFFIX;
use cloud_incr_core::CloudObjectsIncrSource;
use cloud_incr_core::IncrSourceError;
use cloud_incr_core::ScanError;
use cloud_incr_core::TIMELINE_SUBDIR;
use cloud_incr_core::TimelineError;
use cloud_incr_protocol::FetchOutcome;
use cloud_incr_protocol::FileFormat;
use cloud_incr_protocol::MissingCheckpointStrategy;
use cloud_incr_protocol::Relation;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

/// A source directory holding a `.timeline/` and the objects it references
/// under the bucket `b`.
struct SourceDir {
    dir: TempDir,
}

impl SourceDir {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    async fn commit(&self, instant: &str, names: &[&str]) {
        self.commit_in(&self.path().join(TIMELINE_SUBDIR), instant, names)
            .await;
    }

    async fn archive(&self, instant: &str, names: &[&str]) {
        self.commit_in(
            &self.path().join(TIMELINE_SUBDIR).join(ARCHIVED_SUBDIR),
            instant,
            names,
        )
        .await;
    }

    async fn commit_in(&self, dir: &Path, instant: &str, names: &[&str]) {
        tokio::fs::create_dir_all(dir).await.expect("mkdir timeline");
        let body: String = names
            .iter()
            .map(|name| format!("{}\n", json!({"bucket": "b", "name": name, "size": 10})))
            .collect();
        tokio::fs::write(dir.join(format!("{instant}{COMMIT_SUFFIX}")), body)
            .await
            .expect("write commit");
    }

    async fn object(&self, name: &str, body: &str) {
        let path = self.path().join("b").join(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.expect("mkdir object");
        }
        tokio::fs::write(path, body).await.expect("write object");
    }

    async fn delete_object(&self, name: &str) {
        tokio::fs::remove_file(self.path().join("b").join(name))
            .await
            .expect("remove object");
    }

    fn config(&self, raw: SourceConfigToml) -> SourceConfig {
        let raw = SourceConfigToml {
            src_path: Some(self.path().to_path_buf()),
            ..raw
        };
        SourceConfig::resolve(raw, self.path()).expect("resolve config")
    }
}

fn column(relation: &Relation, name: &str) -> Vec<Value> {
    relation
        .rows()
        .iter()
        .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
        .collect()
}

#[tokio::test]
async fn walks_a_local_timeline_to_the_end() {
    let src = SourceDir::new();
    src.object("a.json", "{\"id\":1}\n{\"id\":2}\n").await;
    src.object("b.json", "{\"id\":3}\n").await;
    src.commit("20240101000000", &["a.json"]).await;
    src.commit("20240102000000", &[]).await;
    src.commit("20240103000000", &["b.json"]).await;

    let source = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml {
        num_instants_per_fetch: Some(2),
        missing_checkpoint_strategy: Some(MissingCheckpointStrategy::FromEarliestRetained),
        ..Default::default()
    }));

    let first = source.fetch_next_batch(None, u64::MAX).await.expect("first");
    assert_eq!(first.next_checkpoint.as_str(), "20240102000000");
    assert_eq!(
        column(first.payload.as_ref().expect("rows"), "id"),
        vec![json!(1), json!(2)]
    );

    let second = source
        .fetch_next_batch(Some(first.next_checkpoint.as_str()), u64::MAX)
        .await
        .expect("second");
    assert_eq!(second.next_checkpoint.as_str(), "20240103000000");
    assert_eq!(
        column(second.payload.as_ref().expect("rows"), "id"),
        vec![json!(3)]
    );

    let third = source
        .fetch_next_batch(Some(second.next_checkpoint.as_str()), u64::MAX)
        .await
        .expect("third");
    assert_eq!(third.outcome, FetchOutcome::CaughtUp);
    assert_eq!(third.next_checkpoint, second.next_checkpoint);
}

#[tokio::test]
async fn commits_without_objects_advance_past_the_range() {
    let src = SourceDir::new();
    src.commit("4", &[]).await;
    src.commit("5", &[]).await;

    let source = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml::default()));
    let result = source
        .fetch_next_batch(Some("4"), u64::MAX)
        .await
        .expect("fetch");

    assert_eq!(result.outcome, FetchOutcome::EmptyRange);
    assert_eq!(result.into_parts(), (None, "5".to_string()));
}

#[tokio::test]
async fn deleted_objects_are_skipped_when_checked() {
    let src = SourceDir::new();
    src.object("x.json", "{\"id\":1}\n").await;
    src.object("y.json", "{\"id\":2}\n").await;
    src.commit("5", &[]).await;
    src.commit("6", &["x.json"]).await;
    src.commit("7", &["y.json"]).await;
    src.delete_object("x.json").await;
    src.delete_object("y.json").await;

    let checked = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml {
        check_if_file_exists: Some(true),
        ..Default::default()
    }));
    let result = checked
        .fetch_next_batch(Some("5"), u64::MAX)
        .await
        .expect("fetch");
    assert_eq!(result.clone().into_parts(), (None, "7".to_string()));
    assert_eq!(
        result.outcome,
        FetchOutcome::Fetched {
            objects: 0,
            rows: 0
        }
    );

    let unchecked = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml::default()));
    let err = unchecked
        .fetch_next_batch(Some("5"), u64::MAX)
        .await
        .expect_err("read of a deleted object");
    assert!(matches!(err, IncrSourceError::Fetch(_)));
}

#[tokio::test]
async fn path_filters_and_partition_columns_apply() {
    let src = SourceDir::new();
    src.object("events/dt=2024-01-01/part-0.json", "{\"id\":1}\n")
        .await;
    src.object("events/dt=2024-01-02/part-0.json", "{\"id\":2}\n")
        .await;
    src.object("events/_tmp/dt=2024-01-02/part-1.json", "{\"id\":99}\n")
        .await;
    src.object("audit/dt=2024-01-02/part-0.json", "{\"id\":98}\n")
        .await;
    src.commit("1", &[]).await;
    src.commit(
        "2",
        &[
            "events/dt=2024-01-01/part-0.json",
            "events/_tmp/dt=2024-01-02/part-1.json",
            "audit/dt=2024-01-02/part-0.json",
            "events/dt=2024-01-02/part-0.json",
        ],
    )
    .await;

    let source = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml {
        cloud: CloudSourceOptionsToml {
            select_relpath_prefix: Some("events/".to_string()),
            ignore_relpath_substring: Some("/_tmp/".to_string()),
            partition_fields_from_path: Some(vec!["dt".to_string()]),
            ..Default::default()
        },
        ..Default::default()
    }));
    let result = source
        .fetch_next_batch(Some("1"), u64::MAX)
        .await
        .expect("fetch");

    let payload = result.payload.expect("rows");
    assert_eq!(column(&payload, "id"), vec![json!(1), json!(2)]);
    assert_eq!(
        column(&payload, "dt"),
        vec![json!("2024-01-01"), json!("2024-01-02")]
    );
}

#[tokio::test]
async fn expired_checkpoint_reads_archived_commits() {
    let src = SourceDir::new();
    src.object("old.json", "{\"id\":1}\n").await;
    src.object("new.json", "{\"id\":2}\n").await;
    src.archive("2", &["old.json"]).await;
    src.commit("3", &["new.json"]).await;

    let source = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml {
        missing_checkpoint_strategy: Some(MissingCheckpointStrategy::FromEarliestRetained),
        ..Default::default()
    }));

    let query = source.query_info(Some("1")).await.expect("query");
    assert!(query.is_snapshot());

    let result = source
        .fetch_next_batch(Some("1"), u64::MAX)
        .await
        .expect("fetch");
    assert_eq!(result.next_checkpoint.as_str(), "3");
    assert_eq!(
        column(result.payload.as_ref().expect("rows"), "id"),
        vec![json!(1), json!(2)]
    );
}

#[tokio::test]
async fn csv_objects_are_read_with_headers() {
    let src = SourceDir::new();
    src.object("rows.csv", "id,name\n1,ada\n2,grace\n").await;
    src.commit("1", &[]).await;
    src.commit("2", &["rows.csv"]).await;

    let source = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml {
        data_file_format: Some(FileFormat::Csv),
        ..Default::default()
    }));
    let result = source
        .fetch_next_batch(Some("1"), u64::MAX)
        .await
        .expect("fetch");

    let payload = result.payload.expect("rows");
    assert_eq!(column(&payload, "name"), vec![json!("ada"), json!("grace")]);
    assert_eq!(column(&payload, "id"), vec![json!("1"), json!("2")]);
}

#[tokio::test]
async fn missing_timeline_is_a_range_resolution_error() {
    let src = SourceDir::new();
    let source = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml::default()));
    let err = source
        .fetch_next_batch(Some("1"), u64::MAX)
        .await
        .expect_err("no timeline");
    assert!(matches!(
        err,
        IncrSourceError::RangeResolution(TimelineError::Missing { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_archive_fails_the_snapshot_scan() {
    let src = SourceDir::new();
    src.object("new.json", "{\"id\":2}\n").await;
    src.commit("3", &["new.json"]).await;
    let archived = src.path().join(TIMELINE_SUBDIR).join(ARCHIVED_SUBDIR);
    std::os::unix::fs::symlink(&archived, &archived).expect("symlink loop");

    let source = CloudObjectsIncrSource::from_config(&src.config(SourceConfigToml::default()));
    let query = source.query_info(Some("1")).await.expect("query");
    assert!(query.is_snapshot());

    let err = source
        .fetch_next_batch(Some("1"), u64::MAX)
        .await
        .expect_err("archive cannot be listed");
    assert!(matches!(err, IncrSourceError::Scan(ScanError::Io { .. })));
}
