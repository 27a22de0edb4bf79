use crate::BatchRecord;
use crate::migrations::MIGRATOR;
use crate::model::datetime_to_epoch_seconds;
use log::LevelFilter;
use sqlx::ConnectOptions;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqliteJournalMode;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::sqlite::SqliteSynchronous;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing::warn;

mod checkpoints;

pub const STATE_DB_FILENAME: &str = "checkpoints";
pub const STATE_DB_VERSION: u32 = 1;

#[derive(Clone)]
pub struct StateRuntime {
    state_dir: PathBuf,
    pool: Arc<SqlitePool>,
}

impl StateRuntime {
    /// Open (and migrate) the checkpoint database under `state_dir`,
    /// creating the directory when needed.
    pub async fn init(state_dir: PathBuf) -> anyhow::Result<Arc<Self>> {
        tokio::fs::create_dir_all(&state_dir).await?;
        let state_path = state_db_path(state_dir.as_path());
        let pool = match open_sqlite(&state_path).await {
            Ok(db) => Arc::new(db),
            Err(err) => {
                warn!("failed to open state db at {}: {err}", state_path.display());
                return Err(err);
            }
        };
        debug!("opened state db at {}", state_path.display());
        Ok(Arc::new(Self { state_dir, pool }))
    }

    pub fn state_dir(&self) -> &Path {
        self.state_dir.as_path()
    }
}

async fn open_sqlite(path: &Path) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Off);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

pub fn state_db_filename() -> String {
    format!("{STATE_DB_FILENAME}_{STATE_DB_VERSION}.sqlite")
}

pub fn state_db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(state_db_filename())
}
