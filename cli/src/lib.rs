// Batches reach stdout only through `BatchSink`; logs go to stderr via tracing.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod output;
mod sync;

pub use cli::Cli;
pub use output::BatchSink;
pub use sync::SyncRunner;

use anyhow::Context;
use cloud_incr_config::load_source_config;
use cloud_incr_config::parse_override;
use cloud_incr_core::CloudObjectsIncrSource;
use cloud_incr_state::StateRuntime;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_LOG_LEVEL: &str = "info";
const STATE_DIR_NAME: &str = ".cloud-incr";

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        config_overrides,
        state_dir,
        source_id,
        source_limit,
        continuous,
        min_sync_interval_seconds,
        output_dir,
    } = cli;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();

    let overrides = config_overrides
        .iter()
        .map(|raw| parse_override(raw.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let config = load_source_config(config.as_deref(), &overrides, None).await?;
    // Nothing here writes keyed records; the options are only reported.
    info!("key generator options: {:?}", config.key_generator);

    let state_dir = match state_dir {
        Some(state_dir) => state_dir,
        None => default_state_dir()?,
    };
    let state = StateRuntime::init(state_dir).await?;
    info!("state db: {}", state.state_dir().display());

    let runner = SyncRunner::new(
        CloudObjectsIncrSource::from_config(&config),
        state,
        source_id,
        source_limit,
        BatchSink::new(output_dir),
    );
    if continuous {
        runner
            .run_continuous(Duration::from_secs(min_sync_interval_seconds))
            .await
    } else {
        runner.run_once().await.map(|_| ())
    }
}

fn default_state_dir() -> anyhow::Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR_NAME))
        .context("could not determine home directory; pass --state-dir")
}
