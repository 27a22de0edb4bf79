use clap::Parser;
use std::path::PathBuf;

/// Incrementally pull rows from the objects a timeline records as changed.
#[derive(Parser, Debug)]
#[command(name = "cloud-incr", version)]
pub struct Cli {
    /// Source configuration file (TOML).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override a configuration value, e.g. `-c num_instants_per_fetch=10`.
    /// The value is parsed as TOML, falling back to a plain string.
    #[arg(short = 'c', value_name = "key=value", action = clap::ArgAction::Append)]
    pub config_overrides: Vec<String>,

    /// Directory holding the checkpoint database. Defaults to `~/.cloud-incr`.
    #[arg(long = "state-dir", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Name the checkpoint is stored under.
    #[arg(long = "source-id", default_value = "default")]
    pub source_id: String,

    /// Advisory upper bound on bytes read per batch.
    #[arg(long = "source-limit", default_value_t = i64::MAX as u64)]
    pub source_limit: u64,

    /// Keep fetching until interrupted instead of running one batch.
    #[arg(long = "continuous", default_value_t = false)]
    pub continuous: bool,

    /// Minimum time between the starts of two batches in continuous mode.
    #[arg(long = "min-sync-interval-seconds", default_value_t = 0)]
    pub min_sync_interval_seconds: u64,

    /// Write each batch to `<DIR>/batch-<checkpoint>.jsonl` instead of stdout.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
