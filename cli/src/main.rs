//! Entry-point for the `cloud-incr` binary.
use clap::Parser;
use cloud_incr_cli::Cli;
use cloud_incr_cli::run_main;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_main(Cli::parse()).await
}
