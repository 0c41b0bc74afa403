use anyhow::Context;
use clap::Parser;
use tmsg_demo::{Cli, init_logging, run_relay};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load().context("Critical: Configuration is malformed")?;
    let _log = init_logging(env!("CARGO_BIN_NAME"), &cfg.log)?;

    let summary = run_relay(&cfg)?;
    info!(%summary, "Relay demo finished");
    Ok(())
}
