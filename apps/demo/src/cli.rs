//! Command line overrides shared by both demo binaries.

use crate::config::{ConfigError, DemoConfig, load_config};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drops loot into a tick loop and watches subscribers react")]
pub struct Cli {
    /// TOML file with settings; `TMSG__*` variables override it
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long)]
    pub ticks: Option<u32>,

    /// Milliseconds between ticks
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Chance of a drop per tick, 0.0 to 1.0
    #[arg(long, value_name = "P")]
    pub drop_chance: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write rolling log files to this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Raise verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Loads the layered settings and applies the flags on top.
    ///
    /// # Errors
    /// See [`load_config`] and [`Cli::apply`].
    pub fn load(&self) -> Result<DemoConfig, ConfigError> {
        self.apply(load_config(self.config.as_deref())?)
    }

    /// Command line flags win over file and environment values.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the merged settings are out of range.
    pub fn apply(&self, mut cfg: DemoConfig) -> Result<DemoConfig, ConfigError> {
        if let Some(ticks) = self.ticks {
            cfg.ticks = ticks;
        }
        if let Some(ms) = self.interval_ms {
            cfg.tick_interval_ms = ms;
        }
        if let Some(chance) = self.drop_chance {
            cfg.drop_chance = chance;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(dir) = &self.log_dir {
            cfg.log.directory = Some(dir.clone());
        }
        match self.verbose {
            0 => {},
            1 => cfg.log.level = "debug".to_owned(),
            _ => cfg.log.level = "trace".to_owned(),
        }
        cfg.validate()
    }
}
