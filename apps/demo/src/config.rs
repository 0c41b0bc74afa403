use config::{Config, Environment, File};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Errors raised while assembling the demo settings.
#[tmsg_derive::tmsg_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Load { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid setting{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Logging section of [`DemoConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level: `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Extra filter directives, e.g. `tinymessages=trace`.
    pub filter: Option<String>,
    /// Writes rolling log files here when set.
    pub directory: Option<PathBuf>,
    /// JSON lines in the file output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, directory: None, json: false }
    }
}

/// Settings shared by both demo binaries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of loop iterations.
    pub ticks: u32,
    /// Pause between iterations.
    pub tick_interval_ms: u64,
    /// Chance that something dies on a tick, `0.0..=1.0`.
    pub drop_chance: f64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub log: LogConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks: 30,
            tick_interval_ms: 1_000,
            drop_chance: 0.3,
            seed: None,
            log: LogConfig::default(),
        }
    }
}

impl DemoConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Checks ranges the loop relies on.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when `drop_chance` is outside `0.0..=1.0`.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&self.drop_chance) {
            return Err(ConfigError::Invalid {
                message: format!("drop_chance must be within 0..=1, got {}", self.drop_chance)
                    .into(),
                context: Some("drop_chance".into()),
            });
        }
        Ok(self)
    }
}

/// Loads [`DemoConfig`] from an optional file plus `TMSG__` environment overrides.
///
/// Layers, lowest priority first:
/// 1. built-in defaults,
/// 2. the file at `path` (required when given),
/// 3. environment variables such as `TMSG__TICKS=5` or `TMSG__LOG__LEVEL=debug`.
///
/// # Errors
/// Returns [`ConfigError::Load`] when the file is missing or malformed, and
/// [`ConfigError::Invalid`] when a value is out of range.
pub fn load_config(path: Option<&Path>) -> Result<DemoConfig, ConfigError> {
    load(path, None)
}

/// Same as [`load_config`], reading overrides from `vars` instead of the
/// process environment.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_from<I>(path: Option<&Path>, vars: I) -> Result<DemoConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    load(path, Some(vars.into_iter().collect()))
}

fn load(
    path: Option<&Path>,
    vars: Option<config::Map<String, String>>,
) -> Result<DemoConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        info!("Loading config from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix("TMSG")
            .separator("__")
            .try_parsing(true)
            .source(vars),
    );

    builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<DemoConfig>()
        .context("Failed to deserialize config")?
        .validate()
}
