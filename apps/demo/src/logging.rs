use crate::config::LogConfig;
use std::str::FromStr;
use tmsg_logger::{LevelFilter, Logger, LoggerError};

/// Installs the global subscriber described by `log`.
///
/// # Errors
/// Fails on an unknown level name or when [`Logger`] initialisation fails.
pub fn init_logging(name: &str, log: &LogConfig) -> Result<Logger, LoggerError> {
    let level = LevelFilter::from_str(&log.level).map_err(|_| {
        LoggerError::InvalidConfiguration {
            message: format!("unknown level `{}`", log.level).into(),
            context: Some("log.level".into()),
        }
    })?;

    let mut builder = Logger::builder().name(name).level(level);
    if let Some(filter) = &log.filter {
        builder = builder.env_filter(filter.clone());
    }

    match &log.directory {
        Some(directory) => builder.directory(directory).json(log.json).init(),
        None => builder.init(),
    }
}
