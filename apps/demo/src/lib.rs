//! # tmsg-demo
//!
//! A small tick loop showing both tinymessages delivery models. Every tick the
//! loop runs one distribution pass and, with a configurable chance, something
//! dies: loot worth points or debris worth nothing. `Score` adds up the points
//! and announces each increase; `BigBrother` reports every death and every
//! increase.
//!
//! * `broker-demo` registers both subscribers as handlers on a [`tinymessages::Broker`].
//! * `relay-demo` gives each subscriber a mailbox on a [`tinymessages::Relay`] and
//!   polls it after every pass.

pub mod cli;
pub mod config;
pub mod game;
pub mod logging;
pub mod subscribers;
pub mod world;

pub use cli::Cli;
pub use config::{ConfigError, DemoConfig, LogConfig, load_config, load_config_from};
pub use game::{DemoError, Spawner, Summary, run_broker, run_relay};
pub use logging::init_logging;
