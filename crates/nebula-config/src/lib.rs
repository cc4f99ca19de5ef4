//! Configuration for the blueprint tool.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{BlueprintConfig, Compression, Config, DebugConfig};
pub use error::ConfigError;
