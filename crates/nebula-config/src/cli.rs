//! Command-line overrides shared by the blueprint tool's subcommands.

use std::path::PathBuf;

use clap::Args;

use crate::{Compression, Config};

/// Global command-line options.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct CliArgs {
    /// Compression for written files (none, gzip, zlib).
    #[arg(long, global = true)]
    pub compression: Option<Compression>,

    /// Reject block ids that have no registered schematic factory.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(compression) = args.compression {
            self.blueprint.compression = compression;
        }
        if args.strict {
            self.blueprint.strict_registry = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
