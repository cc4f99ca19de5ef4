//! The `nebula-blueprint` command-line tool: inspect, rotate, mirror, and
//! re-encode blueprint files.

pub mod commands;
pub mod platform;

pub use commands::{AppError, Cli, Command, run};
