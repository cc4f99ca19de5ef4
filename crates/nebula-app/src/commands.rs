//! Subcommands of the blueprint tool.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use nebula_blueprint::{
    Axis, BlockId, Blueprint, BlueprintError, Flavor, Rotation, SchematicRegistry,
};
use nebula_config::{CliArgs, Compression, Config};

/// Inspect and transform blueprint files.
#[derive(Parser, Debug)]
#[command(name = "nebula-blueprint", about = "Blueprint file tool", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: CliArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print size, offset, block histogram, and entity count.
    Inspect { file: PathBuf },
    /// Rotate by quarter turns about an axis.
    Rotate {
        file: PathBuf,
        #[arg(long, value_enum)]
        axis: AxisArg,
        /// Clockwise quarter turns; negative turns counter-clockwise.
        #[arg(long, allow_hyphen_values = true)]
        turns: i32,
        /// Output file; defaults to overwriting the input.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Mirror along an axis.
    Mirror {
        file: PathBuf,
        #[arg(long, value_enum)]
        axis: AxisArg,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-encode with the configured compression.
    Convert {
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Axis {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}: {source}", path.display())]
    Blueprint {
        path: PathBuf,
        #[source]
        source: BlueprintError,
    },
    #[error("{}: unreadable as {compression} NBT: {source}", path.display())]
    UnreadableInput {
        path: PathBuf,
        compression: Compression,
        #[source]
        source: BlueprintError,
    },
}

/// What `inspect` reports about a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub blueprint: Blueprint,
    pub flavor: &'static str,
    pub histogram: BTreeMap<BlockId, usize>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.blueprint.size();
        let offset = self.blueprint.offset();
        writeln!(f, "encoding: {}", self.flavor)?;
        writeln!(f, "size:     {} x {} x {}", size.x, size.y, size.z)?;
        writeln!(f, "offset:   {} {} {}", offset.x, offset.y, offset.z)?;
        writeln!(f, "entities: {}", self.blueprint.entities().len())?;
        writeln!(f, "blocks:")?;
        for (block, count) in &self.histogram {
            writeln!(f, "  {count:>8}  {block}")?;
        }
        Ok(())
    }
}

/// Runs one subcommand and returns the text to print.
pub fn run(command: &Command, config: &Config) -> Result<String, AppError> {
    let registry = registry_for(config);
    match command {
        Command::Inspect { file } => Ok(inspect(file, &registry)?.to_string()),
        Command::Rotate {
            file,
            axis,
            turns,
            output,
        } => {
            let rotation = Rotation::from_quarter_turns(*turns);
            let (mut blueprint, _) = read_any(file, &registry)?;
            blueprint.rotate((*axis).into(), rotation);
            let out = output.as_deref().unwrap_or(file);
            write(&blueprint, out, config)?;
            Ok(format!(
                "rotated {:?} about {}, size now {}\n",
                rotation,
                Axis::from(*axis).name(),
                blueprint.size()
            ))
        }
        Command::Mirror { file, axis, output } => {
            let (mut blueprint, _) = read_any(file, &registry)?;
            blueprint.mirror((*axis).into());
            let out = output.as_deref().unwrap_or(file);
            write(&blueprint, out, config)?;
            Ok(format!("mirrored along {}\n", Axis::from(*axis).name()))
        }
        Command::Convert { file, output } => {
            let (blueprint, from) = read_any(file, &registry)?;
            write(&blueprint, output, config)?;
            Ok(format!(
                "converted {} -> {}\n",
                from,
                config.blueprint.compression
            ))
        }
    }
}

/// The registry the tool decodes with. Any block id decodes as a plain block
/// state unless the registry is strict.
pub fn registry_for(config: &Config) -> SchematicRegistry {
    if config.blueprint.strict_registry {
        SchematicRegistry::new()
    } else {
        SchematicRegistry::permissive()
    }
}

pub fn flavor_for(compression: Compression) -> Flavor {
    match compression {
        Compression::None => Flavor::Uncompressed,
        Compression::Gzip => Flavor::GzCompressed,
        Compression::Zlib => Flavor::ZlibCompressed,
    }
}

pub fn inspect(path: &Path, registry: &SchematicRegistry) -> Result<Summary, AppError> {
    let (blueprint, flavor) = read_any(path, registry)?;
    let mut histogram = BTreeMap::new();
    for (_, cell) in blueprint.iter() {
        if let Some(schematic) = cell {
            *histogram.entry(schematic.block_type()).or_insert(0) += 1;
        }
    }
    Ok(Summary {
        blueprint,
        flavor: flavor.name(),
        histogram,
    })
}

/// Reads a blueprint file whose encoding is recognised from its leading
/// bytes: gzip, zlib, or else uncompressed.
///
/// Failures to unpack the NBT container are reported as
/// [`AppError::UnreadableInput`] with the underlying error; a container that
/// unpacks but does not hold a valid blueprint is [`AppError::Blueprint`].
pub fn read_any(
    path: &Path,
    registry: &SchematicRegistry,
) -> Result<(Blueprint, Compression), AppError> {
    let bytes = std::fs::read(path).map_err(|e| AppError::Blueprint {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let compression = detect_compression(&bytes);
    let mut reader = Cursor::new(bytes.as_slice());
    match Blueprint::read_from(&mut reader, registry, flavor_for(compression)) {
        Ok(blueprint) => {
            tracing::debug!("read {} as {}", path.display(), compression);
            Ok((blueprint, compression))
        }
        Err(source @ BlueprintError::Io(_)) => Err(AppError::UnreadableInput {
            path: path.to_path_buf(),
            compression,
            source,
        }),
        Err(source) => Err(AppError::Blueprint {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Recognises gzip (`1f 8b`) and zlib (`78 xx` with a valid header check)
/// streams. Anything else is treated as uncompressed NBT.
pub fn detect_compression(bytes: &[u8]) -> Compression {
    match bytes {
        [0x1f, 0x8b, ..] => Compression::Gzip,
        [0x78, flags, ..] if (0x7800 | u16::from(*flags)) % 31 == 0 => Compression::Zlib,
        _ => Compression::None,
    }
}

fn write(blueprint: &Blueprint, path: &Path, config: &Config) -> Result<(), AppError> {
    blueprint
        .save(path, flavor_for(config.blueprint.compression))
        .map_err(|source| AppError::Blueprint {
            path: path.to_path_buf(),
            source,
        })
}
