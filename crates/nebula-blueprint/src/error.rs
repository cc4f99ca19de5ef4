//! Error types for capture, persistence, and replay of blueprints.

use glam::IVec3;

/// A blueprint document or grid is structurally invalid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedInputError {
    /// Every dimension of a blueprint must be strictly positive.
    #[error("blueprint size must be positive on every axis, got {0}")]
    NonPositiveSize(IVec3),
    /// Rows of a nested grid have different lengths.
    #[error("grid is jagged: expected {expected} entries at {at}, found {found}")]
    JaggedGrid {
        /// Where the mismatch was found, e.g. `"x=1"` or `"x=0,y=2"`.
        at: String,
        /// Length of the first row on that level.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A required field is absent from a record.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// A field is present but has the wrong shape or value.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// The document was written by a newer format version.
    #[error("unsupported blueprint format version: {0}")]
    UnsupportedVersion(i32),
    /// The `blocks` list does not hold one record per grid cell.
    #[error("expected {expected} block records, found {actual}")]
    BlockCountMismatch {
        /// `size.x * size.y * size.z`.
        expected: usize,
        /// Length of the `blocks` list.
        actual: usize,
    },
    /// No decoder is registered for the record's block id.
    #[error("no schematic factory registered for block `{0}`")]
    UnknownBlock(String),
    /// A record of the `blocks` list could not be turned into a schematic.
    #[error("block record {index} is undecodable: {reason}")]
    UndecodableRecord {
        /// Position of the record in the `blocks` list.
        index: usize,
        /// Underlying decode failure.
        reason: String,
    },
}

/// The world could not serve a capture or replay request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldAccessError {
    /// The position lies in a region that is not loaded.
    #[error("world region at {0} is not loaded")]
    Unloaded(IVec3),
    /// The world refused the request.
    #[error("world rejected access at {pos}: {reason}")]
    Rejected {
        /// Requested position.
        pos: IVec3,
        /// Reason given by the world.
        reason: String,
    },
}

/// Top-level error for blueprint operations.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),
    #[error(transparent)]
    WorldAccess(#[from] WorldAccessError),
    /// A cell was never populated. Serializing such a blueprint is a bug in
    /// the code that built it.
    #[error("blueprint invariant violated: cell {pos} is uninitialized")]
    UninitializedCell {
        /// Local grid position of the hole.
        pos: IVec3,
    },
    /// Binary NBT encoding or decoding failed.
    #[error("NBT I/O failed: {0}")]
    Io(#[from] quartz_nbt::io::NbtIoError),
    /// Opening or creating a blueprint file failed.
    #[error("blueprint file error: {0}")]
    File(#[from] std::io::Error),
}
