use thiserror::Error;

use arca_types::TypeError;

/// Errors from container operations, covering access-mode validation, path
/// resolution, typed slot I/O, and the on-disk format.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Unrecognized access mode value at open time.
    #[error("invalid access mode: {0}")]
    InvalidAccessMode(String),

    /// A path did not resolve to any existing entry.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A traversed or terminal segment exists but is not a group.
    #[error("not a group: {0}")]
    NotAGroup(String),

    /// The path resolves to something other than a dataset.
    #[error("not a dataset: {0}")]
    NotADataset(String),

    /// The target name is already taken.
    #[error("entry already exists: {0}")]
    AlreadyExists(String),

    /// Requested element kind/shape disagree with the stored descriptor.
    #[error("type mismatch: dataset stores {stored}, request was {requested}")]
    TypeMismatch { stored: String, requested: String },

    /// Slot index outside `[0, len)`.
    #[error("slot index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Append attempted on a dataset created as a single fixed array.
    #[error("dataset is not expandable: {0}")]
    NotExpandable(String),

    /// Mutation attempted on a read-only container.
    #[error("container is read-only")]
    ReadOnly,

    /// The file does not start with the container magic.
    #[error("invalid container magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    /// The container was written by an unknown format version.
    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u32),

    /// The whole-file checksum does not match the stored trailer.
    #[error("container checksum mismatch")]
    ChecksumMismatch,

    /// A stored slot failed its CRC32 check.
    #[error("CRC32 mismatch in dataset {path}")]
    CrcMismatch { path: String },

    /// The container data is structurally malformed.
    #[error("corrupt container: {reason}")]
    Corrupt { reason: String },

    /// Manifest serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// Element/buffer level error from `arca-types`.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
