//! Physical storage layer for arca.
//!
//! One container file holds a tree of named groups and datasets. This crate
//! owns everything below the facade: the on-disk format, the in-memory node
//! tree, and the access-mode rules of the file handle.
//!
//! # Architecture
//!
//! - [`format`] — encode/decode of the container file (magic + version +
//!   bincode manifest + CRC-checked, optionally zstd-compressed slot data +
//!   blake3 trailer)
//! - [`Group`] / [`Dataset`] — the in-memory node tree with typed slot I/O
//! - [`Container`] — one open file: access mode, path-addressed operations,
//!   flush-per-mutation persistence, and full [`Container::rescan`]
//!
//! # Design Rules
//!
//! 1. A container is opened under exactly one [`AccessMode`] for its
//!    lifetime; read-only handles reject every mutation.
//! 2. Every successful mutation leaves the file durable (atomic temp-file
//!    replace), so `rescan` always observes the last successful state.
//! 3. Typed I/O is validated against the dataset's descriptor before any
//!    bytes move; a failed operation changes nothing.
//! 4. All I/O and corruption errors are propagated, never silently ignored.

pub mod error;
pub mod format;
pub mod mode;
pub mod node;
pub mod root;

pub use error::{ContainerError, ContainerResult};
pub use mode::AccessMode;
pub use node::{Dataset, Descriptor, Group};
pub use root::Container;
