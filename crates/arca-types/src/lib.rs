//! Foundation types for arca, a typed hierarchical array container.
//!
//! This crate provides the value types shared by every other arca crate:
//!
//! - [`ElementKind`] — the closed set of storable element kinds
//! - [`TypeDescriptor`] — element kind + per-slot shape + compression level
//! - [`ArrayBuffer`] — a typed, shaped byte buffer crossing the I/O seam
//! - [`Element`] — the sealed trait mapping Rust scalars to element kinds
//! - [`path`] — `/`-separated path normalization and name validation

pub mod buffer;
pub mod descriptor;
pub mod error;
pub mod kind;
pub mod path;

pub use buffer::{ArrayBuffer, Element};
pub use descriptor::TypeDescriptor;
pub use error::TypeError;
pub use kind::ElementKind;
pub use path::{normalize, split, validate_name};
