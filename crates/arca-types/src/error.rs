use thiserror::Error;

use crate::kind::ElementKind;

/// Errors produced by type and buffer operations.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    /// The buffer's element kind disagrees with the requested one.
    #[error("element kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: ElementKind,
        actual: ElementKind,
    },

    /// The buffer holds a different number of elements than requested.
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The declared shape does not cover the supplied data.
    #[error("shape {shape:?} does not match {len} elements")]
    ShapeMismatch { shape: Vec<u64>, len: usize },

    /// An entry name is not usable inside a group.
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A string slot does not hold valid UTF-8.
    #[error("invalid UTF-8 in string data: {0}")]
    Utf8(String),
}
