use serde::{Deserialize, Serialize};

/// The closed set of element kinds a dataset can store.
///
/// Complex kinds are stored as interleaved real/imaginary pairs of the
/// matching float width. `Str` is the one variable-width kind: a string slot
/// stores raw UTF-8 bytes and the shape records the byte length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Bool,
    Str,
}

impl ElementKind {
    /// Bytes per element. For `Str` the unit of storage is one byte.
    pub fn width(&self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Bool | Self::Str => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 | Self::Complex64 => 8,
            Self::Complex128 => 16,
        }
    }

    /// All kinds, in declaration order.
    pub fn all() -> &'static [ElementKind] {
        &[
            Self::Int8,
            Self::Int16,
            Self::Int32,
            Self::Int64,
            Self::Uint8,
            Self::Uint16,
            Self::Uint32,
            Self::Uint64,
            Self::Float32,
            Self::Float64,
            Self::Complex64,
            Self::Complex128,
            Self::Bool,
            Self::Str,
        ]
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Bool => "bool",
            Self::Str => "string",
        };
        write!(f, "{name}")
    }
}
