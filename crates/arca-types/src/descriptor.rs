use serde::{Deserialize, Serialize};

use crate::kind::ElementKind;

/// Describes the storage layout of one dataset slot: element kind, per-slot
/// shape, and compression level (0 = none).
///
/// The shape covers a single slot only. For extensible (list) datasets the
/// leading dimension is open-ended and tracked by the container, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Element kind of every value in the slot.
    pub kind: ElementKind,
    /// Extent per dimension. Empty for a scalar.
    pub shape: Vec<u64>,
    /// zstd compression level applied to stored slots; 0 disables.
    pub compression: u32,
}

impl TypeDescriptor {
    /// Create a descriptor with no compression.
    pub fn new(kind: ElementKind, shape: Vec<u64>) -> Self {
        Self {
            kind,
            shape,
            compression: 0,
        }
    }

    /// Create a scalar (rank-0) descriptor.
    pub fn scalar(kind: ElementKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Set the compression level, builder-style.
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = level;
        self
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Extent of dimension `i`, if present.
    pub fn extent(&self, i: usize) -> Option<u64> {
        self.shape.get(i).copied()
    }

    /// Number of elements in one slot (1 for a scalar).
    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Raw byte size of one slot.
    pub fn slot_bytes(&self) -> u64 {
        self.element_count() * self.kind.width() as u64
    }

    /// Two descriptors are compatible for read/write iff the element kind
    /// and the full per-slot shape match exactly. Compression is a storage
    /// detail and does not participate.
    pub fn is_compatible(&self, other: &TypeDescriptor) -> bool {
        self.kind == other.kind && self.shape == other.shape
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.shape.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            let dims: Vec<String> = self.shape.iter().map(|d| d.to_string()).collect();
            write!(f, "{}[{}]", self.kind, dims.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_descriptor() {
        let d = TypeDescriptor::scalar(ElementKind::Float64);
        assert_eq!(d.rank(), 0);
        assert_eq!(d.element_count(), 1);
        assert_eq!(d.slot_bytes(), 8);
        assert_eq!(format!("{d}"), "float64");
    }

    #[test]
    fn vector_descriptor() {
        let d = TypeDescriptor::new(ElementKind::Int32, vec![5]);
        assert_eq!(d.rank(), 1);
        assert_eq!(d.extent(0), Some(5));
        assert_eq!(d.extent(1), None);
        assert_eq!(d.element_count(), 5);
        assert_eq!(d.slot_bytes(), 20);
        assert_eq!(format!("{d}"), "int32[5]");
    }

    #[test]
    fn matrix_display() {
        let d = TypeDescriptor::new(ElementKind::Float32, vec![2, 3]);
        assert_eq!(format!("{d}"), "float32[2,3]");
        assert_eq!(d.slot_bytes(), 24);
    }

    #[test]
    fn compatibility_ignores_compression() {
        let a = TypeDescriptor::new(ElementKind::Float64, vec![3]);
        let b = TypeDescriptor::new(ElementKind::Float64, vec![3]).with_compression(5);
        assert!(a.is_compatible(&b));
    }

    #[test]
    fn compatibility_requires_exact_shape() {
        let a = TypeDescriptor::new(ElementKind::Float64, vec![3]);
        assert!(!a.is_compatible(&TypeDescriptor::new(ElementKind::Float64, vec![4])));
        assert!(!a.is_compatible(&TypeDescriptor::new(ElementKind::Float32, vec![3])));
        assert!(!a.is_compatible(&TypeDescriptor::new(ElementKind::Float64, vec![3, 1])));
    }
}
