use crate::descriptor::TypeDescriptor;
use crate::error::TypeError;
use crate::kind::ElementKind;

mod sealed {
    pub trait Sealed {}
}

/// A Rust scalar type storable as a dataset element.
///
/// The set is closed: the fixed-width integers, `f32`/`f64`, and `bool`.
/// Elements are encoded little-endian regardless of host order.
pub trait Element: Copy + PartialEq + std::fmt::Debug + sealed::Sealed {
    /// The element kind this type maps to.
    const KIND: ElementKind;
    /// Encoded width in bytes.
    const WIDTH: usize;

    fn write_le(&self, out: &mut Vec<u8>);
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($ty:ty, $kind:expr, $width:expr) => {
        impl sealed::Sealed for $ty {}
        impl Element for $ty {
            const KIND: ElementKind = $kind;
            const WIDTH: usize = $width;

            fn write_le(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                <$ty>::from_le_bytes(bytes[..$width].try_into().unwrap())
            }
        }
    };
}

impl_element!(i8, ElementKind::Int8, 1);
impl_element!(i16, ElementKind::Int16, 2);
impl_element!(i32, ElementKind::Int32, 4);
impl_element!(i64, ElementKind::Int64, 8);
impl_element!(u8, ElementKind::Uint8, 1);
impl_element!(u16, ElementKind::Uint16, 2);
impl_element!(u32, ElementKind::Uint32, 4);
impl_element!(u64, ElementKind::Uint64, 8);
impl_element!(f32, ElementKind::Float32, 4);
impl_element!(f64, ElementKind::Float64, 8);

impl sealed::Sealed for bool {}
impl Element for bool {
    const KIND: ElementKind = ElementKind::Bool;
    const WIDTH: usize = 1;

    fn write_le(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// A typed, shaped byte buffer: the unit handed across the read/write seam.
///
/// `data` holds little-endian element bytes; `shape` describes one slot
/// (empty for a scalar). The container validates a buffer's kind and shape
/// against the target dataset's descriptor before any I/O.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayBuffer {
    pub kind: ElementKind,
    pub shape: Vec<u64>,
    pub data: Vec<u8>,
}

impl ArrayBuffer {
    /// Build a buffer from a typed slice with an explicit shape.
    ///
    /// The shape's element count must equal the slice length.
    pub fn from_slice<T: Element>(values: &[T], shape: Vec<u64>) -> Result<Self, TypeError> {
        let count: u64 = shape.iter().product();
        if count != values.len() as u64 {
            return Err(TypeError::ShapeMismatch {
                shape,
                len: values.len(),
            });
        }
        let mut data = Vec::with_capacity(values.len() * T::WIDTH);
        for v in values {
            v.write_le(&mut data);
        }
        Ok(Self {
            kind: T::KIND,
            shape,
            data,
        })
    }

    /// Build a rank-1 buffer from a typed slice.
    pub fn from_vec<T: Element>(values: &[T]) -> Self {
        let mut data = Vec::with_capacity(values.len() * T::WIDTH);
        for v in values {
            v.write_le(&mut data);
        }
        Self {
            kind: T::KIND,
            shape: vec![values.len() as u64],
            data,
        }
    }

    /// Build a rank-0 (scalar) buffer.
    pub fn scalar<T: Element>(value: T) -> Self {
        let mut data = Vec::with_capacity(T::WIDTH);
        value.write_le(&mut data);
        Self {
            kind: T::KIND,
            shape: Vec::new(),
            data,
        }
    }

    /// Build a string buffer (UTF-8 bytes, shape = byte length).
    pub fn from_str(value: &str) -> Self {
        Self {
            kind: ElementKind::Str,
            shape: vec![value.len() as u64],
            data: value.as_bytes().to_vec(),
        }
    }

    /// Number of elements covered by the shape.
    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }

    /// The descriptor this buffer writes under, at the given compression.
    pub fn descriptor(&self, compression: u32) -> TypeDescriptor {
        TypeDescriptor {
            kind: self.kind,
            shape: self.shape.clone(),
            compression,
        }
    }

    /// Decode the buffer into a typed vector.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, TypeError> {
        if self.kind != T::KIND {
            return Err(TypeError::KindMismatch {
                expected: T::KIND,
                actual: self.kind,
            });
        }
        let expected = self.element_count() as usize;
        if self.data.len() != expected * T::WIDTH {
            return Err(TypeError::LengthMismatch {
                expected,
                actual: self.data.len() / T::WIDTH,
            });
        }
        Ok(self
            .data
            .chunks_exact(T::WIDTH)
            .map(T::read_le)
            .collect())
    }

    /// Decode a rank-0 buffer into a single value.
    pub fn to_scalar<T: Element>(&self) -> Result<T, TypeError> {
        let values = self.to_vec::<T>()?;
        if values.len() != 1 {
            return Err(TypeError::LengthMismatch {
                expected: 1,
                actual: values.len(),
            });
        }
        Ok(values[0])
    }

    /// Decode a string buffer.
    pub fn to_string_value(&self) -> Result<String, TypeError> {
        if self.kind != ElementKind::Str {
            return Err(TypeError::KindMismatch {
                expected: ElementKind::Str,
                actual: self.kind,
            });
        }
        String::from_utf8(self.data.clone()).map_err(|e| TypeError::Utf8(e.to_string()))
    }

    /// Reassemble a buffer from descriptor + raw slot bytes (container read
    /// path). The byte length must match the descriptor exactly.
    pub fn from_raw(dtype: &TypeDescriptor, data: Vec<u8>) -> Result<Self, TypeError> {
        let expected = dtype.slot_bytes() as usize;
        if data.len() != expected {
            return Err(TypeError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            kind: dtype.kind,
            shape: dtype.shape.clone(),
            data,
        })
    }
}
