//! Raw byte buffers, views over them, and fixed-width numeric buffers.

use std::fmt;
use std::mem::size_of;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::category::Category;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("range {offset}..{offset}+{length} is outside a buffer of {capacity} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        capacity: usize,
    },
}

/// A fixed-size, zero-initialised block of bytes.
#[derive(Clone)]
pub struct RawBuffer(Arc<RwLock<Vec<u8>>>);

heap_handle!(RawBuffer);

impl RawBuffer {
    pub fn zeroed(len: usize) -> Self {
        Self::from_bytes(vec![0; len])
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Arc::new(RwLock::new(bytes)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.read().clone()
    }

    pub fn read(&self, offset: usize, out: &mut [u8]) -> Result<(), BufferError> {
        let bytes = self.0.read();
        let range = checked_range(offset, out.len(), bytes.len())?;
        out.copy_from_slice(&bytes[range]);
        Ok(())
    }

    pub fn write(&self, offset: usize, data: &[u8]) -> Result<(), BufferError> {
        let mut bytes = self.0.write();
        let range = checked_range(offset, data.len(), bytes.len())?;
        bytes[range].copy_from_slice(data);
        Ok(())
    }
}

fn checked_range(
    offset: usize,
    length: usize,
    capacity: usize,
) -> Result<std::ops::Range<usize>, BufferError> {
    match offset.checked_add(length) {
        Some(end) if end <= capacity => Ok(offset..end),
        _ => Err(BufferError::OutOfBounds {
            offset,
            length,
            capacity,
        }),
    }
}

impl fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer").field("len", &self.len()).finish()
    }
}

/// A window onto a [`RawBuffer`]. Views alias the buffer's bytes.
#[derive(Clone)]
pub struct BufferView(Arc<ViewInner>);

struct ViewInner {
    buffer: RawBuffer,
    byte_offset: usize,
    byte_length: usize,
}

heap_handle!(BufferView);

macro_rules! view_accessors {
    ($($get:ident $set:ident $ty:ty;)*) => {
        $(
            pub fn $get(&self, offset: usize, little_endian: bool) -> Result<$ty, BufferError> {
                let mut bytes = [0u8; size_of::<$ty>()];
                self.read(offset, &mut bytes)?;
                Ok(if little_endian {
                    <$ty>::from_le_bytes(bytes)
                } else {
                    <$ty>::from_be_bytes(bytes)
                })
            }

            pub fn $set(&self, offset: usize, value: $ty, little_endian: bool) -> Result<(), BufferError> {
                let bytes = if little_endian {
                    value.to_le_bytes()
                } else {
                    value.to_be_bytes()
                };
                self.write(offset, &bytes)
            }
        )*
    };
}

impl BufferView {
    /// View `byte_length` bytes (default: the rest of the buffer) starting at
    /// `byte_offset`.
    pub fn new(
        buffer: RawBuffer,
        byte_offset: usize,
        byte_length: Option<usize>,
    ) -> Result<Self, BufferError> {
        let capacity = buffer.len();
        let byte_length = match byte_length {
            Some(length) => length,
            None => capacity.checked_sub(byte_offset).ok_or(BufferError::OutOfBounds {
                offset: byte_offset,
                length: 0,
                capacity,
            })?,
        };
        checked_range(byte_offset, byte_length, capacity)?;
        Ok(Self(Arc::new(ViewInner {
            buffer,
            byte_offset,
            byte_length,
        })))
    }

    /// A second view over the same bytes and window.
    pub(crate) fn realias(&self) -> BufferView {
        Self(Arc::new(ViewInner {
            buffer: self.0.buffer.clone(),
            byte_offset: self.0.byte_offset,
            byte_length: self.0.byte_length,
        }))
    }

    pub fn buffer(&self) -> &RawBuffer {
        &self.0.buffer
    }

    pub fn byte_offset(&self) -> usize {
        self.0.byte_offset
    }

    pub fn byte_length(&self) -> usize {
        self.0.byte_length
    }

    fn read(&self, offset: usize, out: &mut [u8]) -> Result<(), BufferError> {
        checked_range(offset, out.len(), self.0.byte_length)?;
        self.0.buffer.read(self.0.byte_offset + offset, out)
    }

    fn write(&self, offset: usize, data: &[u8]) -> Result<(), BufferError> {
        checked_range(offset, data.len(), self.0.byte_length)?;
        self.0.buffer.write(self.0.byte_offset + offset, data)
    }

    pub fn get_u8(&self, offset: usize) -> Result<u8, BufferError> {
        let mut byte = [0u8; 1];
        self.read(offset, &mut byte)?;
        Ok(byte[0])
    }

    pub fn set_u8(&self, offset: usize, value: u8) -> Result<(), BufferError> {
        self.write(offset, &[value])
    }

    pub fn get_i8(&self, offset: usize) -> Result<i8, BufferError> {
        self.get_u8(offset).map(|byte| byte as i8)
    }

    pub fn set_i8(&self, offset: usize, value: i8) -> Result<(), BufferError> {
        self.set_u8(offset, value as u8)
    }

    view_accessors! {
        get_i16 set_i16 i16;
        get_u16 set_u16 u16;
        get_i32 set_i32 i32;
        get_u32 set_u32 u32;
        get_f32 set_f32 f32;
        get_f64 set_f64 f64;
    }
}

impl fmt::Debug for BufferView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferView")
            .field("byte_offset", &self.0.byte_offset)
            .field("byte_length", &self.0.byte_length)
            .finish()
    }
}

/// Element type of a [`NumericBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl BufferKind {
    pub const ALL: [BufferKind; 9] = [
        BufferKind::Int8,
        BufferKind::Uint8,
        BufferKind::Uint8Clamped,
        BufferKind::Int16,
        BufferKind::Uint16,
        BufferKind::Int32,
        BufferKind::Uint32,
        BufferKind::Float32,
        BufferKind::Float64,
    ];

    pub fn category(self) -> Category {
        match self {
            BufferKind::Int8 => Category::Int8Buffer,
            BufferKind::Uint8 => Category::Uint8Buffer,
            BufferKind::Uint8Clamped => Category::Uint8ClampedBuffer,
            BufferKind::Int16 => Category::Int16Buffer,
            BufferKind::Uint16 => Category::Uint16Buffer,
            BufferKind::Int32 => Category::Int32Buffer,
            BufferKind::Uint32 => Category::Uint32Buffer,
            BufferKind::Float32 => Category::Float32Buffer,
            BufferKind::Float64 => Category::Float64Buffer,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BufferKind::Int8 => "int8",
            BufferKind::Uint8 => "uint8",
            BufferKind::Uint8Clamped => "uint8-clamped",
            BufferKind::Int16 => "int16",
            BufferKind::Uint16 => "uint16",
            BufferKind::Int32 => "int32",
            BufferKind::Uint32 => "uint32",
            BufferKind::Float32 => "float32",
            BufferKind::Float64 => "float64",
        }
    }

    pub fn from_name(name: &str) -> Option<BufferKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn element_size(self) -> usize {
        match self {
            BufferKind::Int8 | BufferKind::Uint8 | BufferKind::Uint8Clamped => 1,
            BufferKind::Int16 | BufferKind::Uint16 => 2,
            BufferKind::Int32 | BufferKind::Uint32 | BufferKind::Float32 => 4,
            BufferKind::Float64 => 8,
        }
    }
}

enum NumericData {
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Uint8Clamped(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Truncate and wrap into `bits` bits; non-finite input maps to zero.
fn modular(x: f64, bits: i32) -> u64 {
    if !x.is_finite() {
        return 0;
    }
    x.trunc().rem_euclid(2f64.powi(bits)) as u64
}

fn clamp_u8(x: f64) -> u8 {
    if x.is_nan() {
        0
    } else {
        x.clamp(0.0, 255.0).round_ties_even() as u8
    }
}

impl NumericData {
    fn zeroed(kind: BufferKind, len: usize) -> Self {
        match kind {
            BufferKind::Int8 => NumericData::Int8(vec![0; len]),
            BufferKind::Uint8 => NumericData::Uint8(vec![0; len]),
            BufferKind::Uint8Clamped => NumericData::Uint8Clamped(vec![0; len]),
            BufferKind::Int16 => NumericData::Int16(vec![0; len]),
            BufferKind::Uint16 => NumericData::Uint16(vec![0; len]),
            BufferKind::Int32 => NumericData::Int32(vec![0; len]),
            BufferKind::Uint32 => NumericData::Uint32(vec![0; len]),
            BufferKind::Float32 => NumericData::Float32(vec![0.0; len]),
            BufferKind::Float64 => NumericData::Float64(vec![0.0; len]),
        }
    }

    fn kind(&self) -> BufferKind {
        match self {
            NumericData::Int8(_) => BufferKind::Int8,
            NumericData::Uint8(_) => BufferKind::Uint8,
            NumericData::Uint8Clamped(_) => BufferKind::Uint8Clamped,
            NumericData::Int16(_) => BufferKind::Int16,
            NumericData::Uint16(_) => BufferKind::Uint16,
            NumericData::Int32(_) => BufferKind::Int32,
            NumericData::Uint32(_) => BufferKind::Uint32,
            NumericData::Float32(_) => BufferKind::Float32,
            NumericData::Float64(_) => BufferKind::Float64,
        }
    }

    fn len(&self) -> usize {
        match self {
            NumericData::Int8(v) => v.len(),
            NumericData::Uint8(v) | NumericData::Uint8Clamped(v) => v.len(),
            NumericData::Int16(v) => v.len(),
            NumericData::Uint16(v) => v.len(),
            NumericData::Int32(v) => v.len(),
            NumericData::Uint32(v) => v.len(),
            NumericData::Float32(v) => v.len(),
            NumericData::Float64(v) => v.len(),
        }
    }

    fn get(&self, index: usize) -> Option<f64> {
        match self {
            NumericData::Int8(v) => v.get(index).map(|&x| x.into()),
            NumericData::Uint8(v) | NumericData::Uint8Clamped(v) => v.get(index).map(|&x| x.into()),
            NumericData::Int16(v) => v.get(index).map(|&x| x.into()),
            NumericData::Uint16(v) => v.get(index).map(|&x| x.into()),
            NumericData::Int32(v) => v.get(index).map(|&x| x.into()),
            NumericData::Uint32(v) => v.get(index).map(|&x| x.into()),
            NumericData::Float32(v) => v.get(index).map(|&x| x.into()),
            NumericData::Float64(v) => v.get(index).copied(),
        }
    }

    fn set(&mut self, index: usize, x: f64) -> bool {
        if index >= self.len() {
            return false;
        }
        match self {
            NumericData::Int8(v) => v[index] = modular(x, 8) as u8 as i8,
            NumericData::Uint8(v) => v[index] = modular(x, 8) as u8,
            NumericData::Uint8Clamped(v) => v[index] = clamp_u8(x),
            NumericData::Int16(v) => v[index] = modular(x, 16) as u16 as i16,
            NumericData::Uint16(v) => v[index] = modular(x, 16) as u16,
            NumericData::Int32(v) => v[index] = modular(x, 32) as u32 as i32,
            NumericData::Uint32(v) => v[index] = modular(x, 32) as u32,
            NumericData::Float32(v) => v[index] = x as f32,
            NumericData::Float64(v) => v[index] = x,
        }
        true
    }
}

/// A fixed-length buffer of numbers stored at one of nine element widths.
#[derive(Clone)]
pub struct NumericBuffer(Arc<RwLock<NumericData>>);

heap_handle!(NumericBuffer);

impl NumericBuffer {
    pub fn new(kind: BufferKind, len: usize) -> Self {
        Self(Arc::new(RwLock::new(NumericData::zeroed(kind, len))))
    }

    /// Build a buffer and store every number with the kind's conversion.
    pub fn from_numbers(kind: BufferKind, numbers: &[f64]) -> Self {
        let buffer = Self::new(kind, numbers.len());
        {
            let mut data = buffer.0.write();
            for (index, &number) in numbers.iter().enumerate() {
                data.set(index, number);
            }
        }
        buffer
    }

    pub fn kind(&self) -> BufferKind {
        self.0.read().kind()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.read().get(index)
    }

    /// Store `x` converted to the element type. Out-of-range writes are
    /// ignored and return `false`.
    pub fn set(&self, index: usize, x: f64) -> bool {
        self.0.write().set(index, x)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        let data = self.0.read();
        (0..data.len()).filter_map(|index| data.get(index)).collect()
    }
}

impl fmt::Debug for NumericBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericBuffer")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .finish()
    }
}
