//! Typed array storage for decoded primitive-array fields, implementing
//! the widening rules of the array decode table: narrow unsigned types
//! are exposed through the next larger signed representation so callers
//! never have to reason about two's-complement reinterpretation
//! themselves.
use num_bigint::BigUint;

use crate::decode::message::Message;
use crate::schema::PrimitiveKind;
use crate::timestamp::Timestamp;

/// Storage for an array of `bool`/`int8`/`byte`/`char`/`uint8` elements —
/// the one-byte-wide primitives, which all share the same wire shape.
#[derive(Debug, Clone)]
pub struct OneByteArray {
    kind: PrimitiveKind,
    raw: Vec<u8>,
}

impl OneByteArray {
    pub(crate) fn new(kind: PrimitiveKind, raw: Vec<u8>) -> Self {
        Self { kind, raw }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The element kind this array was declared with.
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Signed 8-bit view, valid for every one-byte kind.
    pub fn as_i8(&self) -> Vec<i8> {
        self.raw.iter().map(|&b| b as i8).collect()
    }

    /// Widened unsigned view, only meaningful for `uint8`/`char` arrays.
    pub fn as_u8(&self) -> Option<Vec<u8>> {
        matches!(self.kind, PrimitiveKind::UInt8 | PrimitiveKind::Char).then(|| self.raw.clone())
    }

    /// Boolean view, only meaningful for `bool` arrays.
    pub fn as_bool(&self) -> Option<Vec<bool>> {
        matches!(self.kind, PrimitiveKind::Bool).then(|| self.raw.iter().map(|&b| b != 0).collect())
    }
}

/// A decoded array-valued field, widened per field kind.
#[derive(Debug, Clone)]
pub enum ArrayValue {
    /// `bool`/`int8`/`byte`/`char`/`uint8`.
    OneByte(OneByteArray),
    /// `int16`.
    I16(Vec<i16>),
    /// `uint16`, widened to the next larger signed type.
    U16Widened(Vec<i32>),
    /// `int32`.
    I32(Vec<i32>),
    /// `uint32`, widened to a 64-bit signed integer.
    U32Widened(Vec<i64>),
    /// `float32`.
    F32(Vec<f32>),
    /// `int64`.
    I64(Vec<i64>),
    /// `uint64`, widened to an arbitrary-precision integer.
    U64Widened(Vec<BigUint>),
    /// `float64`.
    F64(Vec<f64>),
    /// `time`.
    Time(Vec<Timestamp>),
    /// `duration`, surfaced as seconds.
    Duration(Vec<f64>),
    /// `string`.
    String(Vec<String>),
    /// An array of nested messages; not part of the widening table, since
    /// there is no byte-width reinterpretation to perform.
    Nested(Vec<Message>),
}
