//! Resolved schema types: the output of [`crate::schema::SchemaRegistry`],
//! consumed by [`crate::decode::DecoderBuilder`].
use std::sync::Arc;

/// The closed set of primitive wire types a field line can name.
///
/// `Byte` and `Char` are the deprecated aliases for `int8`/`uint8`; they
/// decode identically to their non-deprecated counterparts but are kept as
/// distinct variants because the md5 canonicalization substitutes their
/// *names*, not their wire shape (see [`crate::schema::md5_normalize`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int8,
    UInt8,
    Byte,
    Char,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    Time,
    Duration,
}

impl PrimitiveKind {
    /// Recognizes a type token, or returns `None` if it names a message
    /// type instead.
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "bool" => PrimitiveKind::Bool,
            "int8" => PrimitiveKind::Int8,
            "uint8" => PrimitiveKind::UInt8,
            "byte" => PrimitiveKind::Byte,
            "char" => PrimitiveKind::Char,
            "int16" => PrimitiveKind::Int16,
            "uint16" => PrimitiveKind::UInt16,
            "int32" => PrimitiveKind::Int32,
            "uint32" => PrimitiveKind::UInt32,
            "int64" => PrimitiveKind::Int64,
            "uint64" => PrimitiveKind::UInt64,
            "float32" => PrimitiveKind::Float32,
            "float64" => PrimitiveKind::Float64,
            "string" => PrimitiveKind::String,
            "time" => PrimitiveKind::Time,
            "duration" => PrimitiveKind::Duration,
            _ => return None,
        })
    }

    /// Fixed wire width in bytes, or `None` for the variable-length
    /// `string` type.
    pub(crate) fn fixed_width(self) -> Option<usize> {
        use PrimitiveKind::*;
        Some(match self {
            Bool | Int8 | UInt8 | Byte | Char => 1,
            Int16 | UInt16 => 2,
            Int32 | UInt32 | Float32 => 4,
            Int64 | UInt64 | Float64 | Time | Duration => 8,
            String => return None,
        })
    }

    /// The token substituted into the md5 canonicalization text: `byte`
    /// and `char` normalize to their non-deprecated aliases, everything
    /// else is unchanged.
    pub(crate) fn md5_token(self) -> &'static str {
        use PrimitiveKind::*;
        match self {
            Bool => "bool",
            Int8 | Byte => "int8",
            UInt8 | Char => "uint8",
            Int16 => "int16",
            UInt16 => "uint16",
            Int32 => "int32",
            UInt32 => "uint32",
            Int64 => "int64",
            UInt64 => "uint64",
            Float32 => "float32",
            Float64 => "float64",
            String => "string",
            Time => "time",
            Duration => "duration",
        }
    }
}

/// A field's type, after nested message references have been resolved.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A fixed-width or string primitive.
    Primitive(PrimitiveKind),
    /// A nested message, resolved to its own schema tree.
    Nested(Arc<Schema>),
}

/// Whether a field is a scalar or an array, and the array's length rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLen {
    /// Not an array.
    Scalar,
    /// `T[N]`: exactly `N` elements, no length prefix on the wire.
    Fixed(u32),
    /// `T[]`: an `i32` element count precedes the elements.
    Variable,
}

/// A constant's parsed value, typed to the field's declared primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
}

/// One field line of a message definition, fully resolved.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) type_spec: TypeSpec,
    pub(crate) array: ArrayLen,
    /// `Some` for constant (`= value`) lines, which occupy no wire space.
    pub(crate) constant: Option<ConstantValue>,
}

/// A fully-resolved message schema: field order, types, and the
/// canonical md5 sum computed over the normalized definition text.
#[derive(Debug, Clone)]
pub struct Schema {
    /// `package/Name`, as declared by the connection or a dependency block.
    pub type_name: String,
    /// Fields in declaration order, constants interleaved with wire fields.
    pub fields: Vec<FieldSpec>,
    /// Canonical md5sum, lowercase hex.
    pub md5sum: String,
}

impl Schema {
    /// Fields that occupy wire space, in decode order.
    pub(crate) fn wire_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.constant.is_none())
    }
}
