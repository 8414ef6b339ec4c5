//! Message schema parsing, forward-reference resolution, and the
//! canonical md5 computation.
pub(crate) mod field_spec;
pub(crate) mod md5_normalize;
pub(crate) mod parser;
mod registry;

pub use field_spec::{ArrayLen, ConstantValue, FieldSpec, PrimitiveKind, Schema, TypeSpec};
pub use registry::SchemaRegistry;
