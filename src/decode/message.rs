//! Decoded message values: [`Field`], [`Message`], and the
//! [`MessageDecoder`] that owns the reused decode buffer for one
//! connection.
use std::sync::Arc;

use bytes::Bytes;

use crate::decode::array::ArrayValue;
use crate::decode::builder;
use crate::error::{BagError, Result};
use crate::schema::Schema;
use crate::timestamp::Timestamp;

/// One decoded field value.
#[derive(Debug, Clone)]
pub enum Field {
    /// `bool`.
    Bool(bool),
    /// `int8`/`byte`.
    I8(i8),
    /// `uint8`/`char`.
    U8(u8),
    /// `int16`.
    I16(i16),
    /// `uint16`.
    U16(u16),
    /// `int32`.
    I32(i32),
    /// `uint32`.
    U32(u32),
    /// `int64`.
    I64(i64),
    /// `uint64`.
    U64(u64),
    /// `float32`.
    F32(f32),
    /// `float64`.
    F64(f64),
    /// `string`.
    Str(String),
    /// `time`.
    Time(Timestamp),
    /// Seconds, possibly negative.
    Duration(f64),
    /// A nested message-typed field.
    Nested(Message),
    /// A fixed- or variable-length array field.
    Array(ArrayValue),
}

/// A decoded message: an ordered, named set of fields matching its
/// [`Schema`], including constant fields pre-populated from their
/// declared default.
#[derive(Debug, Clone)]
pub struct Message {
    pub(crate) schema: Arc<Schema>,
    pub(crate) fields: Vec<(String, Field)>,
}

impl Message {
    /// `package/Name` of this message's type.
    pub fn type_name(&self) -> &str {
        &self.schema.type_name
    }

    /// The field named `name`, or `UnknownField` if the schema has none
    /// by that name.
    pub fn get(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
            .ok_or_else(|| BagError::UnknownField(name.to_string()))
    }

    /// Iterates the message's fields in schema declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }
}

/// Decodes payloads for a single connection's schema, reusing its output
/// buffer across calls. Never shared between connections or threads: a
/// fresh [`MessageDecoder`] is built per connection so decoding one
/// connection's messages can never disturb another's in-flight state.
pub(crate) struct MessageDecoder {
    schema: Arc<Schema>,
    scratch: Option<Message>,
}

impl MessageDecoder {
    pub(crate) fn new(schema: Arc<Schema>) -> Self {
        Self { schema, scratch: None }
    }

    /// Drops the previous decode result so the next [`Self::decode`] call
    /// starts clean.
    pub(crate) fn reset(&mut self) {
        self.scratch = None;
    }

    /// Decodes `data` against this decoder's schema, overwriting any
    /// previous result, and returns a reference to it.
    pub(crate) fn decode(&mut self, data: Bytes) -> Result<&Message> {
        let message = builder::decode_message(&self.schema, data)?;
        self.scratch = Some(message);
        Ok(self.scratch.as_ref().expect("just assigned"))
    }

    /// The last successfully decoded message, if any.
    pub(crate) fn current(&self) -> Option<&Message> {
        self.scratch.as_ref()
    }
}
