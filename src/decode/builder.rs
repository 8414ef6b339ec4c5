//! Builds a [`Message`] from a schema and a raw payload: the decode-tree
//! walk described as `DecoderBuilder`. Schemas are immutable and shared
//! (`Arc`), so there is no persistent mutable tree to construct — each
//! call walks the schema fresh against a [`Cursor`] over the payload,
//! which gives the same "resettable, structurally independent per
//! connection" behavior with a much simpler implementation.
use std::sync::Arc;

use bytes::Bytes;
use num_bigint::BigUint;

use crate::cursor::Cursor;
use crate::decode::array::{ArrayValue, OneByteArray};
use crate::decode::message::{Field, Message};
use crate::error::Result;
use crate::schema::field_spec::{ArrayLen, ConstantValue, PrimitiveKind, TypeSpec};
use crate::schema::Schema;

pub(crate) fn decode_message(schema: &Arc<Schema>, data: Bytes) -> Result<Message> {
    let mut cursor = Cursor::new(data);
    decode_message_cursor(schema, &mut cursor)
}

fn decode_message_cursor(schema: &Arc<Schema>, cursor: &mut Cursor) -> Result<Message> {
    let mut fields = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let value = if let Some(constant) = &field.constant {
            constant_to_field(constant)
        } else {
            match field.array {
                ArrayLen::Scalar => decode_scalar(&field.type_spec, cursor)?,
                ArrayLen::Fixed(n) => decode_array(&field.type_spec, n, cursor)?,
                ArrayLen::Variable => {
                    let n = cursor.next_u32()?;
                    decode_array(&field.type_spec, n, cursor)?
                }
            }
        };
        fields.push((field.name.clone(), value));
    }
    Ok(Message {
        schema: schema.clone(),
        fields,
    })
}

fn constant_to_field(value: &ConstantValue) -> Field {
    match value {
        ConstantValue::Bool(v) => Field::Bool(*v),
        ConstantValue::I8(v) => Field::I8(*v),
        ConstantValue::U8(v) => Field::U8(*v),
        ConstantValue::I16(v) => Field::I16(*v),
        ConstantValue::U16(v) => Field::U16(*v),
        ConstantValue::I32(v) => Field::I32(*v),
        ConstantValue::U32(v) => Field::U32(*v),
        ConstantValue::I64(v) => Field::I64(*v),
        ConstantValue::U64(v) => Field::U64(*v),
        ConstantValue::F32(v) => Field::F32(*v),
        ConstantValue::F64(v) => Field::F64(*v),
        ConstantValue::Str(v) => Field::Str(v.clone()),
    }
}

fn decode_scalar(type_spec: &TypeSpec, cursor: &mut Cursor) -> Result<Field> {
    Ok(match type_spec {
        TypeSpec::Nested(schema) => Field::Nested(decode_message_cursor(schema, cursor)?),
        TypeSpec::Primitive(kind) => match kind {
            PrimitiveKind::Bool => Field::Bool(cursor.next_u8()? != 0),
            PrimitiveKind::Int8 | PrimitiveKind::Byte => Field::I8(cursor.next_u8()? as i8),
            PrimitiveKind::UInt8 | PrimitiveKind::Char => Field::U8(cursor.next_u8()?),
            PrimitiveKind::Int16 => Field::I16(cursor.next_i16()?),
            PrimitiveKind::UInt16 => Field::U16(cursor.next_u16()?),
            PrimitiveKind::Int32 => Field::I32(cursor.next_i32()?),
            PrimitiveKind::UInt32 => Field::U32(cursor.next_u32()?),
            PrimitiveKind::Int64 => Field::I64(cursor.next_i64()?),
            PrimitiveKind::UInt64 => Field::U64(cursor.next_u64()?),
            PrimitiveKind::Float32 => Field::F32(cursor.next_f32()?),
            PrimitiveKind::Float64 => Field::F64(cursor.next_f64()?),
            PrimitiveKind::String => Field::Str(cursor.next_string()?),
            PrimitiveKind::Time => Field::Time(cursor.next_time()?),
            PrimitiveKind::Duration => Field::Duration(duration_secs(cursor)?),
        },
    })
}

fn duration_secs(cursor: &mut Cursor) -> Result<f64> {
    let sec = cursor.next_i32()?;
    let nsec = cursor.next_i32()?;
    Ok(sec as f64 + nsec as f64 * 1e-9)
}

fn decode_array(type_spec: &TypeSpec, n: u32, cursor: &mut Cursor) -> Result<Field> {
    let n = n as usize;
    let array = match type_spec {
        TypeSpec::Nested(schema) => {
            let mut items = Vec::with_capacity(n);
            for _ in 0..n {
                items.push(decode_message_cursor(schema, cursor)?);
            }
            ArrayValue::Nested(items)
        }
        TypeSpec::Primitive(kind) => match kind {
            PrimitiveKind::Bool | PrimitiveKind::Int8 | PrimitiveKind::Byte | PrimitiveKind::UInt8 | PrimitiveKind::Char => {
                let raw = cursor.next_bytes(n as u64)?.to_vec();
                ArrayValue::OneByte(OneByteArray::new(*kind, raw))
            }
            PrimitiveKind::Int16 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_i16()?);
                }
                ArrayValue::I16(v)
            }
            PrimitiveKind::UInt16 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_u16()? as i32);
                }
                ArrayValue::U16Widened(v)
            }
            PrimitiveKind::Int32 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_i32()?);
                }
                ArrayValue::I32(v)
            }
            PrimitiveKind::UInt32 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_u32()? as i64);
                }
                ArrayValue::U32Widened(v)
            }
            PrimitiveKind::Float32 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_f32()?);
                }
                ArrayValue::F32(v)
            }
            PrimitiveKind::Int64 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_i64()?);
                }
                ArrayValue::I64(v)
            }
            PrimitiveKind::UInt64 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(BigUint::from(cursor.next_u64()?));
                }
                ArrayValue::U64Widened(v)
            }
            PrimitiveKind::Float64 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_f64()?);
                }
                ArrayValue::F64(v)
            }
            PrimitiveKind::String => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_string()?);
                }
                ArrayValue::String(v)
            }
            PrimitiveKind::Time => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(cursor.next_time()?);
                }
                ArrayValue::Time(v)
            }
            PrimitiveKind::Duration => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(duration_secs(cursor)?);
                }
                ArrayValue::Duration(v)
            }
        },
    };
    Ok(Field::Array(array))
}
