//! Canonical md5 computation over a resolved field list, per the domain's
//! `genmsg` text-normalization convention — not a hash of the raw
//! definition text.
use md5::{Digest, Md5};

use crate::schema::field_spec::{ArrayLen, ConstantValue, FieldSpec, TypeSpec};

fn format_constant(value: &ConstantValue) -> String {
    match value {
        ConstantValue::Bool(b) => if *b { "1".to_string() } else { "0".to_string() },
        ConstantValue::I8(v) => v.to_string(),
        ConstantValue::U8(v) => v.to_string(),
        ConstantValue::I16(v) => v.to_string(),
        ConstantValue::U16(v) => v.to_string(),
        ConstantValue::I32(v) => v.to_string(),
        ConstantValue::U32(v) => v.to_string(),
        ConstantValue::I64(v) => v.to_string(),
        ConstantValue::U64(v) => v.to_string(),
        ConstantValue::F32(v) => v.to_string(),
        ConstantValue::F64(v) => v.to_string(),
        ConstantValue::Str(s) => s.clone(),
    }
}

fn array_suffix(array: ArrayLen) -> String {
    match array {
        ArrayLen::Scalar => String::new(),
        ArrayLen::Variable => "[]".to_string(),
        ArrayLen::Fixed(n) => format!("[{n}]"),
    }
}

/// One field's canonicalized text line, before constant-first reordering.
fn field_line(field: &FieldSpec) -> String {
    if let Some(value) = &field.constant {
        return format!("{}={}", field.name, format_constant(value));
    }
    match &field.type_spec {
        TypeSpec::Primitive(kind) => {
            format!("{}{} {}", kind.md5_token(), array_suffix(field.array), field.name)
        }
        // Nested message fields hash to the child schema's md5, and the
        // array-ness of the field is dropped from the text entirely —
        // this matches the well-known genmsg convention.
        TypeSpec::Nested(schema) => format!("{} {}", schema.md5sum, field.name),
    }
}

/// Computes the canonical md5sum for a schema's resolved field list.
pub(crate) fn compute_md5(fields: &[FieldSpec]) -> String {
    let mut constant_lines = Vec::new();
    let mut field_lines = Vec::new();
    for field in fields {
        let line = field_line(field);
        if field.constant.is_some() {
            constant_lines.push(line);
        } else {
            field_lines.push(line);
        }
    }
    constant_lines.extend(field_lines);
    let text = constant_lines.join("\n");

    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    base16ct::lower::encode_string(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field_spec::PrimitiveKind;

    #[test]
    fn constants_sort_before_fields_preserving_relative_order() {
        let fields = vec![
            FieldSpec {
                name: "x".to_string(),
                type_spec: TypeSpec::Primitive(PrimitiveKind::Int32),
                array: ArrayLen::Scalar,
                constant: None,
            },
            FieldSpec {
                name: "FOO".to_string(),
                type_spec: TypeSpec::Primitive(PrimitiveKind::Int32),
                array: ArrayLen::Scalar,
                constant: Some(ConstantValue::I32(42)),
            },
        ];
        let md5 = compute_md5(&fields);
        assert_eq!(md5.len(), 32);
        assert!(md5.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn byte_and_char_normalize_like_int8_uint8() {
        let byte_field = FieldSpec {
            name: "v".to_string(),
            type_spec: TypeSpec::Primitive(PrimitiveKind::Byte),
            array: ArrayLen::Scalar,
            constant: None,
        };
        let int8_field = FieldSpec {
            name: "v".to_string(),
            type_spec: TypeSpec::Primitive(PrimitiveKind::Int8),
            array: ArrayLen::Scalar,
            constant: None,
        };
        assert_eq!(
            compute_md5(std::slice::from_ref(&byte_field)),
            compute_md5(std::slice::from_ref(&int8_field))
        );
    }
}
