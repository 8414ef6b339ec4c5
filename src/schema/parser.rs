//! Splits a connection's `message_definition` text into per-type blocks and
//! parses each block's field lines.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BagError, Result};
use crate::schema::field_spec::ArrayLen;

const BLOCK_SEPARATOR: &str =
    "================================================================================";

static FIELD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([\w/\[\]]+)\s+(\w+)\s*(?:=\s*(.*))?$").unwrap());

static TYPE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([\w/]+)(\[(\d*)\])?$").unwrap());

/// One `TYPE NAME [= DEFAULT]` line, type not yet resolved against a
/// registry.
#[derive(Debug, Clone)]
pub(crate) struct RawField {
    pub(crate) base_type: String,
    pub(crate) array: ArrayLen,
    pub(crate) name: String,
    pub(crate) default: Option<String>,
}

/// One `MSG: package/Name` block, fields in declaration order.
#[derive(Debug, Clone)]
pub(crate) struct RawBlock {
    pub(crate) type_name: String,
    pub(crate) fields: Vec<RawField>,
}

/// Splits `base_type[]`/`base_type[N]` into its components.
fn split_type_token(token: &str) -> Result<(String, ArrayLen)> {
    let caps = TYPE_TOKEN
        .captures(token)
        .ok_or_else(|| BagError::InvalidDefinition(format!("malformed type token '{token}'")))?;
    let base = caps[1].to_string();
    let array = match caps.get(2) {
        None => ArrayLen::Scalar,
        Some(_) => match &caps[3] {
            "" => ArrayLen::Variable,
            n => ArrayLen::Fixed(n.parse().map_err(|_| {
                BagError::InvalidDefinition(format!("malformed array length in '{token}'"))
            })?),
        },
    };
    Ok((base, array))
}

fn parse_field_line(line: &str) -> Result<RawField> {
    let caps = FIELD_LINE
        .captures(line)
        .ok_or_else(|| BagError::InvalidDefinition(format!("unparseable field line: '{line}'")))?;
    let (base_type, array) = split_type_token(&caps[1])?;
    let name = caps[2].to_string();
    let default = caps.get(3).map(|m| m.as_str().trim_end().to_string());
    Ok(RawField {
        base_type,
        array,
        name,
        default,
    })
}

fn is_blank_or_comment(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parses one block's body (lines after its `MSG: package/Name` banner,
/// or the whole top block if it carries no banner).
fn parse_block_fields(body: &str) -> Result<Vec<RawField>> {
    let mut fields = Vec::new();
    for raw_line in body.lines() {
        let trimmed = raw_line.trim();
        if is_blank_or_comment(trimmed) {
            continue;
        }
        fields.push(parse_field_line(trimmed)?);
    }
    Ok(fields)
}

/// Splits `message_definition` into the top-level block (named `top_type`)
/// followed by each `MSG:`-prefixed dependency block.
pub(crate) fn split_blocks(top_type: &str, message_definition: &str) -> Result<Vec<RawBlock>> {
    let mut blocks = Vec::new();
    let mut first = true;
    for chunk in message_definition.split(BLOCK_SEPARATOR) {
        let chunk = chunk.trim_start_matches(['\n', '\r']);
        let (type_name, body) = if first {
            (top_type.to_string(), chunk)
        } else {
            let trimmed = chunk.trim_start();
            let rest = trimmed.strip_prefix("MSG:").ok_or_else(|| {
                BagError::InvalidDefinition("dependency block missing 'MSG:' banner".to_string())
            })?;
            let mut lines = rest.splitn(2, '\n');
            let name = lines.next().unwrap_or_default().trim().to_string();
            (name, lines.next().unwrap_or_default())
        };
        first = false;
        if type_name.is_empty() {
            return Err(BagError::InvalidDefinition("empty message type name".to_string()));
        }
        blocks.push(RawBlock {
            type_name,
            fields: parse_block_fields(body)?,
        });
    }
    Ok(blocks)
}
