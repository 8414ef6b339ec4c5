//! Resolves a connection's `message_definition` text into a tree of
//! [`Schema`]s, handling forward references between blocks and exposing
//! the three lookup indices later stages need.
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{BagError, Result};
use crate::schema::field_spec::{ArrayLen, ConstantValue, FieldSpec, PrimitiveKind, Schema, TypeSpec};
use crate::schema::md5_normalize::compute_md5;
use crate::schema::parser::{self, RawBlock, RawField};

/// Splits `pkg/Name` into its parts; a bare `Name` has no package.
fn split_package(type_name: &str) -> (Option<&str>, &str) {
    match type_name.rsplit_once('/') {
        Some((pkg, name)) => (Some(pkg), name),
        None => (None, type_name),
    }
}

fn parse_constant(kind: PrimitiveKind, raw: &str) -> Result<ConstantValue> {
    use PrimitiveKind::*;
    if matches!(kind, String) {
        return Ok(ConstantValue::Str(raw.to_string()));
    }
    let token = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| BagError::InvalidDefinition(format!("empty constant value for '{raw}'")))?;
    Ok(match kind {
        Bool => ConstantValue::Bool(token != "0"),
        Int8 | Byte => ConstantValue::I8(token.parse().map_err(|_| bad_constant(token))?),
        UInt8 | Char => ConstantValue::U8(token.parse().map_err(|_| bad_constant(token))?),
        Int16 => ConstantValue::I16(token.parse().map_err(|_| bad_constant(token))?),
        UInt16 => ConstantValue::U16(token.parse().map_err(|_| bad_constant(token))?),
        Int32 => ConstantValue::I32(token.parse().map_err(|_| bad_constant(token))?),
        UInt32 => ConstantValue::U32(token.parse().map_err(|_| bad_constant(token))?),
        Int64 => ConstantValue::I64(token.parse().map_err(|_| bad_constant(token))?),
        UInt64 => ConstantValue::U64(token.parse().map_err(|_| bad_constant(token))?),
        Float32 => ConstantValue::F32(token.parse().map_err(|_| bad_constant(token))?),
        Float64 => ConstantValue::F64(token.parse().map_err(|_| bad_constant(token))?),
        Time | Duration => {
            return Err(BagError::InvalidDefinition(
                "time/duration fields cannot be constants".to_string(),
            ))
        }
        String => unreachable!("handled above"),
    })
}

fn bad_constant(token: &str) -> BagError {
    BagError::InvalidDefinition(format!("malformed constant value '{token}'"))
}

enum TryBuildError {
    /// A nested type wasn't found yet; try again next pass.
    Unresolved,
    /// A hard error: bad grammar, bad constant, etc.
    Fatal(BagError),
}

impl From<BagError> for TryBuildError {
    fn from(e: BagError) -> Self {
        TryBuildError::Fatal(e)
    }
}

fn resolve_nested<'a>(
    resolved: &'a HashMap<String, Arc<Schema>>,
    by_bare: &'a HashMap<String, Arc<Schema>>,
    base_type: &str,
) -> Option<&'a Arc<Schema>> {
    let (pkg, name) = split_package(base_type);
    if let Some(pkg) = pkg {
        if let Some(s) = resolved.get(&format!("{pkg}/{name}")) {
            return Some(s);
        }
    }
    by_bare.get(name)
}

fn try_build_field(
    raw: &RawField,
    resolved: &HashMap<String, Arc<Schema>>,
    by_bare: &HashMap<String, Arc<Schema>>,
) -> std::result::Result<FieldSpec, TryBuildError> {
    let type_spec = match PrimitiveKind::from_token(&raw.base_type) {
        Some(kind) => TypeSpec::Primitive(kind),
        None => {
            let schema = resolve_nested(resolved, by_bare, &raw.base_type)
                .ok_or(TryBuildError::Unresolved)?;
            TypeSpec::Nested(schema.clone())
        }
    };
    let constant = match (&raw.default, &type_spec) {
        (Some(raw_value), TypeSpec::Primitive(kind)) => Some(parse_constant(*kind, raw_value)?),
        (Some(_), TypeSpec::Nested(_)) => {
            return Err(BagError::InvalidDefinition(format!(
                "nested-type field '{}' cannot carry a constant default",
                raw.name
            ))
            .into())
        }
        (None, _) => None,
    };
    let array = if constant.is_some() { ArrayLen::Scalar } else { raw.array };
    Ok(FieldSpec {
        name: raw.name.clone(),
        type_spec,
        array,
        constant,
    })
}

fn try_build_block(
    block: &RawBlock,
    resolved: &HashMap<String, Arc<Schema>>,
    by_bare: &HashMap<String, Arc<Schema>>,
) -> std::result::Result<Schema, TryBuildError> {
    let mut fields = Vec::with_capacity(block.fields.len());
    for raw in &block.fields {
        fields.push(try_build_field(raw, resolved, by_bare)?);
    }
    let md5sum = compute_md5(&fields);
    Ok(Schema {
        type_name: block.type_name.clone(),
        fields,
        md5sum,
    })
}

/// The resolved schema tree for one connection, plus the indices needed
/// to look up any nested type it transitively references.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// The top-level (connection) schema.
    pub(crate) root: Arc<Schema>,
    by_full: HashMap<String, Arc<Schema>>,
    by_bare: HashMap<String, Arc<Schema>>,
    by_md5: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Parses and resolves `message_definition`, whose top-level (bannerless)
    /// block is `type_name`.
    pub(crate) fn build(type_name: &str, message_definition: &str) -> Result<Self> {
        let blocks = parser::split_blocks(type_name, message_definition)?;
        let mut pending: Vec<RawBlock> = blocks.into_iter().rev().collect();

        let mut by_full: HashMap<String, Arc<Schema>> = HashMap::new();
        let mut by_bare: HashMap<String, Arc<Schema>> = HashMap::new();

        while !pending.is_empty() {
            let mut progressed = false;
            let mut still_pending = Vec::new();
            for block in pending {
                match try_build_block(&block, &by_full, &by_bare) {
                    Ok(schema) => {
                        progressed = true;
                        let arc = Arc::new(schema);
                        let (_, bare) = split_package(&arc.type_name);
                        by_bare.entry(bare.to_string()).or_insert_with(|| arc.clone());
                        by_full.insert(arc.type_name.clone(), arc);
                    }
                    Err(TryBuildError::Unresolved) => still_pending.push(block),
                    Err(TryBuildError::Fatal(e)) => return Err(e),
                }
            }
            if !progressed && !still_pending.is_empty() {
                let names: Vec<_> = still_pending.iter().map(|b| b.type_name.as_str()).collect();
                return Err(BagError::InvalidDefinition(format!(
                    "could not resolve nested types for: {}",
                    names.join(", ")
                )));
            }
            pending = still_pending;
        }

        let root = by_full
            .get(type_name)
            .cloned()
            .ok_or_else(|| BagError::InvalidDefinition(format!("missing top-level block for {type_name}")))?;

        let mut by_md5 = HashMap::new();
        for schema in by_full.values() {
            by_md5.insert(schema.md5sum.clone(), schema.clone());
        }

        Ok(Self {
            root,
            by_full,
            by_bare,
            by_md5,
        })
    }

    /// The connection's top-level schema.
    pub fn root(&self) -> &Arc<Schema> {
        &self.root
    }

    /// Looks up a nested type by bare name or `package/Name`.
    pub fn lookup(&self, type_name: &str) -> Result<&Arc<Schema>> {
        if let Some(s) = self.by_full.get(type_name) {
            return Ok(s);
        }
        let (_, bare) = split_package(type_name);
        self.by_bare
            .get(bare)
            .ok_or_else(|| BagError::UnknownMessage(type_name.to_string()))
    }

    /// Looks up a schema transitively reachable from the root by its md5sum.
    pub fn lookup_by_md5(&self, md5: &str) -> Result<&Arc<Schema>> {
        self.by_md5
            .get(md5)
            .ok_or_else(|| BagError::UnknownMessage(format!("md5:{md5}")))
    }
}
