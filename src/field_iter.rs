//! `HeaderCodec`: parses the length-prefixed `name=value` field maps used by
//! every record header (and by the nested connection header embedded in a
//! `CONNECTION` record's data).
use std::collections::HashMap;

use byteorder::{ByteOrder, LE};
use bytes::Bytes;

use crate::error::{BagError, Result};
use crate::timestamp::Timestamp;

/// Sanity cap on a single header field's value length (spec: ≈100,000
/// bytes; anything larger signals corruption rather than a legitimate
/// field).
pub(crate) const MAX_FIELD: u32 = 100_000;

/// Splits one `(i32 len)(name "=" value)` entry off the front of `buf`,
/// returning the name, the raw value bytes, and the remainder.
fn read_field(mut buf: Bytes) -> Result<(String, Bytes, Bytes)> {
    if buf.len() < 4 {
        return Err(BagError::corrupt(None, "truncated header field length"));
    }
    let n = LE::read_u32(&buf[..4]);
    if n > MAX_FIELD {
        return Err(BagError::corrupt(
            None,
            format!("header field of {n} bytes exceeds the {MAX_FIELD} byte cap"),
        ));
    }
    buf = buf.slice(4..);
    if (buf.len() as u64) < n as u64 {
        return Err(BagError::corrupt(None, "truncated header field"));
    }
    let entry = buf.slice(..n as usize);
    let rest = buf.slice(n as usize..);

    let delim = entry
        .iter()
        .position(|&b| b == b'=')
        .ok_or_else(|| BagError::corrupt(None, "header field missing '=' separator"))?;
    let name = std::str::from_utf8(&entry[..delim])
        .map_err(|e| BagError::corrupt(None, format!("non-utf8 field name: {e}")))?
        .to_string();
    let value = entry.slice(delim + 1..);
    Ok((name, value, rest))
}

/// Iterator over the `(name, value)` entries of a header buffer.
pub(crate) struct FieldIterator {
    buf: Bytes,
}

impl FieldIterator {
    pub(crate) fn new(buf: Bytes) -> Self {
        Self { buf }
    }
}

impl Iterator for FieldIterator {
    type Item = Result<(String, Bytes)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }
        let (name, val, rest) = match read_field(self.buf.clone()) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        self.buf = rest;
        Some(Ok((name, val)))
    }
}

/// A parsed header: `name -> raw value bytes`, with typed accessors that
/// decode on demand.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeaderMap {
    fields: HashMap<String, Bytes>,
}

impl HeaderMap {
    pub(crate) fn parse(buf: Bytes) -> Result<Self> {
        let mut fields = HashMap::new();
        for item in FieldIterator::new(buf) {
            let (name, val) = item?;
            fields.insert(name, val);
        }
        Ok(Self { fields })
    }

    fn get(&self, key: &str) -> Result<&Bytes> {
        self.fields
            .get(key)
            .ok_or_else(|| BagError::UnknownField(key.to_string()))
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub(crate) fn first_byte(&self, key: &str) -> Result<u8> {
        let v = self.get(key)?;
        v.first()
            .copied()
            .ok_or_else(|| BagError::corrupt(None, format!("field '{key}' is empty")))
    }

    pub(crate) fn op(&self) -> Result<u8> {
        let v = self.get("op")?;
        if v.len() != 1 {
            return Err(BagError::corrupt(None, "'op' field must be a single byte"));
        }
        Ok(v[0])
    }

    pub(crate) fn i32(&self, key: &str) -> Result<i32> {
        let v = self.get(key)?;
        if v.len() != 4 {
            return Err(BagError::corrupt(None, format!("field '{key}' is not 4 bytes")));
        }
        Ok(LE::read_i32(v))
    }

    pub(crate) fn u32(&self, key: &str) -> Result<u32> {
        let v = self.get(key)?;
        if v.len() != 4 {
            return Err(BagError::corrupt(None, format!("field '{key}' is not 4 bytes")));
        }
        Ok(LE::read_u32(v))
    }

    pub(crate) fn i64(&self, key: &str) -> Result<i64> {
        let v = self.get(key)?;
        if v.len() != 8 {
            return Err(BagError::corrupt(None, format!("field '{key}' is not 8 bytes")));
        }
        Ok(LE::read_i64(v))
    }

    pub(crate) fn time(&self, key: &str) -> Result<Timestamp> {
        let v = self.get(key)?;
        if v.len() != 8 {
            return Err(BagError::corrupt(None, format!("field '{key}' is not 8 bytes")));
        }
        let sec = LE::read_i32(&v[..4]);
        let nsec = LE::read_i32(&v[4..]);
        Ok(Timestamp::from_sec_nsec(sec, nsec))
    }

    pub(crate) fn string(&self, key: &str) -> Result<String> {
        let v = self.get(key)?;
        String::from_utf8(v.to_vec())
            .map_err(|e| BagError::corrupt(None, format!("field '{key}' is not utf-8: {e}")))
    }

    pub(crate) fn bytes(&self, key: &str) -> Result<Bytes> {
        Ok(self.get(key)?.clone())
    }
}
