//! §4.10 content fingerprint: a fast, MD5-based structural identifier.
//! Hashes record metadata and message timestamps in a fixed order so two
//! bags with identical structure (but perhaps re-chunked or
//! differently-compressed) produce the same fingerprint, while the hash
//! never touches actual message payload bytes.
use std::io::{Cursor as IoCursor, Read, Seek};

use md5::{Digest, Md5};

use crate::bag_index::BagIndex;
use crate::error::Result;
use crate::record;
use crate::record_types::{self, Chunk};

/// Computes the fingerprint for an already-built index, re-scanning each
/// chunk's message records (but not decoding their payloads) from
/// `source`.
pub(crate) fn compute<R: Read + Seek>(source: &mut R, index: &BagIndex) -> Result<String> {
    let mut hasher = Md5::new();

    hasher.update(index.conn_count.to_le_bytes());
    hasher.update(index.chunk_count.to_le_bytes());
    hasher.update(index.index_pos.to_le_bytes());

    for chunk in &index.chunks {
        hasher.update(chunk.compression.as_str().as_bytes());
        hasher.update(chunk.decompressed_size.to_le_bytes());
    }

    let mut conn_ids: Vec<_> = index.connections.keys().copied().collect();
    conn_ids.sort_unstable();
    for id in &conn_ids {
        let conn = &index.connections[id];
        if let Some(caller_id) = &conn.caller_id {
            hasher.update(caller_id.as_bytes());
        }
        hasher.update(conn.id.to_le_bytes());
        hasher.update(conn.md5sum.as_bytes());
        hasher.update(conn.topic.as_bytes());
        hasher.update(conn.message_definition.as_bytes());
    }

    for chunk_meta in &index.chunks {
        let raw = record::read_record_at(source, chunk_meta.offset, index.max_header)?;
        let compressed = record::materialize_data(source, &raw)?;
        let chunk = Chunk::decode(&raw.header, compressed)?;
        let mut inner = IoCursor::new(chunk.payload());
        while let Some(rec) = record::read_next_record(&mut inner, index.max_header)? {
            if rec.header.op()? == record_types::OP_MESSAGE_DATA {
                let conn_id = rec.header.u32("conn")?;
                let time = rec.header.time("time")?;
                hasher.update(conn_id.to_le_bytes());
                hasher.update((time.as_nanos() / 1_000_000).to_le_bytes());
            }
        }
    }

    for idx in &index.index_data {
        hasher.update(idx.conn_id.to_le_bytes());
        hasher.update((idx.entries.len() as u32).to_le_bytes());
        for entry in &idx.entries {
            hasher.update(entry.time.as_nanos().to_le_bytes());
            hasher.update(entry.offset.to_le_bytes());
        }
    }

    for ci in &index.chunk_infos {
        hasher.update(ci.chunk_pos.to_le_bytes());
        hasher.update((ci.entries.len() as u32).to_le_bytes());
        hasher.update(ci.start_time.as_nanos().to_le_bytes());
        hasher.update(ci.end_time.as_nanos().to_le_bytes());
        for entry in &ci.entries {
            hasher.update(entry.conn_id.to_le_bytes());
            hasher.update(entry.count.to_le_bytes());
        }
    }

    Ok(base16ct::lower::encode_string(&hasher.finalize()))
}
