//! §4.9 per-topic message index: built lazily on first random-access
//! request and cached by [`crate::BagFile`], since `INDEX_DATA` is often
//! absent or only partially written.
use std::io::{Cursor as IoCursor, Read, Seek};

use bytes::Bytes;

use crate::bag_index::BagIndex;
use crate::error::{BagError, Result};
use crate::record;
use crate::record_types::{self, Chunk};

/// Where one topic's `i`-th message lives: the chunk it's in, and its
/// record offset within that chunk's decompressed payload.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MessageLocation {
    pub(crate) chunk_offset: u64,
    pub(crate) intra_chunk_offset: u64,
}

/// Scans every chunk that could hold a message from `conn_ids`, recording
/// each match's location, then sorts by `(chunk_offset, intra_chunk_offset)`
/// — file order.
pub(crate) fn build<R: Read + Seek>(
    source: &mut R,
    index: &BagIndex,
    conn_ids: &[u32],
) -> Result<Vec<MessageLocation>> {
    let mut chunk_offsets: Vec<u64> = index
        .chunk_infos
        .iter()
        .filter(|ci| ci.entries.iter().any(|e| conn_ids.contains(&e.conn_id)))
        .map(|ci| ci.chunk_pos)
        .collect();
    chunk_offsets.sort_unstable();
    chunk_offsets.dedup();

    let mut locations = Vec::new();
    for chunk_offset in chunk_offsets {
        let raw = record::read_record_at(source, chunk_offset, index.max_header)?;
        let compressed = record::materialize_data(source, &raw)?;
        let chunk = Chunk::decode(&raw.header, compressed)?;
        let mut inner = IoCursor::new(chunk.payload());
        while let Some(rec) = record::read_next_record(&mut inner, index.max_header)? {
            if rec.header.op()? != record_types::OP_MESSAGE_DATA {
                continue;
            }
            if conn_ids.contains(&rec.header.u32("conn")?) {
                locations.push(MessageLocation {
                    chunk_offset,
                    intra_chunk_offset: rec.record_offset,
                });
            }
        }
    }
    locations.sort_by_key(|l| (l.chunk_offset, l.intra_chunk_offset));
    Ok(locations)
}

/// Fetches one message's `(conn_id, payload)` at a previously recorded
/// location.
pub(crate) fn fetch<R: Read + Seek>(source: &mut R, loc: MessageLocation, max_header: u32) -> Result<(u32, Bytes)> {
    let chunk_raw = record::read_record_at(source, loc.chunk_offset, max_header)?;
    let compressed = record::materialize_data(source, &chunk_raw)?;
    let chunk = Chunk::decode(&chunk_raw.header, compressed)?;
    let mut inner = IoCursor::new(chunk.payload());
    let rec = record::read_record_at(&mut inner, loc.intra_chunk_offset, max_header)?;
    if rec.header.op()? != record_types::OP_MESSAGE_DATA {
        return Err(BagError::corrupt(
            loc.intra_chunk_offset,
            "topic index location does not point at a MESSAGE_DATA record",
        ));
    }
    let conn_id = rec.header.u32("conn")?;
    let data = record::materialize_data(&mut inner, &rec)?;
    Ok((conn_id, data))
}
