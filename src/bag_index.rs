//! First-pass structural scan: walks the whole record stream once,
//! building the in-memory index (connections, chunk offsets, chunk infos,
//! index-data) that every later read depends on.
//!
//! The top-level record stream interleaves two regions: chunk offsets and
//! their `INDEX_DATA` entries appear *before* `index_pos`, while
//! `CONNECTION` and `CHUNK_INFO` records appear *after* it. Jumping
//! straight to `index_pos` would skip the `INDEX_DATA` association with
//! its preceding `CHUNK`, so this scans forward from the first record to
//! EOF in one pass instead.
use std::collections::HashMap;
use std::io::{Read, Seek};

use crate::error::{BagError, Result};
use crate::record;
use crate::record_types::{
    self, BagHeaderRecord, ChunkInfo, Connection, IndexData,
};
use crate::timestamp::Timestamp;

/// Structural metadata for one `CHUNK` record, recorded without
/// decompressing its payload.
#[derive(Debug, Clone)]
pub struct ChunkMeta {
    /// Offset of the chunk's `header_len` field — what `CHUNK_INFO.chunk_pos`
    /// and random-access reads key on.
    pub(crate) offset: u64,
    /// Compression the chunk was stored with.
    pub compression: record_types::CompressionKind,
    /// Declared decompressed payload size, in bytes.
    pub decompressed_size: u32,
}

/// The file's fully-resolved structural index.
#[derive(Debug)]
pub(crate) struct BagIndex {
    pub(crate) index_pos: u64,
    pub(crate) chunks: Vec<ChunkMeta>,
    pub(crate) index_data: Vec<IndexData>,
    pub(crate) connections: HashMap<u32, Connection>,
    /// Same connections as `connections`, sorted by id — what the public
    /// `BagFile::connections` slice is built from.
    pub(crate) connections_ordered: Vec<Connection>,
    pub(crate) chunk_infos: Vec<ChunkInfo>,
    /// `chunk_infos` indices containing a given connection id, in file
    /// (chunk-info) order — the order `MessageIterator` walks in.
    pub(crate) chunk_infos_by_conn: HashMap<u32, Vec<usize>>,
    pub(crate) start_time: Timestamp,
    pub(crate) end_time: Timestamp,
    /// Header-size sanity cap applied to every record read through this
    /// index, including later random-access reads (`OpenOptions::max_header_len`).
    pub(crate) max_header: u32,
    /// `BAG_HEADER`-declared connection count, kept separate from
    /// `connections.len()` so the fingerprint (§4.10) hashes the bag's
    /// declared identity rather than whatever the scan happened to find.
    pub(crate) conn_count: u32,
    /// `BAG_HEADER`-declared chunk count, same reasoning as `conn_count`.
    pub(crate) chunk_count: u32,
}

impl BagIndex {
    /// Scans `source` (already positioned at the start of the file) and
    /// builds the full index. `strict_counts` controls whether a mismatch
    /// between the bag header's declared counts and what was actually
    /// found is fatal or merely logged.
    pub(crate) fn build<R: Read + Seek>(source: &mut R, strict_counts: bool, max_header: u32) -> Result<Self> {
        let bag_header_rec = record::read_next_record(source, max_header)?
            .ok_or_else(|| BagError::corrupt(0u64, "bag is empty: no BAG_HEADER record"))?;
        if bag_header_rec.header.op()? != record_types::OP_BAG_HEADER {
            return Err(BagError::corrupt(
                bag_header_rec.record_offset,
                "first record is not a BAG_HEADER",
            ));
        }
        let bag_header = BagHeaderRecord::from_header(&bag_header_rec.header)?;
        if bag_header.index_pos == 0 {
            return Err(BagError::Unindexed);
        }

        let mut chunks = Vec::new();
        let mut index_data = Vec::new();
        let mut connections = HashMap::new();
        let mut chunk_infos: Vec<ChunkInfo> = Vec::new();
        let mut last_chunk_offset: Option<u64> = None;

        while let Some(rec) = record::read_next_record(source, max_header)? {
            let op = rec.header.op()?;
            match op {
                record_types::OP_CHUNK => {
                    let compression = record_types::CompressionKind::from_token(
                        &rec.header.string("compression")?,
                    );
                    let decompressed_size = rec.header.u32("size")?;
                    last_chunk_offset = Some(rec.record_offset);
                    chunks.push(ChunkMeta {
                        offset: rec.record_offset,
                        compression,
                        decompressed_size,
                    });
                }
                record_types::OP_INDEX_DATA => {
                    if last_chunk_offset.is_none() {
                        return Err(BagError::corrupt(
                            rec.record_offset,
                            "INDEX_DATA with no preceding CHUNK",
                        ));
                    }
                    let data = record::materialize_data(source, &rec)?;
                    index_data.push(IndexData::from_record(&rec.header, data)?);
                }
                record_types::OP_CONNECTION => {
                    let data = record::materialize_data(source, &rec)?;
                    match Connection::from_record(&rec.header, data) {
                        Ok(conn) => {
                            connections.insert(conn.id, conn);
                        }
                        Err(e) => log::warn!(
                            "connection record at offset {}: {e}; skipping connection",
                            rec.record_offset
                        ),
                    }
                }
                record_types::OP_CHUNK_INFO => {
                    let data = record::materialize_data(source, &rec)?;
                    chunk_infos.push(ChunkInfo::from_record(&rec.header, data)?);
                }
                record_types::OP_MESSAGE_DATA => {
                    log::warn!(
                        "MESSAGE_DATA record at top level (offset {}); only valid inside a chunk",
                        rec.record_offset
                    );
                }
                other => {
                    log::warn!("unrecognized top-level record op {other:#x}, skipping");
                }
            }
        }

        let mut chunk_infos_by_conn: HashMap<u32, Vec<usize>> = HashMap::new();
        for (idx, ci) in chunk_infos.iter().enumerate() {
            for entry in &ci.entries {
                chunk_infos_by_conn.entry(entry.conn_id).or_default().push(idx);
            }
        }

        let mut connections_ordered: Vec<Connection> = connections.values().cloned().collect();
        connections_ordered.sort_by_key(|c| c.id);

        let (start_time, end_time) = time_bounds(&chunk_infos, &index_data);

        if strict_counts {
            if chunks.len() as u32 != bag_header.chunk_count {
                return Err(BagError::CountMismatch(format!(
                    "bag header declares {} chunks, found {}",
                    bag_header.chunk_count,
                    chunks.len()
                )));
            }
            if connections.len() as u32 != bag_header.conn_count {
                return Err(BagError::CountMismatch(format!(
                    "bag header declares {} connections, found {}",
                    bag_header.conn_count,
                    connections.len()
                )));
            }
        } else {
            if chunks.len() as u32 != bag_header.chunk_count {
                log::warn!(
                    "bag header declares {} chunks, found {}",
                    bag_header.chunk_count,
                    chunks.len()
                );
            }
            if connections.len() as u32 != bag_header.conn_count {
                log::warn!(
                    "bag header declares {} connections, found {}",
                    bag_header.conn_count,
                    connections.len()
                );
            }
        }

        Ok(Self {
            index_pos: bag_header.index_pos,
            chunks,
            index_data,
            connections,
            connections_ordered,
            chunk_infos,
            chunk_infos_by_conn,
            start_time,
            end_time,
            max_header,
            conn_count: bag_header.conn_count,
            chunk_count: bag_header.chunk_count,
        })
    }

    /// Chunk infos that list `conn_id` among their connections, in file
    /// order.
    pub(crate) fn chunk_infos_for_connection(&self, conn_id: u32) -> impl Iterator<Item = &ChunkInfo> {
        self.chunk_infos_by_conn
            .get(&conn_id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.chunk_infos[idx])
    }

    /// Duration between the file's earliest and latest observed message
    /// time, in seconds.
    pub(crate) fn duration_secs(&self) -> f64 {
        (self.end_time.as_nanos() - self.start_time.as_nanos()) as f64 / 1e9
    }
}

fn time_bounds(chunk_infos: &[ChunkInfo], index_data: &[IndexData]) -> (Timestamp, Timestamp) {
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for ci in chunk_infos {
        min = min.min(ci.start_time.as_nanos());
        max = max.max(ci.end_time.as_nanos());
    }
    for idx in index_data {
        for entry in &idx.entries {
            min = min.min(entry.time.as_nanos());
            max = max.max(entry.time.as_nanos());
        }
    }
    if min > max {
        (Timestamp::from_nanos(0), Timestamp::from_nanos(0))
    } else {
        (Timestamp::from_nanos(min), Timestamp::from_nanos(max))
    }
}
