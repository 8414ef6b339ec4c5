//! `MessageIterator`: lazily walks an ordered set of connections, yielding
//! `(connection, decoded message)` pairs by opening each connection's
//! chunks in `CHUNK_INFO` order and scanning their inner records.
//!
//! This cannot be a plain [`std::iter::Iterator`]: the yielded message
//! borrows the decoder's reused scratch buffer, so advancing invalidates
//! the previous item. Callers pull with [`MessageIterator::next`] instead
//! and must read out whatever they need before calling it again.
use std::io::{Cursor as IoCursor, Read, Seek};
use std::sync::Arc;

use bytes::Bytes;

use crate::bag_index::BagIndex;
use crate::decode::{Message, MessageDecoder};
use crate::error::{BagError, Result};
use crate::record::{self, RawRecord};
use crate::record_types::{self, Chunk, Connection};

/// Per-connection decode state: its reused decoder and the chunk cursor
/// it is currently scanning.
struct ConnectionState {
    conn_id: u32,
    decoder: MessageDecoder,
    pending_chunk_infos: std::vec::IntoIter<usize>,
    open_chunk: Option<IoCursor<Bytes>>,
}

enum ScanOutcome {
    Yielded,
    ChunkExhausted,
    Error(BagError),
}

/// Lazily decodes messages for a fixed, ordered set of connections.
pub struct MessageIterator<'a, R> {
    source: &'a mut R,
    index: Arc<BagIndex>,
    remaining_conns: std::vec::IntoIter<u32>,
    current: Option<ConnectionState>,
}

impl<'a, R: Read + Seek> MessageIterator<'a, R> {
    pub(crate) fn new(source: &'a mut R, index: Arc<BagIndex>, conn_ids: Vec<u32>) -> Self {
        Self {
            source,
            index,
            remaining_conns: conn_ids.into_iter(),
            current: None,
        }
    }

    /// Advances to the next decoded message, or `None` once every
    /// connection's chunks are exhausted.
    pub fn next(&mut self) -> Option<Result<(&Connection, &Message)>> {
        loop {
            if self.current.is_none() && !self.start_next_connection() {
                return None;
            }
            let conn_id = self.current.as_ref().unwrap().conn_id;

            match self.scan_current_chunk(conn_id) {
                ScanOutcome::Yielded => {
                    let connection = self.index.connections.get(&conn_id).expect("checked in start_next_connection");
                    let message = self
                        .current
                        .as_ref()
                        .unwrap()
                        .decoder
                        .current()
                        .expect("decode ran before yielding");
                    return Some(Ok((connection, message)));
                }
                ScanOutcome::Error(e) => return Some(Err(e)),
                ScanOutcome::ChunkExhausted => {
                    self.current.as_mut().unwrap().open_chunk = None;
                    match self.open_next_chunk() {
                        Ok(true) => continue,
                        Ok(false) => {
                            self.current = None;
                            continue;
                        }
                        Err(e) => {
                            log::warn!("failed to open chunk for connection {conn_id}: {e}; skipping chunk");
                            continue;
                        }
                    }
                }
            }
        }
    }

    /// Picks the next connection with a schema and at least the chance of
    /// chunks; `false` once the connection list is exhausted.
    fn start_next_connection(&mut self) -> bool {
        for conn_id in self.remaining_conns.by_ref() {
            if !self.index.connections.contains_key(&conn_id) {
                log::warn!("connection {conn_id} not present in index; skipping");
                continue;
            }
            let chunk_infos = self
                .index
                .chunk_infos_by_conn
                .get(&conn_id)
                .cloned()
                .unwrap_or_default();
            let connection = self.index.connections.get(&conn_id).unwrap();
            self.current = Some(ConnectionState {
                conn_id,
                decoder: MessageDecoder::new(connection.registry.root().clone()),
                pending_chunk_infos: chunk_infos.into_iter(),
                open_chunk: None,
            });
            return true;
        }
        false
    }

    fn open_next_chunk(&mut self) -> Result<bool> {
        let state = self.current.as_mut().expect("caller checked current.is_some()");
        let Some(chunk_info_idx) = state.pending_chunk_infos.next() else {
            return Ok(false);
        };
        let chunk_offset = self.index.chunk_infos[chunk_info_idx].chunk_pos;
        let raw = record::read_record_at(self.source, chunk_offset, self.index.max_header)?;
        let compressed = record::materialize_data(self.source, &raw)?;
        let chunk = Chunk::decode(&raw.header, compressed)?;
        state.open_chunk = Some(IoCursor::new(chunk.payload()));
        Ok(true)
    }

    fn scan_current_chunk(&mut self, conn_id: u32) -> ScanOutcome {
        loop {
            let state = self.current.as_mut().unwrap();
            let Some(chunk) = state.open_chunk.as_mut() else {
                return ScanOutcome::ChunkExhausted;
            };
            let rec = match record::read_next_record(chunk, self.index.max_header) {
                Ok(None) => return ScanOutcome::ChunkExhausted,
                Ok(Some(rec)) => rec,
                Err(e) => {
                    log::warn!("error reading chunk record for connection {conn_id}: {e}");
                    return ScanOutcome::ChunkExhausted;
                }
            };
            match message_data_for(chunk, &rec, conn_id) {
                Ok(None) => continue,
                Ok(Some(data)) => {
                    state.decoder.reset();
                    return match state.decoder.decode(data) {
                        Ok(_) => ScanOutcome::Yielded,
                        Err(e) => ScanOutcome::Error(e),
                    };
                }
                Err(e) => return ScanOutcome::Error(e),
            }
        }
    }
}

/// Materializes a record's data if it is a `MESSAGE_DATA` record for
/// `conn_id`; `Ok(None)` for anything else, so the caller keeps scanning.
fn message_data_for(chunk: &mut IoCursor<Bytes>, rec: &RawRecord, conn_id: u32) -> Result<Option<Bytes>> {
    if rec.header.op()? != record_types::OP_MESSAGE_DATA {
        return Ok(None);
    }
    if rec.header.u32("conn")? != conn_id {
        return Ok(None);
    }
    Ok(Some(record::materialize_data(chunk, rec)?))
}
