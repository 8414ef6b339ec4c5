//! `CHUNK_INFO` (`op` = 0x06): a high-level index of one `CHUNK` record,
//! listing which connections contributed how many messages.
use bytes::Bytes;

use crate::cursor::Cursor;
use crate::error::{BagError, Result};
use crate::field_iter::HeaderMap;
use crate::timestamp::Timestamp;

/// Number of messages a connection contributed to one chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkInfoEntry {
    /// Connection ID.
    pub conn_id: u32,
    /// Messages on this connection within the chunk.
    pub count: u32,
}

/// Structural index record for one `CHUNK`.
#[derive(Debug, Clone)]
pub struct ChunkInfo {
    /// Record version; only version 1 is understood.
    pub ver: u32,
    /// Offset of the associated `CHUNK` record, relative to the start of
    /// the file.
    pub chunk_pos: u64,
    /// Timestamp of the earliest message in the chunk.
    pub start_time: Timestamp,
    /// Timestamp of the latest message in the chunk.
    pub end_time: Timestamp,
    /// Per-connection message counts.
    pub entries: Vec<ChunkInfoEntry>,
}

impl ChunkInfo {
    pub(crate) fn from_record(header: &HeaderMap, data: Bytes) -> Result<Self> {
        let ver = header.u32("ver")?;
        if ver != 1 {
            return Err(BagError::UnsupportedVersion(ver));
        }
        let chunk_pos = header.i64("chunk_pos")?.max(0) as u64;
        let start_time = header.time("start_time")?;
        let end_time = header.time("end_time")?;
        let count = header.u32("count")?;

        if data.len() as u32 != count * 8 {
            return Err(BagError::corrupt(
                None,
                format!(
                    "chunk_info declares {count} entries but carries {} bytes",
                    data.len()
                ),
            ));
        }
        let mut cursor = Cursor::new(data);
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let conn_id = cursor.next_u32()?;
            let msg_count = cursor.next_u32()?;
            entries.push(ChunkInfoEntry {
                conn_id,
                count: msg_count,
            });
        }

        Ok(Self {
            ver,
            chunk_pos,
            start_time,
            end_time,
            entries,
        })
    }
}
