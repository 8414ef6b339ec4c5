//! `INDEX_DATA` (`op` = 0x04): per-connection message offsets within the
//! chunk that immediately preceded this record.
use bytes::Bytes;

use crate::cursor::Cursor;
use crate::error::{BagError, Result};
use crate::field_iter::HeaderMap;
use crate::timestamp::Timestamp;

/// One message's timestamp and intra-chunk byte offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexDataEntry {
    /// Time at which the message was recorded.
    pub time: Timestamp,
    /// Byte offset of the `MESSAGE_DATA` record within the decompressed
    /// chunk payload.
    pub offset: u32,
}

/// Structural index of messages for one connection within one chunk.
#[derive(Debug, Clone)]
pub struct IndexData {
    /// Record version; only version 1 is understood.
    pub ver: u32,
    /// Connection these entries belong to.
    pub conn_id: u32,
    /// Per-message offsets, in chunk order.
    pub entries: Vec<IndexDataEntry>,
}

impl IndexData {
    pub(crate) fn from_record(header: &HeaderMap, data: Bytes) -> Result<Self> {
        let ver = header.u32("ver")?;
        if ver != 1 {
            return Err(BagError::UnsupportedVersion(ver));
        }
        let conn_id = header.u32("conn")?;
        let count = header.u32("count")?;

        if data.len() as u32 != count * 12 {
            return Err(BagError::corrupt(
                None,
                format!(
                    "index_data declares {count} entries but carries {} bytes",
                    data.len()
                ),
            ));
        }
        let mut cursor = Cursor::new(data);
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let time = cursor.next_time()?;
            let offset = cursor.next_u32()?;
            entries.push(IndexDataEntry { time, offset });
        }

        Ok(Self {
            ver,
            conn_id,
            entries,
        })
    }
}
