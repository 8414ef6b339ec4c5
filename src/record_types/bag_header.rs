//! `BAG_HEADER` (`op` = 0x03): the file's lone top-of-file record.
use crate::error::Result;
use crate::field_iter::HeaderMap;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BagHeaderRecord {
    /// Offset of the first record after the chunk section.
    pub(crate) index_pos: u64,
    /// Number of unique connections the writer expected.
    pub(crate) conn_count: u32,
    /// Number of `CHUNK`/`CHUNK_INFO` records the writer expected.
    pub(crate) chunk_count: u32,
}

impl BagHeaderRecord {
    pub(crate) fn from_header(header: &HeaderMap) -> Result<Self> {
        Ok(Self {
            index_pos: header.i64("index_pos")?.max(0) as u64,
            conn_count: header.u32("conn_count")?,
            chunk_count: header.u32("chunk_count")?,
        })
    }
}
