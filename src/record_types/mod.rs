//! Per-record-type parsing. Each submodule owns the `op` byte that
//! discriminates it (§3's record table) and a constructor that consumes an
//! already-parsed [`HeaderMap`][crate::field_iter::HeaderMap] plus the
//! record's materialized data bytes.

pub(crate) const OP_MESSAGE_DATA: u8 = 0x02;
pub(crate) const OP_BAG_HEADER: u8 = 0x03;
pub(crate) const OP_INDEX_DATA: u8 = 0x04;
pub(crate) const OP_CHUNK: u8 = 0x05;
pub(crate) const OP_CHUNK_INFO: u8 = 0x06;
pub(crate) const OP_CONNECTION: u8 = 0x07;

pub(crate) mod bag_header;
pub(crate) mod chunk;
pub(crate) mod chunk_info;
pub(crate) mod connection;
pub(crate) mod index_data;

pub(crate) use bag_header::BagHeaderRecord;
pub use chunk::{Chunk, CompressionKind};
pub use chunk_info::{ChunkInfo, ChunkInfoEntry};
pub use connection::Connection;
pub use index_data::{IndexData, IndexDataEntry};
