//! Typed error taxonomy for the bag decoder.
use std::io;

/// All failure modes the decoder can report.
///
/// Every variant is returned at the call site that first observed the
/// problem; nothing is retried internally except the two recoveries
/// documented on [`crate::msg_iter::MessageIterator`].
#[derive(Debug, thiserror::Error)]
pub enum BagError {
    /// The first 13 bytes of the file were not `#ROSBAG V2.0\n`.
    #[error("not a rosbag v2.0 file")]
    NotABag,

    /// `index_pos == 0` in the bag header: the file was not closed cleanly
    /// and needs to be re-indexed before it can be read.
    #[error("bag is unindexed (index_pos == 0); re-index required")]
    Unindexed,

    /// Oversized header/field, unexpected op code, truncated stream, or a
    /// data-length mismatch.
    #[error("corrupt bag at offset {offset:?}: {reason}")]
    Corrupt {
        /// Byte offset at which the corruption was detected, if known.
        offset: Option<u64>,
        /// Human-readable description.
        reason: String,
    },

    /// A message schema could not be parsed: a field line did not match the
    /// grammar, or the dependency list failed to converge.
    #[error("invalid message definition: {0}")]
    InvalidDefinition(String),

    /// A schema referenced a nested type absent from its registry.
    #[error("unknown message type: {0}")]
    UnknownMessage(String),

    /// A header accessor asked for a key that was not present.
    #[error("unknown header field: {0}")]
    UnknownField(String),

    /// A decoded message field was queried before a message was decoded.
    #[error("field not yet initialized: {0}")]
    UninitializedField(String),

    /// A numeric index exceeded the per-topic message count.
    #[error("index {index} out of range (topic has {count} messages)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of messages actually indexed for the topic.
        count: usize,
    },

    /// The compression codec reported an error, or produced a buffer whose
    /// length did not match the chunk header's declared `size`.
    #[error("decompression failure: {0}")]
    DecompressionFailure(String),

    /// `bag_header.chunk_count`/`conn_count` disagreed with what the scan
    /// actually found, and [`crate::OpenOptions::strict_counts`] was set.
    #[error("record count mismatch: {0}")]
    CountMismatch(String),

    /// A `ver` field on an `INDEX_DATA`/`CHUNK_INFO` record named a version
    /// this decoder does not understand (only version 1 is supported).
    #[error("unsupported record version: {0}")]
    UnsupportedVersion(u32),

    /// Underlying I/O error (read/seek past end of stream, permissions, ...).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BagError>;

impl BagError {
    pub(crate) fn corrupt(offset: impl Into<Option<u64>>, reason: impl Into<String>) -> Self {
        BagError::Corrupt {
            offset: offset.into(),
            reason: reason.into(),
        }
    }
}
