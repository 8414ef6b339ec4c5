//! `BagFile`: the public facade tying the structural index, schema
//! registries, and message decoding together (§4.11).
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::bag_index::{BagIndex, ChunkMeta};
use crate::decode::Message;
use crate::error::{BagError, Result};
use crate::fingerprint;
use crate::msg_iter::MessageIterator;
use crate::record_types::{ChunkInfo, CompressionKind, Connection, IndexData};
use crate::timestamp::Timestamp;
use crate::topic_index::{self, MessageLocation};

const MAGIC: &[u8] = b"#ROSBAG V2.0\n";

/// Tuning knobs for [`BagFile::open_with`].
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    /// Promote a `chunk_count`/`conn_count` mismatch between the bag
    /// header and the scanned structure from a logged warning to a hard
    /// [`BagError::CountMismatch`].
    pub strict_counts: bool,
    /// Overrides the ≈100,000-byte sanity cap on a record's header size,
    /// for exotic producers that write unusually large connection headers.
    pub max_header_len: u32,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            strict_counts: false,
            max_header_len: crate::record::MAX_HEADER,
        }
    }
}

/// Per-topic summary, grouping connections that share a logical topic
/// name (a topic can have more than one connection if messages were
/// remapped at record time).
#[derive(Debug, Clone)]
pub struct TopicInfo {
    /// Logical topic name.
    pub name: String,
    /// Message type, as `package/Name`.
    pub type_name: String,
    /// 32-character lowercase hex md5sum.
    pub md5sum: String,
    /// Total messages recorded on this topic.
    pub message_count: u64,
    /// Number of distinct connections contributing to this topic.
    pub connection_count: u32,
}

/// A decoded ROS bag file, generalized over any seekable byte source.
pub struct BagFile<R> {
    source: R,
    index: Arc<BagIndex>,
    fingerprint: String,
    topic_indices: HashMap<String, Vec<MessageLocation>>,
}

impl BagFile<BufReader<File>> {
    /// Opens `path` with default [`OpenOptions`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Opens `path`, applying `options`.
    pub fn open_with<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let file = File::open(path).map_err(BagError::Io)?;
        Self::from_reader_with(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> BagFile<R> {
    /// Wraps an already-open seekable byte source, applying default
    /// [`OpenOptions`].
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_with(reader, OpenOptions::default())
    }

    /// Wraps an already-open seekable byte source, applying `options`.
    pub fn from_reader_with(mut reader: R, options: OpenOptions) -> Result<Self> {
        verify_magic(&mut reader)?;
        let index = Arc::new(BagIndex::build(&mut reader, options.strict_counts, options.max_header_len)?);
        let fingerprint = fingerprint::compute(&mut reader, &index)?;
        Ok(Self {
            source: reader,
            index,
            fingerprint,
            topic_indices: HashMap::new(),
        })
    }

    /// All connections, sorted by connection id.
    pub fn connections(&self) -> &[Connection] {
        &self.index.connections_ordered
    }

    /// One summary row per logical topic.
    pub fn topics(&self) -> Vec<TopicInfo> {
        let mut by_topic: HashMap<(&str, &str, &str), (u64, u32)> = HashMap::new();
        for conn in &self.index.connections_ordered {
            let key = (conn.storage_topic.as_str(), conn.type_name.as_str(), conn.md5sum.as_str());
            let count = self.message_count_for_connection(conn.id);
            let entry = by_topic.entry(key).or_insert((0, 0));
            entry.0 += count;
            entry.1 += 1;
        }
        by_topic
            .into_iter()
            .map(|((name, type_name, md5sum), (message_count, connection_count))| TopicInfo {
                name: name.to_string(),
                type_name: type_name.to_string(),
                md5sum: md5sum.to_string(),
                message_count,
                connection_count,
            })
            .collect()
    }

    /// Structural chunk metadata, in file order.
    pub fn chunks(&self) -> &[ChunkMeta] {
        &self.index.chunks
    }

    /// `CHUNK_INFO` records, in file order.
    pub fn chunk_infos(&self) -> &[ChunkInfo] {
        &self.index.chunk_infos
    }

    /// `INDEX_DATA` records, in file order.
    pub fn indexes(&self) -> &[IndexData] {
        &self.index.index_data
    }

    /// Total messages recorded in the bag.
    pub fn message_count(&self) -> u64 {
        self.index
            .chunk_infos
            .iter()
            .flat_map(|ci| &ci.entries)
            .map(|e| e.count as u64)
            .sum()
    }

    fn message_count_for_connection(&self, conn_id: u32) -> u64 {
        self.index
            .chunk_infos_for_connection(conn_id)
            .flat_map(|ci| ci.entries.iter())
            .filter(|e| e.conn_id == conn_id)
            .map(|e| e.count as u64)
            .sum()
    }

    /// Seconds between the earliest and latest observed message time.
    pub fn duration_seconds(&self) -> f64 {
        self.index.duration_secs()
    }

    /// Earliest observed message time, or `None` for an empty bag.
    pub fn start_time(&self) -> Option<Timestamp> {
        (!self.index.chunk_infos.is_empty() || !self.index.index_data.is_empty())
            .then_some(self.index.start_time)
    }

    /// Latest observed message time, or `None` for an empty bag.
    pub fn end_time(&self) -> Option<Timestamp> {
        (!self.index.chunk_infos.is_empty() || !self.index.index_data.is_empty())
            .then_some(self.index.end_time)
    }

    /// The bag's compression codec, taken from its first chunk (bags are
    /// written with one codec throughout); `none` for a bag with no
    /// chunks.
    pub fn compression_type(&self) -> CompressionKind {
        self.index
            .chunks
            .first()
            .map(|c| c.compression.clone())
            .unwrap_or(CompressionKind::None)
    }

    /// A stable structural fingerprint (§4.10), as lowercase hex.
    pub fn unique_identifier(&self) -> &str {
        &self.fingerprint
    }

    /// Lazily decodes every message on any connection whose `topic`
    /// matches one of `topics`.
    pub fn messages_on_topics(&mut self, topics: &[&str]) -> Result<MessageIterator<'_, R>> {
        let conn_ids = self
            .index
            .connections_ordered
            .iter()
            .filter(|c| topics.contains(&c.storage_topic.as_str()))
            .map(|c| c.id)
            .collect();
        Ok(MessageIterator::new(&mut self.source, self.index.clone(), conn_ids))
    }

    /// Lazily decodes every message on any connection of type `type_name`.
    pub fn messages_of_type(&mut self, type_name: &str) -> Result<MessageIterator<'_, R>> {
        let conn_ids = self
            .index
            .connections_ordered
            .iter()
            .filter(|c| c.type_name == type_name)
            .map(|c| c.id)
            .collect();
        Ok(MessageIterator::new(&mut self.source, self.index.clone(), conn_ids))
    }

    /// The first decoded message of type `type_name`, if any connection
    /// of that type has at least one message.
    pub fn first_message_of_type(&mut self, type_name: &str) -> Result<Option<Message>> {
        let mut iter = self.messages_of_type(type_name)?;
        match iter.next() {
            Some(Ok((_, message))) => Ok(Some(message.clone())),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    /// The `index`-th message on `topic`, building and caching the
    /// per-topic message index on first use (§4.9).
    pub fn message_on_topic_at_index(&mut self, topic: &str, index: usize) -> Result<Message> {
        if !self.topic_indices.contains_key(topic) {
            let conn_ids: Vec<u32> = self
                .index
                .connections_ordered
                .iter()
                .filter(|c| c.storage_topic == topic)
                .map(|c| c.id)
                .collect();
            let locations = topic_index::build(&mut self.source, &self.index, &conn_ids)?;
            self.topic_indices.insert(topic.to_string(), locations);
        }
        let locations = &self.topic_indices[topic];
        let location = *locations
            .get(index)
            .ok_or_else(|| BagError::IndexOutOfRange { index, count: locations.len() })?;
        let (conn_id, data) = topic_index::fetch(&mut self.source, location, self.index.max_header)?;
        let connection = self
            .index
            .connections
            .get(&conn_id)
            .ok_or_else(|| BagError::UnknownMessage(format!("connection {conn_id}")))?;
        crate::decode::builder::decode_message(connection.registry.root(), data)
    }
}

fn verify_magic<R: Read + Seek>(reader: &mut R) -> Result<()> {
    reader.seek(SeekFrom::Start(0)).map_err(BagError::Io)?;
    let mut buf = [0u8; 13];
    reader.read_exact(&mut buf).map_err(|_| BagError::NotABag)?;
    if buf != *MAGIC {
        return Err(BagError::NotABag);
    }
    Ok(())
}
