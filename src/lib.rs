//! Read-only decoder for ROS bag v2.0 log files.
//!
//! A bag file is a framed record stream: a `BAG_HEADER`, then chunks of
//! compressed `CONNECTION`/`MESSAGE_DATA` records, then an index section
//! of `CONNECTION` and `CHUNK_INFO` records written when the file was
//! closed. [`BagFile::open`] scans that structure once into memory; from
//! there, topics, connections, and messages can be read back without
//! re-scanning.
//!
//! # Example
//!
//! ```no_run
//! use bagreader::BagFile;
//!
//! # fn main() -> Result<(), bagreader::BagError> {
//! let mut bag = BagFile::open("dataset.bag")?;
//! for topic in bag.topics() {
//!     println!("{} ({} messages)", topic.name, topic.message_count);
//! }
//!
//! let mut messages = bag.messages_on_topics(&["/imu"])?;
//! while let Some(result) = messages.next() {
//!     let (connection, message) = result?;
//!     println!("{}: {:?}", connection.topic, message.type_name());
//! }
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs, rust_2018_idioms)]

mod bag_file;
mod bag_index;
mod cursor;
mod decode;
mod error;
mod field_iter;
mod fingerprint;
mod msg_iter;
mod record;
mod record_types;
mod schema;
mod timestamp;
mod topic_index;

pub use bag_file::{BagFile, OpenOptions, TopicInfo};
pub use decode::{ArrayValue, Field, Message, OneByteArray};
pub use error::BagError;
pub use msg_iter::MessageIterator;
pub use record_types::{Chunk, ChunkInfo, ChunkInfoEntry, CompressionKind, Connection, IndexData, IndexDataEntry};
pub use schema::{ArrayLen, ConstantValue, FieldSpec, PrimitiveKind, Schema, SchemaRegistry};
pub use timestamp::Timestamp;

pub use bag_index::ChunkMeta;
