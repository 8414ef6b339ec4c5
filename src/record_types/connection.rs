//! `CONNECTION` (`op` = 0x07): declares a topic's message type and carries
//! its embedded textual schema.
use bytes::Bytes;

use crate::error::{BagError, Result};
use crate::field_iter::HeaderMap;
use crate::schema::SchemaRegistry;

/// A logical stream of same-typed messages on a single topic.
///
/// Two topic fields exist, `storage_topic` and `topic`, because messages
/// can be written to the bag on a topic different from the one they were
/// originally published on (remapping at record time).
#[derive(Debug, Clone)]
pub struct Connection {
    /// Unique connection ID within the file.
    pub id: u32,
    /// Topic the record was stored under.
    pub storage_topic: String,
    /// Topic the publisher believed it was sending on.
    pub topic: String,
    /// Message type, as `package/Name`.
    pub type_name: String,
    /// 32-character lowercase hex MD5 sum advertised by the writer.
    pub md5sum: String,
    /// Full text of the message definition, including dependency blocks.
    pub message_definition: String,
    /// Name of the node that sent the data, if recorded.
    pub caller_id: Option<String>,
    /// Whether the publisher was in latching mode.
    pub latching: Option<bool>,
    /// Resolved schema tree rooted at `type_name`.
    pub registry: SchemaRegistry,
}

impl Connection {
    pub(crate) fn from_record(header: &HeaderMap, data: Bytes) -> Result<Self> {
        let id = header.u32("conn")?;
        let storage_topic = header.string("topic")?;

        let nested = HeaderMap::parse(data)?;
        let topic = nested.string("topic")?;
        let type_name = nested.string("type")?;
        let md5sum = nested.string("md5sum")?;
        if md5sum.len() != 32 || !md5sum.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BagError::corrupt(
                None,
                format!("connection {id} has malformed md5sum '{md5sum}'"),
            ));
        }
        let message_definition = nested.string("message_definition")?;
        let caller_id = nested.string("callerid").ok();
        let latching = match nested.bytes("latching") {
            Ok(v) => match v.first() {
                Some(b'1') => Some(true),
                Some(b'0') => Some(false),
                _ => return Err(BagError::corrupt(None, "invalid 'latching' field value")),
            },
            Err(_) => None,
        };

        let registry = SchemaRegistry::build(&type_name, &message_definition)?;

        Ok(Self {
            id,
            storage_topic,
            topic,
            type_name,
            md5sum,
            message_definition,
            caller_id,
            latching,
            registry,
        })
    }
}
