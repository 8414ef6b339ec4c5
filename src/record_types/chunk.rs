//! `CHUNK` (`op` = 0x05): a bulk, optionally compressed container of
//! `CONNECTION`/`MESSAGE_DATA` records.
use bytes::{Buf, Bytes};

use crate::error::{BagError, Result};
use crate::field_iter::HeaderMap;

/// Compression applied to a chunk's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionKind {
    /// No compression; the payload is the raw record stream.
    None,
    /// Standard bzip2 stream.
    Bz2,
    /// LZ4 frame format.
    Lz4,
    /// A token this decoder does not recognize. Per §4.3, callers must not
    /// assume the associated payload is parseable message data.
    Unknown(String),
}

impl CompressionKind {
    pub(crate) fn from_token(token: &str) -> Self {
        match token {
            "none" => CompressionKind::None,
            "bz2" => CompressionKind::Bz2,
            "lz4" => CompressionKind::Lz4,
            other => CompressionKind::Unknown(other.to_string()),
        }
    }

    /// The wire token, for display and for [`crate::BagFile::compression_type`].
    pub fn as_str(&self) -> &str {
        match self {
            CompressionKind::None => "none",
            CompressionKind::Bz2 => "bz2",
            CompressionKind::Lz4 => "lz4",
            CompressionKind::Unknown(s) => s.as_str(),
        }
    }
}

/// A chunk's decompressed payload: a stream of `CONNECTION`/`MESSAGE_DATA`
/// records concatenated without padding.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Compression the chunk was stored with.
    pub compression: CompressionKind,
    pub(crate) data: Bytes,
}

impl Chunk {
    pub(crate) fn decode(header: &HeaderMap, compressed: Bytes) -> Result<Self> {
        let compression = CompressionKind::from_token(&header.string("compression")?);
        let size = header.u32("size")?;
        let data = decompress(&compression, compressed, size)?;
        Ok(Self { compression, data })
    }

    /// The decompressed payload, ready for sequential record scanning.
    pub(crate) fn payload(&self) -> Bytes {
        self.data.clone()
    }
}

fn decompress(kind: &CompressionKind, data: Bytes, expected_size: u32) -> Result<Bytes> {
    let decompressed = match kind {
        CompressionKind::None => data,
        CompressionKind::Bz2 => {
            let mut out = Vec::with_capacity(expected_size as usize);
            let mut decompressor = bzip2::Decompress::new(false);
            decompressor
                .decompress_vec(&data, &mut out)
                .map_err(|e| BagError::DecompressionFailure(format!("bz2: {e}")))?;
            Bytes::from(out)
        }
        CompressionKind::Lz4 => {
            let mut decoder = lz4::Decoder::new(data.reader())
                .map_err(|e| BagError::DecompressionFailure(format!("lz4: {e}")))?;
            let mut out = Vec::with_capacity(expected_size as usize);
            std::io::copy(&mut decoder, &mut out)
                .map_err(|e| BagError::DecompressionFailure(format!("lz4: {e}")))?;
            Bytes::from(out)
        }
        CompressionKind::Unknown(token) => {
            log::warn!("unknown chunk compression token '{token}'; treating payload as opaque");
            data
        }
    };
    if !matches!(kind, CompressionKind::Unknown(_)) && decompressed.len() != expected_size as usize
    {
        return Err(BagError::corrupt(
            None,
            format!(
                "chunk declared size {expected_size} but decompressed to {}",
                decompressed.len()
            ),
        ));
    }
    Ok(decompressed)
}
