//! `RecordFramer`: walks a seekable byte source one `(header_len, header,
//! data_len, data)` frame at a time, without reading the data region
//! unless the caller asks for it.
use std::io::{self, Read, Seek, SeekFrom};

use bytes::Bytes;

use crate::error::{BagError, Result};
use crate::field_iter::HeaderMap;

/// Sanity cap on a record's total header size (spec: ≈100,000 bytes).
pub(crate) const MAX_HEADER: u32 = 100_000;

/// A framed record whose header has been parsed but whose data has not
/// been read yet.
#[derive(Debug)]
pub(crate) struct RawRecord {
    pub(crate) header: HeaderMap,
    pub(crate) data_len: u32,
    pub(crate) data_offset: u64,
    /// Offset of the `header_len` field that opened this record.
    pub(crate) record_offset: u64,
}

/// Reads into `buf`, returning the number of bytes obtained before a clean
/// EOF. Only a `0`-byte result is a clean EOF; anything else short of a
/// full read is a truncated stream.
fn fill_or_eof<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match source.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

fn io_to_corrupt(e: io::Error, offset: u64) -> BagError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        BagError::corrupt(offset, "truncated record")
    } else {
        BagError::Io(e)
    }
}

/// Reads the next top-level frame, or `Ok(None)` on a clean end of stream.
///
/// Implements the legacy `header_len == 0` skip-forward: per the resolved
/// open question, this is logged and treated as empty padding rather than
/// a fatal corruption, and framing resumes at the following position (a
/// plain loop, not recursion).
///
/// `max_header` overrides the sanity cap on total header size; callers use
/// [`MAX_HEADER`] unless [`crate::OpenOptions::max_header_len`] was set.
pub(crate) fn read_next_record<R: Read + Seek>(source: &mut R, max_header: u32) -> Result<Option<RawRecord>> {
    loop {
        let record_offset = source.stream_position()?;

        let mut len_buf = [0u8; 4];
        let n = fill_or_eof(source, &mut len_buf).map_err(BagError::Io)?;
        if n == 0 {
            return Ok(None);
        }
        if n < 4 {
            return Err(BagError::corrupt(record_offset, "truncated record header length"));
        }
        let header_len = i32::from_le_bytes(len_buf);

        if header_len == 0 {
            log::warn!("legacy header_len == 0 marker at offset {record_offset}; skipping");
            continue;
        }
        if header_len < 0 || header_len as u32 > max_header {
            return Err(BagError::corrupt(
                record_offset,
                format!("invalid header length {header_len}"),
            ));
        }
        let header_len = header_len as u32;

        let mut header_buf = vec![0u8; header_len as usize];
        source
            .read_exact(&mut header_buf)
            .map_err(|e| io_to_corrupt(e, record_offset))?;
        let header = HeaderMap::parse(Bytes::from(header_buf))?;

        let mut data_len_buf = [0u8; 4];
        source
            .read_exact(&mut data_len_buf)
            .map_err(|e| io_to_corrupt(e, record_offset))?;
        let data_len = i32::from_le_bytes(data_len_buf);
        if data_len < 0 {
            return Err(BagError::corrupt(
                record_offset,
                format!("negative data length {data_len}"),
            ));
        }
        let data_len = data_len as u32;
        let data_offset = source.stream_position()?;
        source.seek(SeekFrom::Current(data_len as i64))?;

        return Ok(Some(RawRecord {
            header,
            data_len,
            data_offset,
            record_offset,
        }));
    }
}

/// Seeks to `offset` and reads exactly one record there. Used for random
/// access via `chunk_pos` and `INDEX_DATA` offsets.
pub(crate) fn read_record_at<R: Read + Seek>(source: &mut R, offset: u64, max_header: u32) -> Result<RawRecord> {
    source.seek(SeekFrom::Start(offset))?;
    read_next_record(source, max_header)?
        .ok_or_else(|| BagError::corrupt(offset, "expected a record at this offset, found EOF"))
}

/// Reads a record's `data_len` data bytes. May be called repeatedly.
pub(crate) fn materialize_data<R: Read + Seek>(source: &mut R, rec: &RawRecord) -> Result<Bytes> {
    source.seek(SeekFrom::Start(rec.data_offset))?;
    let mut buf = vec![0u8; rec.data_len as usize];
    source
        .read_exact(&mut buf)
        .map_err(|e| io_to_corrupt(e, rec.data_offset))?;
    Ok(Bytes::from(buf))
}
