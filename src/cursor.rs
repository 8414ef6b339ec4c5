//! In-memory cursor over an already-materialized buffer.
//!
//! Record framing against the file itself goes through [`crate::record`];
//! this cursor is used once a buffer (a chunk's decompressed payload, a
//! header's field bytes, an index-data blob) is already in hand and needs
//! to be walked sequentially or seeked into.
use byteorder::{ByteOrder, LE};
use bytes::Bytes;

use crate::error::{BagError, Result};
use crate::timestamp::Timestamp;

/// A forward-and-seekable read position over a [`Bytes`] buffer.
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    buf: Bytes,
    pos: u64,
}

impl Cursor {
    pub(crate) fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes remaining after the current position.
    pub(crate) fn left(&self) -> u64 {
        self.buf.len() as u64 - self.pos
    }

    pub(crate) fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.buf.len() as u64 {
            return Err(BagError::corrupt(pos, "seek past end of buffer"));
        }
        self.pos = pos;
        Ok(())
    }

    fn take(&mut self, n: u64) -> Result<Bytes> {
        if self.left() < n {
            return Err(BagError::corrupt(
                self.pos,
                format!("expected {n} more bytes, {} left", self.left()),
            ));
        }
        let start = self.pos as usize;
        let end = start + n as usize;
        self.pos += n;
        Ok(self.buf.slice(start..end))
    }

    pub(crate) fn next_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn next_u32(&mut self) -> Result<u32> {
        Ok(LE::read_u32(&self.take(4)?))
    }

    pub(crate) fn next_i16(&mut self) -> Result<i16> {
        Ok(LE::read_i16(&self.take(2)?))
    }

    pub(crate) fn next_u16(&mut self) -> Result<u16> {
        Ok(LE::read_u16(&self.take(2)?))
    }

    pub(crate) fn next_i32(&mut self) -> Result<i32> {
        Ok(LE::read_i32(&self.take(4)?))
    }

    pub(crate) fn next_u64(&mut self) -> Result<u64> {
        Ok(LE::read_u64(&self.take(8)?))
    }

    pub(crate) fn next_i64(&mut self) -> Result<i64> {
        Ok(LE::read_i64(&self.take(8)?))
    }

    pub(crate) fn next_f32(&mut self) -> Result<f32> {
        Ok(LE::read_f32(&self.take(4)?))
    }

    pub(crate) fn next_f64(&mut self) -> Result<f64> {
        Ok(LE::read_f64(&self.take(8)?))
    }

    pub(crate) fn next_time(&mut self) -> Result<Timestamp> {
        let sec = self.next_i32()?;
        let nsec = self.next_i32()?;
        Ok(Timestamp::from_sec_nsec(sec, nsec))
    }

    /// Length-prefixed (`i32` byte count) UTF-8 string.
    pub(crate) fn next_string(&mut self) -> Result<String> {
        let n = self.next_u32()?;
        let bytes = self.take(n as u64)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| BagError::corrupt(self.pos, format!("invalid utf-8 in string: {e}")))
    }

    pub(crate) fn next_bytes(&mut self, n: u64) -> Result<Bytes> {
        self.take(n)
    }

    /// Reads a `(i32 len)(bytes)` chunk, the framing used for record
    /// headers and record data.
    pub(crate) fn next_chunk(&mut self) -> Result<Bytes> {
        let n = self.next_u32()?;
        self.take(n as u64)
    }

    pub(crate) fn position(&self) -> u64 {
        self.pos
    }

    pub(crate) fn remaining_slice(&self) -> Bytes {
        self.buf.slice(self.pos as usize..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_primitives_little_endian() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&42u32.to_le_bytes());
        buf.extend_from_slice(&(-7i32).to_le_bytes());
        let mut c = Cursor::new(Bytes::from(buf));
        assert_eq!(c.next_u32().unwrap(), 42);
        assert_eq!(c.next_i32().unwrap(), -7);
        assert_eq!(c.left(), 0);
    }

    #[test]
    fn errors_on_short_read() {
        let mut c = Cursor::new(Bytes::from(vec![1, 2, 3]));
        assert!(c.next_u32().is_err());
    }

    #[test]
    fn seek_rejects_out_of_bounds() {
        let mut c = Cursor::new(Bytes::from(vec![1, 2, 3]));
        assert!(c.seek(10).is_err());
        assert!(c.seek(2).is_ok());
    }
}
