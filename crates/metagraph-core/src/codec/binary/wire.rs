//! Varint and byte-cursor primitives for the compact binary format.
//!
//! Integers travel as 7-bit little-endian groups with a continuation bit.
//! Signed values are reinterpreted as unsigned before grouping, so small
//! negatives take the full 10 bytes; the format favors the common case of
//! small non-negative indexes and counts.

use crate::error::MetadataError;

/// Largest encoded size of a 64-bit varint.
pub(crate) const MAX_VARINT_LEN: usize = 10;

/// Append a u64 as a 7-bit varint.
pub(crate) fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Append an i64 through unsigned reinterpretation.
pub(crate) fn write_varint_i64(buf: &mut Vec<u8>, value: i64) {
    write_varint(buf, value as u64);
}

///
/// ByteReader
///
/// Forward-only cursor over a decode buffer. Every read failure is a
/// corruption error; the stream is abandoned, never resynchronized.
///

pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn u8(&mut self) -> Result<u8, MetadataError> {
        let Some(byte) = self.data.get(self.pos) else {
            return Err(self.truncated("byte"));
        };
        self.pos += 1;
        Ok(*byte)
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], MetadataError> {
        let Some(slice) = self
            .pos
            .checked_add(len)
            .and_then(|end| self.data.get(self.pos..end))
        else {
            return Err(self.truncated("bytes"));
        };
        self.pos += len;
        Ok(slice)
    }

    pub fn varint(&mut self) -> Result<u64, MetadataError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        for _ in 0..MAX_VARINT_LEN {
            let byte = self.u8()?;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }

        Err(MetadataError::codec_corruption(format!(
            "varint longer than {MAX_VARINT_LEN} bytes at offset {}",
            self.pos
        )))
    }

    pub fn varint_i64(&mut self) -> Result<i64, MetadataError> {
        Ok(self.varint()? as i64)
    }

    /// A varint constrained to usize range, for counts and lengths.
    pub fn varint_len(&mut self) -> Result<usize, MetadataError> {
        let value = self.varint()?;
        usize::try_from(value).map_err(|_| {
            MetadataError::codec_corruption(format!("length {value} exceeds address space"))
        })
    }

    pub fn u64_le(&mut self) -> Result<u64, MetadataError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    pub fn f64_le(&mut self) -> Result<f64, MetadataError> {
        Ok(f64::from_bits(self.u64_le()?))
    }

    fn truncated(&self, what: &str) -> MetadataError {
        MetadataError::codec_corruption(format!(
            "unexpected end of stream reading {what} at offset {}",
            self.pos
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: u64) -> u64 {
        let mut buf = Vec::new();
        write_varint(&mut buf, value);
        ByteReader::new(&buf).varint().unwrap()
    }

    #[test]
    fn varint_round_trips_boundaries() {
        for value in [0, 1, 127, 128, 16_383, 16_384, u64::MAX] {
            assert_eq!(round_trip(value), value);
        }
    }

    #[test]
    fn small_values_stay_single_byte() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 127);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn negative_one_takes_ten_bytes() {
        let mut buf = Vec::new();
        write_varint_i64(&mut buf, -1);
        assert_eq!(buf.len(), MAX_VARINT_LEN);

        let decoded = ByteReader::new(&buf).varint_i64().unwrap();
        assert_eq!(decoded, -1);
    }

    #[test]
    fn truncated_stream_is_corruption() {
        let err = ByteReader::new(&[0x80]).varint().unwrap_err();
        assert_eq!(err.class, crate::error::ErrorClass::Corruption);
    }

    #[test]
    fn overlong_varint_is_corruption() {
        let bytes = [0x80u8; 11];
        assert!(ByteReader::new(&bytes).varint().is_err());
    }
}
