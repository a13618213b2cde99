//! Big-endian byte reader over a borrowed buffer.

use crate::error::{LimitKind, WireError, WireResult};
use crate::limits::Limits;

/// A cursor reading big-endian primitives from a borrowed byte slice.
///
/// The reader never copies payload bytes; slice reads borrow from the
/// underlying buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a reader positioned at `offset`.
    pub fn at_offset(buf: &'a [u8], offset: usize) -> WireResult<Self> {
        if offset > buf.len() {
            return Err(WireError::ShortBuffer {
                needed: offset,
                available: buf.len(),
            });
        }
        Ok(Self { buf, pos: offset })
    }

    /// Returns the current read position.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` if every byte has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next byte without advancing.
    pub fn peek_u8(&self) -> WireResult<u8> {
        if self.remaining() < 1 {
            return Err(WireError::ShortBuffer {
                needed: 1,
                available: 0,
            });
        }
        Ok(self.buf[self.pos])
    }

    /// Reads `len` raw bytes, borrowing from the buffer.
    pub fn read_bytes(&mut self, len: usize) -> WireResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(WireError::ShortBuffer {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> WireResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> WireResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> WireResult<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i16(&mut self) -> WireResult<i16> {
        let bytes = self.read_bytes(2)?;
        Ok(i16::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> WireResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i32(&mut self) -> WireResult<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> WireResult<i64> {
        let bytes = self.read_bytes(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_f64(&mut self) -> WireResult<f64> {
        let bytes = self.read_bytes(8)?;
        Ok(f64::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a 4-byte signed length prefix followed by that many bytes.
    ///
    /// A negative length is [`WireError::InvalidSize`]; a length above
    /// `limits.max_length_bytes` is [`WireError::LimitExceeded`].
    pub fn read_binary(&mut self, limits: &Limits) -> WireResult<&'a [u8]> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(WireError::InvalidSize { size: len });
        }
        let len = len as usize;
        if len > limits.max_length_bytes {
            return Err(WireError::LimitExceeded {
                kind: LimitKind::LengthBytes,
                limit: limits.max_length_bytes,
                actual: len,
            });
        }
        self.read_bytes(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_primitives_big_endian() {
        let buf = [
            0x01, // u8
            0x00, 0x03, // i16
            0x00, 0x00, 0x00, 0x0A, // i32
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, // i64
        ];
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(reader.read_i16().unwrap(), 3);
        assert_eq!(reader.read_i32().unwrap(), 10);
        assert_eq!(reader.read_i64().unwrap(), -2);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_f64_roundtrip() {
        let buf = 1234.5f64.to_be_bytes();
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_f64().unwrap(), 1234.5);
    }

    #[test]
    fn short_buffer_reports_requested_and_available() {
        let buf = [0x00, 0x01];
        let mut reader = ByteReader::new(&buf);
        let err = reader.read_i32().unwrap_err();
        assert_eq!(
            err,
            WireError::ShortBuffer {
                needed: 4,
                available: 2
            }
        );
    }

    #[test]
    fn peek_does_not_advance() {
        let buf = [0x42, 0x43];
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.peek_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.pos(), 1);
    }

    #[test]
    fn read_binary_happy_path() {
        let buf = [0x00, 0x00, 0x00, 0x03, b'a', b'b', b'c'];
        let mut reader = ByteReader::new(&buf);
        let bytes = reader.read_binary(&Limits::for_testing()).unwrap();
        assert_eq!(bytes, b"abc");
        assert!(reader.is_empty());
    }

    #[test]
    fn read_binary_rejects_negative_length() {
        let buf = (-1i32).to_be_bytes();
        let mut reader = ByteReader::new(&buf);
        let err = reader.read_binary(&Limits::for_testing()).unwrap_err();
        assert_eq!(err, WireError::InvalidSize { size: -1 });
    }

    #[test]
    fn read_binary_enforces_length_limit() {
        let mut buf = vec![0u8; 4 + 5000];
        buf[0..4].copy_from_slice(&5000i32.to_be_bytes());
        let mut reader = ByteReader::new(&buf);
        let err = reader.read_binary(&Limits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            WireError::LimitExceeded {
                kind: LimitKind::LengthBytes,
                ..
            }
        ));
    }

    #[test]
    fn read_binary_truncated_payload() {
        let buf = [0x00, 0x00, 0x00, 0x05, b'a'];
        let mut reader = ByteReader::new(&buf);
        let err = reader.read_binary(&Limits::for_testing()).unwrap_err();
        assert_eq!(
            err,
            WireError::ShortBuffer {
                needed: 5,
                available: 1
            }
        );
    }

    #[test]
    fn at_offset_validates_bounds() {
        let buf = [0u8; 4];
        assert!(ByteReader::at_offset(&buf, 4).is_ok());
        assert!(ByteReader::at_offset(&buf, 5).is_err());
    }
}
