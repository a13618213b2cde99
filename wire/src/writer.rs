//! Big-endian byte writer over a borrowed buffer.

use crate::error::{WireError, WireResult};

/// A cursor writing big-endian primitives into a borrowed byte slice.
///
/// Callers size the buffer up front (typically via a byte-length pass) and
/// the writer fails with [`WireError::ShortBuffer`] rather than growing.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    /// Creates a writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a writer positioned at `offset`.
    pub fn at_offset(buf: &'a mut [u8], offset: usize) -> WireResult<Self> {
        if offset > buf.len() {
            return Err(WireError::ShortBuffer {
                needed: offset,
                available: buf.len(),
            });
        }
        Ok(Self { buf, pos: offset })
    }

    /// Returns the current write position.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of writable bytes left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> WireResult<()> {
        if self.remaining() < bytes.len() {
            return Err(WireError::ShortBuffer {
                needed: bytes.len(),
                available: self.remaining(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> WireResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> WireResult<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u16(&mut self, value: u16) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a 4-byte signed length prefix followed by the bytes.
    pub fn write_binary(&mut self, bytes: &[u8]) -> WireResult<()> {
        let len = i32::try_from(bytes.len()).map_err(|_| WireError::InvalidSize { size: -1 })?;
        self.write_i32(len)?;
        self.write_bytes(bytes)
    }
}
