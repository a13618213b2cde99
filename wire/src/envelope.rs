//! RPC message envelope framing.
//!
//! Two framings share the wire, distinguished by the high bit of the first
//! byte:
//!
//! - **strict**: `word:2` = `0x8000 | (version << 3) | type`, then
//!   `nameLen:4, name, seqId:4`. Only version 1 is recognized.
//! - **legacy**: `nameLen:4, name, type:1, seqId:4`. A legacy name length is
//!   non-negative, so its first byte never has the high bit set.
//!
//! The body that follows the header is struct-encoded by the codec layer
//! against the schema's argument or result type for the named function.

use crate::error::{EnvelopeError, WireError};
use crate::limits::Limits;
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// The only strict envelope version currently recognized.
pub const STRICT_VERSION: u16 = 1;

const STRICT_FLAG: u16 = 0x8000;
const TYPE_MASK: u16 = 0x0007;
const VERSION_SHIFT: u16 = 3;

/// RPC message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
    Oneway = 4,
}

impl MessageType {
    /// Parses a message type from its wire value.
    pub const fn from_byte(byte: u8) -> Result<Self, EnvelopeError> {
        match byte {
            1 => Ok(Self::Call),
            2 => Ok(Self::Reply),
            3 => Ok(Self::Exception),
            4 => Ok(Self::Oneway),
            found => Err(EnvelopeError::UnrecognizedType { found }),
        }
    }

    /// Returns the raw wire value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A decoded message envelope header (framing only, no body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Function name the message addresses.
    pub name: String,
    pub message_type: MessageType,
    /// Caller-chosen correlation id, echoed by replies.
    pub seq_id: i32,
    /// Whether the strict framing is used. Encoders should prefer strict;
    /// legacy exists for compatibility with old peers.
    pub strict: bool,
}

impl MessageHeader {
    /// Creates a strict-framed header.
    #[must_use]
    pub fn strict(name: String, message_type: MessageType, seq_id: i32) -> Self {
        Self {
            name,
            message_type,
            seq_id,
            strict: true,
        }
    }

    /// Creates a legacy-framed header.
    #[must_use]
    pub fn legacy(name: String, message_type: MessageType, seq_id: i32) -> Self {
        Self {
            name,
            message_type,
            seq_id,
            strict: false,
        }
    }

    /// Returns the encoded header length in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        if self.strict {
            2 + 4 + self.name.len() + 4
        } else {
            4 + self.name.len() + 1 + 4
        }
    }
}

/// Reads a message envelope header, leaving the reader at the body start.
pub fn read_message_header(
    reader: &mut ByteReader<'_>,
    limits: &Limits,
) -> Result<MessageHeader, EnvelopeError> {
    let first = reader.peek_u8().map_err(EnvelopeError::Wire)?;
    if first & 0x80 != 0 {
        read_strict_header(reader, limits)
    } else {
        read_legacy_header(reader, limits)
    }
}

fn read_strict_header(
    reader: &mut ByteReader<'_>,
    limits: &Limits,
) -> Result<MessageHeader, EnvelopeError> {
    let word = reader.read_u16()?;
    let version = (word & !STRICT_FLAG) >> VERSION_SHIFT;
    if version != STRICT_VERSION {
        return Err(EnvelopeError::UnrecognizedVersion { found: version });
    }
    let message_type = MessageType::from_byte((word & TYPE_MASK) as u8)?;
    let name = read_name(reader, limits)?;
    let seq_id = reader.read_i32()?;
    Ok(MessageHeader {
        name,
        message_type,
        seq_id,
        strict: true,
    })
}

fn read_legacy_header(
    reader: &mut ByteReader<'_>,
    limits: &Limits,
) -> Result<MessageHeader, EnvelopeError> {
    let name = read_name(reader, limits)?;
    let message_type = MessageType::from_byte(reader.read_u8()?)?;
    let seq_id = reader.read_i32()?;
    Ok(MessageHeader {
        name,
        message_type,
        seq_id,
        strict: false,
    })
}

fn read_name(reader: &mut ByteReader<'_>, limits: &Limits) -> Result<String, EnvelopeError> {
    let bytes = reader.read_binary(limits)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| EnvelopeError::InvalidName)
}

/// Writes a message envelope header.
pub fn write_message_header(
    header: &MessageHeader,
    writer: &mut ByteWriter<'_>,
) -> Result<(), EnvelopeError> {
    if header.strict {
        let word = STRICT_FLAG
            | (STRICT_VERSION << VERSION_SHIFT)
            | u16::from(header.message_type.as_byte());
        writer.write_u16(word)?;
        write_name(header, writer)?;
        writer.write_i32(header.seq_id)?;
    } else {
        write_name(header, writer)?;
        writer.write_u8(header.message_type.as_byte())?;
        writer.write_i32(header.seq_id)?;
    }
    Ok(())
}

fn write_name(header: &MessageHeader, writer: &mut ByteWriter<'_>) -> Result<(), WireError> {
    writer.write_binary(header.name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(header: &MessageHeader) -> MessageHeader {
        let mut buf = vec![0u8; header.encoded_len()];
        let mut writer = ByteWriter::new(&mut buf);
        write_message_header(header, &mut writer).unwrap();
        assert_eq!(writer.pos(), header.encoded_len());
        let mut reader = ByteReader::new(&buf);
        let decoded = read_message_header(&mut reader, &Limits::for_testing()).unwrap();
        assert!(reader.is_empty());
        decoded
    }

    #[test]
    fn strict_header_roundtrip() {
        let header = MessageHeader::strict("ping".to_owned(), MessageType::Call, 7);
        assert_eq!(roundtrip(&header), header);
    }

    #[test]
    fn legacy_header_roundtrip() {
        let header = MessageHeader::legacy("ping".to_owned(), MessageType::Reply, -3);
        assert_eq!(roundtrip(&header), header);
    }

    #[test]
    fn strict_header_golden_bytes() {
        let header = MessageHeader::strict("ab".to_owned(), MessageType::Call, 1);
        let mut buf = vec![0u8; header.encoded_len()];
        write_message_header(&header, &mut ByteWriter::new(&mut buf)).unwrap();
        // 0x8000 | (1 << 3) | 1 = 0x8009
        assert_eq!(
            buf,
            [0x80, 0x09, 0x00, 0x00, 0x00, 0x02, b'a', b'b', 0x00, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn legacy_header_golden_bytes() {
        let header = MessageHeader::legacy("ab".to_owned(), MessageType::Exception, 2);
        let mut buf = vec![0u8; header.encoded_len()];
        write_message_header(&header, &mut ByteWriter::new(&mut buf)).unwrap();
        assert_eq!(
            buf,
            [0x00, 0x00, 0x00, 0x02, b'a', b'b', 0x03, 0x00, 0x00, 0x00, 0x02]
        );
    }

    #[test]
    fn rejects_unrecognized_strict_version() {
        // 0x8000 | (2 << 3) | 1: version 2 is not recognized.
        let mut buf = vec![0x80, 0x11];
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        let err = read_message_header(&mut ByteReader::new(&buf), &Limits::for_testing())
            .unwrap_err();
        assert_eq!(err, EnvelopeError::UnrecognizedVersion { found: 2 });
    }

    #[test]
    fn rejects_unrecognized_message_type() {
        // Strict, version 1, type 7 (unknown).
        let buf = [0x80, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
        let err = read_message_header(&mut ByteReader::new(&buf), &Limits::for_testing())
            .unwrap_err();
        assert_eq!(err, EnvelopeError::UnrecognizedType { found: 7 });
    }

    #[test]
    fn rejects_legacy_unknown_type_byte() {
        let buf = [0x00, 0x00, 0x00, 0x01, b'f', 0x09, 0x00, 0x00, 0x00, 0x01];
        let err = read_message_header(&mut ByteReader::new(&buf), &Limits::for_testing())
            .unwrap_err();
        assert_eq!(err, EnvelopeError::UnrecognizedType { found: 9 });
    }

    #[test]
    fn truncated_header_is_short_buffer() {
        let buf = [0x80];
        let err = read_message_header(&mut ByteReader::new(&buf), &Limits::for_testing())
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::Wire(WireError::ShortBuffer { .. })));
    }

    #[test]
    fn rejects_non_utf8_name() {
        let buf = [0x00, 0x00, 0x00, 0x01, 0xFF, 0x01, 0x00, 0x00, 0x00, 0x01];
        let err = read_message_header(&mut ByteReader::new(&buf), &Limits::for_testing())
            .unwrap_err();
        assert_eq!(err, EnvelopeError::InvalidName);
    }

    #[test]
    fn message_type_wire_values() {
        assert_eq!(MessageType::Call.as_byte(), 1);
        assert_eq!(MessageType::Reply.as_byte(), 2);
        assert_eq!(MessageType::Exception.as_byte(), 3);
        assert_eq!(MessageType::Oneway.as_byte(), 4);
    }
}
