//! In-memory representations of 64-bit wire integers.
//!
//! The wire always carries 8 big-endian bytes; the schema's `codec.repr`
//! annotation picks which of these shapes the decoded value takes. Encoding
//! is lenient: any shape converts to the wire regardless of the declared
//! representation, so values survive schema annotation changes.

use crate::error::{CodecError, CodecResult};
use schema::I64Repr;

/// A 64-bit integer in one of its schema-selectable shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum I64Value {
    /// Opaque big-endian bytes.
    Raw([u8; 8]),
    /// High and low 32-bit halves.
    Pair { hi: i32, lo: u32 },
    /// 16 lowercase hex characters.
    Hex(String),
    /// 8-byte vector.
    Bytes(Vec<u8>),
    /// Native signed integer.
    Int(i64),
    /// Milliseconds since the epoch; the wire keeps whole seconds, scaled
    /// back to milliseconds.
    Timestamp(i64),
}

impl I64Value {
    /// Converts any shape to the signed 64-bit wire value.
    pub fn to_wire(&self) -> CodecResult<i64> {
        match self {
            Self::Raw(bytes) => Ok(i64::from_be_bytes(*bytes)),
            Self::Pair { hi, lo } => Ok((i64::from(*hi) << 32) | i64::from(*lo)),
            Self::Hex(text) => {
                if text.len() != 16 {
                    return Err(CodecError::InvalidI64 {
                        detail: format!("hex string has {} characters, expected 16", text.len()),
                    });
                }
                u64::from_str_radix(text, 16)
                    .map(|raw| raw as i64)
                    .map_err(|_| CodecError::InvalidI64 {
                        detail: format!("`{text}` is not hexadecimal"),
                    })
            }
            Self::Bytes(bytes) => {
                let array: [u8; 8] =
                    bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| CodecError::InvalidI64 {
                            detail: format!("byte shape has {} bytes, expected 8", bytes.len()),
                        })?;
                Ok(i64::from_be_bytes(array))
            }
            Self::Int(value) => Ok(*value),
            // Sub-second precision is dropped before the value hits the wire.
            Self::Timestamp(millis) => Ok((millis / 1000) * 1000),
        }
    }

    /// Builds the declared shape from a wire value.
    #[must_use]
    pub fn from_wire(raw: i64, repr: I64Repr) -> Self {
        match repr {
            I64Repr::Raw => Self::Raw(raw.to_be_bytes()),
            I64Repr::Pair => Self::Pair {
                hi: (raw >> 32) as i32,
                lo: raw as u32,
            },
            I64Repr::Hex => Self::Hex(format!("{:016x}", raw as u64)),
            I64Repr::Bytes => Self::Bytes(raw.to_be_bytes().to_vec()),
            I64Repr::Int => Self::Int(raw),
            I64Repr::Timestamp => Self::Timestamp(raw),
        }
    }
}
