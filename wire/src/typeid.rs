//! Wire type tags.

use crate::error::WireError;

/// Numeric tag identifying the wire shape of an encoded value.
///
/// The tag values are the binary-compatibility contract with peer
/// implementations and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    /// End-of-struct marker, never a value tag.
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    /// Strings and raw binary share one tag.
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TypeId {
    /// Parses a type id from a raw byte.
    pub const fn from_byte(byte: u8) -> Result<Self, WireError> {
        match byte {
            0 => Ok(Self::Stop),
            1 => Ok(Self::Void),
            2 => Ok(Self::Bool),
            3 => Ok(Self::Byte),
            4 => Ok(Self::Double),
            6 => Ok(Self::I16),
            8 => Ok(Self::I32),
            10 => Ok(Self::I64),
            11 => Ok(Self::String),
            12 => Ok(Self::Struct),
            13 => Ok(Self::Map),
            14 => Ok(Self::Set),
            15 => Ok(Self::List),
            found => Err(WireError::InvalidTypeId { found }),
        }
    }

    /// Returns the raw tag byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Returns the static encoded width for fixed-width tags.
    ///
    /// Variable-width composites (string, struct, map, set, list) and the
    /// STOP marker return `None`.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Void => Some(0),
            Self::Bool | Self::Byte => Some(1),
            Self::I16 => Some(2),
            Self::I32 => Some(4),
            Self::Double | Self::I64 => Some(8),
            Self::Stop | Self::String | Self::Struct | Self::Map | Self::Set | Self::List => None,
        }
    }
}
