//! Error types for wire-level operations.

use std::fmt;

/// Result type for wire-level operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised by primitive reads/writes and the skip dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// Buffer too small for a required read or write.
    ShortBuffer { needed: usize, available: usize },

    /// Type id byte outside the known set.
    InvalidTypeId { found: u8 },

    /// Negative or implausible length prefix.
    InvalidSize { size: i32 },

    /// Recursion depth limit exceeded while walking nested values.
    DepthExceeded { limit: usize },

    /// A configured limit was exceeded.
    LimitExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    LengthBytes,
    ContainerItems,
}

/// Errors raised while framing or parsing message envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnvelopeError {
    /// Strict envelope carried an unrecognized version number.
    UnrecognizedVersion { found: u16 },

    /// Envelope carried an unrecognized message type value.
    UnrecognizedType { found: u8 },

    /// Message name bytes were not valid UTF-8.
    InvalidName,

    /// Underlying wire error.
    Wire(WireError),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortBuffer { needed, available } => {
                write!(f, "short buffer: need {needed} bytes, have {available}")
            }
            Self::InvalidTypeId { found } => {
                write!(f, "invalid typeid: 0x{found:02X}")
            }
            Self::InvalidSize { size } => {
                write!(f, "invalid size: {size}")
            }
            Self::DepthExceeded { limit } => {
                write!(f, "nesting depth exceeds limit {limit}")
            }
            Self::LimitExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LengthBytes => "length bytes",
            Self::ContainerItems => "container items",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedVersion { found } => {
                write!(f, "unrecognized envelope version: {found}")
            }
            Self::UnrecognizedType { found } => {
                write!(f, "unrecognized message type: {found}")
            }
            Self::InvalidName => write!(f, "message name is not valid UTF-8"),
            Self::Wire(err) => write!(f, "wire error: {err}"),
        }
    }
}

impl std::error::Error for WireError {}

impl std::error::Error for EnvelopeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WireError> for EnvelopeError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}
