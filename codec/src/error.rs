//! Error types for schema-driven encode and decode.

use std::fmt;

use wire::{EnvelopeError, TypeId, WireError};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Why a union value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionReason {
    /// No declared field carried a value.
    NoData,
    /// More than one declared field carried a value; names the second one.
    MultipleFields { field: String, id: i16 },
    /// Encode-side value named a field the union does not declare.
    UnknownChoice { name: String },
}

impl fmt::Display for UnionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no field set"),
            Self::MultipleFields { field, id } => {
                write!(f, "more than one field set, second is `{field}` (id {id})")
            }
            Self::UnknownChoice { name } => write!(f, "unknown choice `{name}`"),
        }
    }
}

/// Errors raised while encoding or decoding values against a schema.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CodecError {
    /// Underlying byte-level failure.
    Wire(WireError),

    /// Message envelope failure.
    Envelope(EnvelopeError),

    /// Decoded struct is missing a field declared required.
    MissingRequiredField { strukt: String, field: String },

    /// Wire carried a different type tag than the schema declares.
    UnexpectedTypeId { expected: TypeId, found: TypeId },

    /// In-memory value shape does not match the declared type.
    ValueTypeMismatch { expected: &'static str, found: &'static str },

    /// Encode-side struct value carries a field the schema does not declare.
    UnknownField { strukt: String, field: String },

    /// Enum value names a member the enum does not declare.
    UnknownEnumName { enum_name: String, member: String },

    /// Wire carried a numeric value outside the enum's members.
    UnknownEnumValue { enum_name: String, value: i32 },

    /// Union value violated the exactly-one-field rule.
    InvalidUnion { union: String, reason: UnionReason },

    /// 64-bit integer representation could not be converted for the wire.
    InvalidI64 { detail: String },

    /// String-typed bytes were not valid UTF-8.
    InvalidUtf8,

    /// Message name does not match any function of the service.
    UnknownFunction { service: String, function: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(err) => write!(f, "wire error: {err}"),
            Self::Envelope(err) => write!(f, "envelope error: {err}"),
            Self::MissingRequiredField { strukt, field } => {
                write!(f, "missing required field {strukt}.{field}")
            }
            Self::UnexpectedTypeId { expected, found } => {
                write!(f, "expected type {expected:?}, found {found:?}")
            }
            Self::ValueTypeMismatch { expected, found } => {
                write!(f, "expected {expected} value, found {found}")
            }
            Self::UnknownField { strukt, field } => {
                write!(f, "{strukt} has no field `{field}`")
            }
            Self::UnknownEnumName { enum_name, member } => {
                write!(f, "enum {enum_name} has no member `{member}`")
            }
            Self::UnknownEnumValue { enum_name, value } => {
                write!(f, "enum {enum_name} has no member with value {value}")
            }
            Self::InvalidUnion { union, reason } => {
                write!(f, "invalid union {union}: {reason}")
            }
            Self::InvalidI64 { detail } => {
                write!(f, "invalid i64 representation: {detail}")
            }
            Self::InvalidUtf8 => write!(f, "string bytes are not valid UTF-8"),
            Self::UnknownFunction { service, function } => {
                write!(f, "service {service} has no function `{function}`")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(err) => Some(err),
            Self::Envelope(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

impl From<EnvelopeError> for CodecError {
    fn from(err: EnvelopeError) -> Self {
        Self::Envelope(err)
    }
}
