//! The dynamic value model.
//!
//! Values are what the codec encodes from and decodes into: a
//! schema-agnostic tree whose shape is validated against descriptors at
//! encode time. Decoding always produces the shape the schema declares.

use std::collections::{BTreeMap, BTreeSet};

use crate::int64::I64Value;

/// A scalar usable as a map key or membership-set element.
///
/// `Ord` gives maps and sets a canonical iteration order, which in turn
/// makes encoding deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Also used for enum member names and binary keys.
    String(String),
}

impl MapKey {
    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool key",
            Self::Byte(_) => "byte key",
            Self::I16(_) => "i16 key",
            Self::I32(_) => "i32 key",
            Self::I64(_) => "i64 key",
            Self::String(_) => "string key",
        }
    }
}

/// A decoded or to-be-encoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(I64Value),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    /// Lists and sequence-mode sets.
    List(Vec<Value>),
    /// Entries-mode maps and schemaless composites: ordered pairs.
    Entries(Vec<(Value, Value)>),
    /// Mapping-mode maps.
    Map(BTreeMap<MapKey, Value>),
    /// Membership-mode sets.
    Members(BTreeSet<MapKey>),
    Struct(StructValue),
}

impl Value {
    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::List(_) => "list",
            Self::Entries(_) => "entries",
            Self::Map(_) => "map",
            Self::Members(_) => "members",
            Self::Struct(_) => "struct",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Self::Byte(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::I16(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<I64Value> for Value {
    fn from(value: I64Value) -> Self {
        Self::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Self::Struct(value)
    }
}

/// A struct, union, or exception value: named fields, plus frames captured
/// from the wire that the schema does not declare.
///
/// The unrecognized slot is only populated when decoding synthesized result
/// structs; everywhere else undeclared frames are skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    pub fields: BTreeMap<String, Value>,
    pub unrecognized: Vec<(i16, Value)>,
}

impl StructValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A decoded exception carried as a Rust error.
///
/// The codec cannot always name the concrete exception type (unrecognized
/// result frames have only a field id), so the type name is plain data the
/// caller may reassign once it identifies the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub type_name: String,
    pub value: StructValue,
}

impl ErrorValue {
    #[must_use]
    pub fn new(type_name: impl Into<String>, value: StructValue) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }
}

impl std::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value.get("message") {
            Some(Value::String(message)) => write!(f, "{}: {message}", self.type_name),
            _ => write!(f, "{}", self.type_name),
        }
    }
}

impl std::error::Error for ErrorValue {}
