//! Representation modes selected by schema annotations.
//!
//! The annotation is inspected exactly once, at link time; the resulting
//! mode is baked into the type descriptor so encode/decode never re-parse
//! annotation strings.

use crate::ast::Annotations;
use crate::error::{SchemaError, SchemaResult};

/// Annotation key selecting a codec representation.
pub const REPR_KEY: &str = "codec.repr";

/// In-memory shape of a 64-bit integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum I64Repr {
    /// Opaque 8-byte block.
    #[default]
    Raw,
    /// High/low 32-bit pair.
    Pair,
    /// 16-character hexadecimal string.
    Hex,
    /// 8-element byte array.
    Bytes,
    /// Native signed 64-bit integer.
    Int,
    /// Milliseconds timestamp, stored on the wire as whole seconds x 1000.
    Timestamp,
}

/// In-memory shape of a map value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum MapRepr {
    /// Plain key-to-value association; requires scalar keys.
    #[default]
    Mapping,
    /// Ordered sequence of key/value pairs; supports arbitrary keys.
    Entries,
}

/// In-memory shape of a set value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SetRepr {
    /// Ordered list; duplicates are preserved as given.
    #[default]
    Sequence,
    /// Sparse keyed-presence structure; element type restricted to string
    /// and 1/2/4-byte integers.
    Membership,
}

fn lookup<'a>(annotations: &'a Annotations) -> Option<&'a str> {
    annotations.get(REPR_KEY).map(String::as_str)
}

/// Resolves the i64 representation annotation.
pub fn i64_repr(annotations: &Annotations) -> SchemaResult<I64Repr> {
    match lookup(annotations) {
        None => Ok(I64Repr::Raw),
        Some("raw") => Ok(I64Repr::Raw),
        Some("pair") => Ok(I64Repr::Pair),
        Some("hex") => Ok(I64Repr::Hex),
        Some("bytes") => Ok(I64Repr::Bytes),
        Some("int") => Ok(I64Repr::Int),
        Some("timestamp") => Ok(I64Repr::Timestamp),
        Some(other) => Err(invalid(other)),
    }
}

/// Resolves the map representation annotation.
pub fn map_repr(annotations: &Annotations) -> SchemaResult<MapRepr> {
    match lookup(annotations) {
        None => Ok(MapRepr::Mapping),
        Some("mapping") => Ok(MapRepr::Mapping),
        Some("entries") => Ok(MapRepr::Entries),
        Some(other) => Err(invalid(other)),
    }
}

/// Resolves the set representation annotation.
pub fn set_repr(annotations: &Annotations) -> SchemaResult<SetRepr> {
    match lookup(annotations) {
        None => Ok(SetRepr::Sequence),
        Some("sequence") => Ok(SetRepr::Sequence),
        Some("membership") => Ok(SetRepr::Membership),
        Some(other) => Err(invalid(other)),
    }
}

fn invalid(value: &str) -> SchemaError {
    SchemaError::InvalidAnnotation {
        key: REPR_KEY.to_owned(),
        value: value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(value: &str) -> Annotations {
        let mut map = Annotations::new();
        map.insert(REPR_KEY.to_owned(), value.to_owned());
        map
    }

    #[test]
    fn defaults_when_unannotated() {
        let empty = Annotations::new();
        assert_eq!(i64_repr(&empty).unwrap(), I64Repr::Raw);
        assert_eq!(map_repr(&empty).unwrap(), MapRepr::Mapping);
        assert_eq!(set_repr(&empty).unwrap(), SetRepr::Sequence);
    }

    #[test]
    fn parses_every_i64_value() {
        for (text, repr) in [
            ("raw", I64Repr::Raw),
            ("pair", I64Repr::Pair),
            ("hex", I64Repr::Hex),
            ("bytes", I64Repr::Bytes),
            ("int", I64Repr::Int),
            ("timestamp", I64Repr::Timestamp),
        ] {
            assert_eq!(i64_repr(&annotations(text)).unwrap(), repr);
        }
    }

    #[test]
    fn rejects_unknown_values() {
        let err = map_repr(&annotations("object")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAnnotation { .. }));
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let mut map = Annotations::new();
        map.insert("deprecated".to_owned(), "true".to_owned());
        assert_eq!(set_repr(&map).unwrap(), SetRepr::Sequence);
    }
}
