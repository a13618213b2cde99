//! Enum descriptors.

use std::collections::HashMap;

use crate::ast::{Annotations, EnumDef};
use crate::error::{SchemaError, SchemaResult};

/// A linked enum: ordered members plus bidirectional name/value indexes.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    pub name: String,
    /// Members in declaration order with their resolved values.
    pub members: Vec<(String, i32)>,
    pub annotations: Annotations,
    by_name: HashMap<String, i32>,
    by_value: HashMap<i32, String>,
}

impl EnumDescriptor {
    /// Builds a descriptor from its definition.
    ///
    /// Values auto-increment from the previous member starting at 0.
    /// Duplicate names are rejected; duplicate values are legal aliases, and
    /// the first declaring name stays canonical for decode.
    pub fn from_def(def: &EnumDef) -> SchemaResult<Self> {
        let enum_name = def.name.name.clone();
        let mut members = Vec::with_capacity(def.members.len());
        let mut by_name = HashMap::new();
        let mut by_value: HashMap<i32, String> = HashMap::new();
        let mut next = 0i64;

        for member in &def.members {
            let value = member.value.unwrap_or(next);
            if value > i64::from(i32::MAX) || value < i64::from(i32::MIN) {
                return Err(SchemaError::EnumValueOutOfRange {
                    enum_name,
                    member: member.name.name.clone(),
                    value,
                });
            }
            let value = value as i32;
            if by_name.contains_key(&member.name.name) {
                return Err(SchemaError::DuplicateEnumMember {
                    enum_name,
                    member: member.name.name.clone(),
                    pos: member.name.pos,
                });
            }
            by_name.insert(member.name.name.clone(), value);
            by_value
                .entry(value)
                .or_insert_with(|| member.name.name.clone());
            members.push((member.name.name.clone(), value));
            next = i64::from(value) + 1;
        }

        Ok(Self {
            name: enum_name,
            members,
            annotations: def.annotations.clone(),
            by_name,
            by_value,
        })
    }

    /// Looks up the numeric value for a member name.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    /// Looks up the canonical name for a numeric value.
    #[must_use]
    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.by_value.get(&value).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EnumMemberDef, Ident};

    fn def(members: Vec<EnumMemberDef>) -> EnumDef {
        EnumDef {
            name: Ident::new("Status"),
            members,
            annotations: Annotations::new(),
        }
    }

    #[test]
    fn values_auto_increment_from_zero() {
        let desc = EnumDescriptor::from_def(&def(vec![
            EnumMemberDef::new("OK"),
            EnumMemberDef::new("PENDING"),
            EnumMemberDef::new("FAILED"),
        ]))
        .unwrap();
        assert_eq!(desc.members, vec![
            ("OK".to_owned(), 0),
            ("PENDING".to_owned(), 1),
            ("FAILED".to_owned(), 2),
        ]);
    }

    #[test]
    fn auto_increment_continues_after_explicit_value() {
        let desc = EnumDescriptor::from_def(&def(vec![
            EnumMemberDef::new("A"),
            EnumMemberDef::with_value("B", 10),
            EnumMemberDef::new("C"),
        ]))
        .unwrap();
        assert_eq!(desc.value_of("A"), Some(0));
        assert_eq!(desc.value_of("B"), Some(10));
        assert_eq!(desc.value_of("C"), Some(11));
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = EnumDescriptor::from_def(&def(vec![
            EnumMemberDef::new("A"),
            EnumMemberDef::with_value("A", 5),
        ]))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateEnumMember { .. }));
    }

    #[test]
    fn duplicate_values_alias_with_first_name_canonical() {
        let desc = EnumDescriptor::from_def(&def(vec![
            EnumMemberDef::with_value("FIRST", 1),
            EnumMemberDef::with_value("ALIAS", 1),
        ]))
        .unwrap();
        assert_eq!(desc.value_of("FIRST"), Some(1));
        assert_eq!(desc.value_of("ALIAS"), Some(1));
        assert_eq!(desc.name_of(1), Some("FIRST"));
    }

    #[test]
    fn value_above_i32_max_rejected() {
        let err = EnumDescriptor::from_def(&def(vec![EnumMemberDef::with_value(
            "BIG",
            i64::from(i32::MAX) + 1,
        )]))
        .unwrap_err();
        assert!(matches!(err, SchemaError::EnumValueOutOfRange { .. }));
    }

    #[test]
    fn unknown_lookups_return_none() {
        let desc = EnumDescriptor::from_def(&def(vec![EnumMemberDef::new("A")])).unwrap();
        assert_eq!(desc.value_of("Z"), None);
        assert_eq!(desc.name_of(9), None);
    }
}
