//! Field and struct descriptors.

use std::collections::HashMap;

use crate::ast::Annotations;
use crate::consts::ConstValue;
use crate::types::TypeRef;

/// Effective field presence rule after linking.
///
/// The declared keywords {required, optional, unspecified} combine with the
/// presence of a default and the struct kind into exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    /// Must be present on encode and decode.
    Required,
    /// Silently skipped when absent.
    Optional,
    /// Absent values are replaced by the resolved default.
    Defaulted,
}

/// A linked struct field. Immutable after linking.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Wire field id. Positive in declared structs; synthesized result
    /// fields may use 0.
    pub id: i16,
    pub name: String,
    pub requiredness: Requiredness,
    /// Resolved default value; present iff `requiredness` is `Defaulted`.
    pub default: Option<ConstValue>,
    pub annotations: Annotations,
    pub value_type: TypeRef,
}

impl Field {
    /// Returns `true` if decoding must fail when the field is absent.
    #[must_use]
    pub const fn requires_value(&self) -> bool {
        matches!(self.requiredness, Requiredness::Required)
    }
}

/// Which wire/validation rules a struct-shaped descriptor follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    /// Exactly one field frame on the wire.
    Union,
    /// Struct rules plus an error-like materialization.
    Exception,
    /// Synthesized function argument struct; fields effectively required.
    Args,
    /// Synthesized function result struct; fields always optional, unknown
    /// fields captured as unrecognized exceptions.
    Result,
}

impl StructKind {
    #[must_use]
    pub const fn is_union(self) -> bool {
        matches!(self, Self::Union)
    }

    #[must_use]
    pub const fn is_exception(self) -> bool {
        matches!(self, Self::Exception)
    }

    #[must_use]
    pub const fn is_argument(self) -> bool {
        matches!(self, Self::Args)
    }

    #[must_use]
    pub const fn is_result(self) -> bool {
        matches!(self, Self::Result)
    }

    /// Synthesized and union structs are exempt from the strict-mode
    /// requiredness rule; each carries its own rule instead.
    #[must_use]
    pub const fn exempt_from_strict(self) -> bool {
        matches!(self, Self::Union | Self::Args | Self::Result)
    }
}

/// A linked struct, union, or exception descriptor.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    pub name: String,
    pub kind: StructKind,
    /// Fields in wire (declaration) order.
    pub fields: Vec<Field>,
    /// Total encoded byte length (headers + values + STOP) when every field
    /// has a fixed width and none is optional; enables O(1) length
    /// computation.
    pub fixed_len: Option<usize>,
    pub annotations: Annotations,
    by_id: HashMap<i16, usize>,
    by_name: HashMap<String, usize>,
}

impl StructDescriptor {
    /// Creates a descriptor and builds the id/name indexes.
    ///
    /// Field id/name uniqueness is validated by the linker before this is
    /// called.
    #[must_use]
    pub fn new(
        name: String,
        kind: StructKind,
        fields: Vec<Field>,
        annotations: Annotations,
    ) -> Self {
        let by_id = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.id, index))
            .collect();
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name.clone(), index))
            .collect();
        Self {
            name,
            kind,
            fields,
            fixed_len: None,
            annotations,
            by_id,
            by_name,
        }
    }

    /// Looks up a field by wire id.
    #[must_use]
    pub fn field_by_id(&self, id: i16) -> Option<&Field> {
        self.by_id.get(&id).map(|&index| &self.fields[index])
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }
}
