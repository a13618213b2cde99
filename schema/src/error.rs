//! Error types for schema compilation and linking.
//!
//! Linking errors are raised eagerly: any failure aborts the whole compile
//! rather than deferring to first use of the broken descriptor.

use std::fmt;

use crate::ast::Pos;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while constructing or linking a module graph.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SchemaError {
    /// The loader has no module for the requested path.
    ModuleNotFound { path: String },

    /// Include path did not start with `./` or `../`.
    IncludeNotRelative { path: String, pos: Pos },

    /// A name was defined twice in one module namespace.
    DuplicateDefinition {
        module: String,
        name: String,
        pos: Pos,
    },

    /// An identifier did not resolve to any definition.
    UnresolvedReference {
        module: String,
        name: String,
        pos: Pos,
    },

    /// An identifier resolved to a definition that is not a type.
    NotAType { name: String, pos: Pos },

    /// An identifier resolved to a definition that is not a constant value.
    NotAConstant { name: String, pos: Pos },

    /// Typedef chain refers back to itself.
    TypedefCycle { name: String, pos: Pos },

    /// Constant value expression refers back to itself.
    ConstCycle { name: String, pos: Pos },

    /// Enum declared the same member name twice.
    DuplicateEnumMember {
        enum_name: String,
        member: String,
        pos: Pos,
    },

    /// Enum member value outside the signed 32-bit range allowed on the wire.
    EnumValueOutOfRange {
        enum_name: String,
        member: String,
        value: i64,
    },

    /// Enum member reference names a member that does not exist.
    UnknownEnumMember {
        enum_name: String,
        member: String,
        pos: Pos,
    },

    /// Field id must be positive in declared structs.
    InvalidFieldId {
        strukt: String,
        field: String,
        id: i16,
        pos: Pos,
    },

    /// Two fields in one struct share an id.
    DuplicateFieldId {
        strukt: String,
        id: i16,
        pos: Pos,
    },

    /// Two fields in one struct share a name.
    DuplicateFieldName {
        strukt: String,
        field: String,
        pos: Pos,
    },

    /// Strict mode: field is neither required, optional, nor defaulted.
    FieldNotStrict {
        strukt: String,
        field: String,
        pos: Pos,
    },

    /// A recognized annotation key carried an unrecognized value.
    InvalidAnnotation { key: String, value: String },

    /// Keyed-mapping maps require scalar keys.
    NonScalarMapKey,

    /// Membership sets only support string or 1/2/4-byte integer elements.
    UnsupportedMembershipElement,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleNotFound { path } => {
                write!(f, "module not found: {path}")
            }
            Self::IncludeNotRelative { path, pos } => {
                write!(
                    f,
                    "include path must start with ./ or ../: {path} at {pos}"
                )
            }
            Self::DuplicateDefinition { module, name, pos } => {
                write!(f, "duplicate definition of `{name}` in {module} at {pos}")
            }
            Self::UnresolvedReference { module, name, pos } => {
                write!(f, "cannot resolve `{name}` in {module} at {pos}")
            }
            Self::NotAType { name, pos } => {
                write!(f, "`{name}` is not a type at {pos}")
            }
            Self::NotAConstant { name, pos } => {
                write!(f, "`{name}` is not a constant at {pos}")
            }
            Self::TypedefCycle { name, pos } => {
                write!(f, "typedef cycle through `{name}` at {pos}")
            }
            Self::ConstCycle { name, pos } => {
                write!(f, "constant cycle through `{name}` at {pos}")
            }
            Self::DuplicateEnumMember {
                enum_name,
                member,
                pos,
            } => {
                write!(
                    f,
                    "duplicate member `{member}` in enum {enum_name} at {pos}"
                )
            }
            Self::EnumValueOutOfRange {
                enum_name,
                member,
                value,
            } => {
                write!(
                    f,
                    "value {value} for {enum_name}.{member} outside the i32 range"
                )
            }
            Self::UnknownEnumMember {
                enum_name,
                member,
                pos,
            } => {
                write!(f, "enum {enum_name} has no member `{member}` at {pos}")
            }
            Self::InvalidFieldId {
                strukt,
                field,
                id,
                pos,
            } => {
                write!(
                    f,
                    "field id {id} for {strukt}.{field} must be positive at {pos}"
                )
            }
            Self::DuplicateFieldId { strukt, id, pos } => {
                write!(f, "duplicate field id {id} in {strukt} at {pos}")
            }
            Self::DuplicateFieldName { strukt, field, pos } => {
                write!(f, "duplicate field name `{field}` in {strukt} at {pos}")
            }
            Self::FieldNotStrict { strukt, field, pos } => {
                write!(
                    f,
                    "{strukt}.{field} must be required, optional, or defaulted at {pos}"
                )
            }
            Self::InvalidAnnotation { key, value } => {
                write!(f, "unrecognized value `{value}` for annotation {key}")
            }
            Self::NonScalarMapKey => {
                write!(f, "keyed-mapping map requires a scalar key type")
            }
            Self::UnsupportedMembershipElement => {
                write!(
                    f,
                    "membership set element must be string or a 1/2/4-byte integer"
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_definition_display_carries_position() {
        let err = SchemaError::DuplicateDefinition {
            module: "main".to_owned(),
            name: "Point".to_owned(),
            pos: Pos::new(4, 8),
        };
        let msg = err.to_string();
        assert!(msg.contains("Point"));
        assert!(msg.contains("4:8"));
    }

    #[test]
    fn unresolved_reference_display() {
        let err = SchemaError::UnresolvedReference {
            module: "main".to_owned(),
            name: "shared.Missing".to_owned(),
            pos: Pos::new(9, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("shared.Missing"));
        assert!(msg.contains("9:2"));
    }

    #[test]
    fn field_not_strict_display() {
        let err = SchemaError::FieldNotStrict {
            strukt: "User".to_owned(),
            field: "email".to_owned(),
            pos: Pos::new(1, 1),
        };
        assert!(err.to_string().contains("User.email"));
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<SchemaError>();
    }
}
