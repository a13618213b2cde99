//! Abstract syntax tree consumed by the linker.
//!
//! The textual grammar and parser live outside this crate; any parser that
//! produces this shape (or deserializes it, with the `serde` feature) can
//! drive compilation. Construction helpers exist mainly for tests and for
//! tools that synthesize modules programmatically.

use std::collections::BTreeMap;
use std::fmt;

/// Source position of an identifier or header, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    #[must_use]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A named occurrence with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

impl Ident {
    /// Creates an identifier with no position (tests, synthesized nodes).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pos: Pos::default(),
        }
    }

    /// Creates an identifier at a source position.
    #[must_use]
    pub fn at(name: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            name: name.into(),
            pos: Pos::new(line, col),
        }
    }
}

/// String-keyed annotations attached to types, fields, and definitions.
///
/// Recognized keys select codec representations; unrecognized keys are
/// preserved and ignored.
pub type Annotations = BTreeMap<String, String>;

/// One parsed module: ordered headers followed by ordered definitions.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    pub headers: Vec<Header>,
    pub definitions: Vec<Definition>,
}

impl Program {
    #[must_use]
    pub fn new(headers: Vec<Header>, definitions: Vec<Definition>) -> Self {
        Self {
            headers,
            definitions,
        }
    }
}

/// Module headers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Header {
    /// Pulls another module into scope. `path` must be relative (`./` or
    /// `../`); the alias defaults to the included file's stem.
    Include {
        path: String,
        alias: Option<String>,
        pos: Pos,
    },
    /// Target-language namespace hint; carried through, unused by the core.
    Namespace { scope: String, name: String },
}

/// Top-level definitions in declaration order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Definition {
    Const(ConstDef),
    Typedef(TypedefDef),
    Enum(EnumDef),
    Struct(StructDef),
    Union(StructDef),
    Exception(StructDef),
    Service(ServiceDef),
}

impl Definition {
    /// Returns the defined name with its position.
    #[must_use]
    pub const fn ident(&self) -> &Ident {
        match self {
            Self::Const(def) => &def.name,
            Self::Typedef(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::Struct(def) | Self::Union(def) | Self::Exception(def) => &def.name,
            Self::Service(def) => &def.name,
        }
    }
}

/// Built-in primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseType {
    Void,
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
}

/// A type expression as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeExpr {
    Base {
        base: BaseType,
        annotations: Annotations,
    },
    /// Reference to a named type, possibly dotted through an include alias.
    Named(Ident),
    List {
        elem: Box<TypeExpr>,
        annotations: Annotations,
    },
    Set {
        elem: Box<TypeExpr>,
        annotations: Annotations,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        annotations: Annotations,
    },
}

impl TypeExpr {
    #[must_use]
    pub fn base(base: BaseType) -> Self {
        Self::Base {
            base,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn base_annotated(base: BaseType, annotations: Annotations) -> Self {
        Self::Base { base, annotations }
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(Ident::new(name))
    }

    #[must_use]
    pub fn list(elem: Self) -> Self {
        Self::List {
            elem: Box::new(elem),
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn set(elem: Self) -> Self {
        Self::Set {
            elem: Box::new(elem),
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
            annotations: Annotations::new(),
        }
    }
}

/// A constant value expression, resolved at link time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstExpr {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Reference to another constant or an enum member, possibly dotted.
    Ident(Ident),
    List(Vec<ConstExpr>),
    Map(Vec<(ConstExpr, ConstExpr)>),
}

/// Declared field requiredness keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldRequiredness {
    Required,
    Optional,
    #[default]
    Unspecified,
}

/// A field declaration inside a struct, union, exception, or function.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDef {
    pub id: i16,
    pub name: Ident,
    pub requiredness: FieldRequiredness,
    pub value_type: TypeExpr,
    pub default: Option<ConstExpr>,
    pub annotations: Annotations,
}

impl FieldDef {
    #[must_use]
    pub fn new(id: i16, name: impl Into<String>, value_type: TypeExpr) -> Self {
        Self {
            id,
            name: Ident::new(name),
            requiredness: FieldRequiredness::Unspecified,
            value_type,
            default: None,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.requiredness = FieldRequiredness::Required;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.requiredness = FieldRequiredness::Optional;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: ConstExpr) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstDef {
    pub name: Ident,
    pub value_type: TypeExpr,
    pub value: ConstExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypedefDef {
    pub name: Ident,
    pub target: TypeExpr,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumMemberDef {
    pub name: Ident,
    /// Explicit numeric value; omitted members auto-increment.
    pub value: Option<i64>,
    pub annotations: Annotations,
}

impl EnumMemberDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Ident::new(name),
            value: None,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn with_value(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: Ident::new(name),
            value: Some(value),
            annotations: Annotations::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumDef {
    pub name: Ident,
    pub members: Vec<EnumMemberDef>,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructDef {
    pub name: Ident,
    pub fields: Vec<FieldDef>,
    pub annotations: Annotations,
}

impl StructDef {
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: Ident::new(name),
            fields,
            annotations: Annotations::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDef {
    pub name: Ident,
    /// `None` is a void function.
    pub result: Option<TypeExpr>,
    pub args: Vec<FieldDef>,
    pub throws: Vec<FieldDef>,
    pub oneway: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDef {
    pub name: Ident,
    pub functions: Vec<FunctionDef>,
    pub annotations: Annotations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_display() {
        assert_eq!(Pos::new(3, 14).to_string(), "3:14");
    }

    #[test]
    fn definition_ident_covers_all_variants() {
        let strukt = Definition::Struct(StructDef::new("S", vec![]));
        assert_eq!(strukt.ident().name, "S");

        let en = Definition::Enum(EnumDef {
            name: Ident::at("E", 2, 1),
            members: vec![],
            annotations: Annotations::new(),
        });
        assert_eq!(en.ident().pos, Pos::new(2, 1));
    }

    #[test]
    fn field_builder_chains() {
        let field = FieldDef::new(1, "id", TypeExpr::base(BaseType::I32))
            .required()
            .with_annotation("codec.repr", "raw");
        assert_eq!(field.requiredness, FieldRequiredness::Required);
        assert_eq!(field.annotations.get("codec.repr").unwrap(), "raw");
    }

    #[test]
    fn type_expr_builders_nest() {
        let expr = TypeExpr::map(
            TypeExpr::base(BaseType::String),
            TypeExpr::list(TypeExpr::named("Point")),
        );
        assert!(matches!(expr, TypeExpr::Map { .. }));
    }

    #[test]
    fn requiredness_defaults_to_unspecified() {
        assert_eq!(FieldRequiredness::default(), FieldRequiredness::Unspecified);
    }
}
