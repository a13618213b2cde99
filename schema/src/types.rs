//! Type descriptor arena.
//!
//! Descriptors live in a single arena ([`TypePool`]) and reference each
//! other through stable [`TypeRef`] handles. Fields hold handles rather than
//! owned descriptors, so cyclic type graphs (struct A referencing struct B
//! referencing A, possibly across modules) need no reference counting.

use wire::TypeId;

use crate::repr::{I64Repr, MapRepr, SetRepr};

/// Handle to a type descriptor in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(u32);

impl TypeRef {
    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a struct/union/exception descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(pub(crate) u32);

impl StructId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an enum descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumId(pub(crate) u32);

impl EnumId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a service descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(pub(crate) u32);

impl ServiceId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a constant descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstId(pub(crate) u32);

impl ConstId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One resolved type descriptor.
///
/// Typedefs never appear here: they are transparent aliases collapsed to
/// their target at link time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNode {
    Void,
    Bool,
    Byte,
    I16,
    I32,
    I64(I64Repr),
    Double,
    String,
    Binary,
    List { elem: TypeRef },
    Set { elem: TypeRef, repr: SetRepr },
    Map { key: TypeRef, value: TypeRef, repr: MapRepr },
    Struct(StructId),
    Enum(EnumId),
}

impl TypeNode {
    /// Returns the wire type tag for values of this descriptor.
    ///
    /// Binary shares the string tag; enums encode as 4-byte integers;
    /// unions and exceptions share the struct tag.
    #[must_use]
    pub const fn wire_type(&self) -> TypeId {
        match self {
            Self::Void => TypeId::Void,
            Self::Bool => TypeId::Bool,
            Self::Byte => TypeId::Byte,
            Self::I16 => TypeId::I16,
            Self::I32 | Self::Enum(_) => TypeId::I32,
            Self::I64(_) => TypeId::I64,
            Self::Double => TypeId::Double,
            Self::String | Self::Binary => TypeId::String,
            Self::List { .. } => TypeId::List,
            Self::Set { .. } => TypeId::Set,
            Self::Map { .. } => TypeId::Map,
            Self::Struct(_) => TypeId::Struct,
        }
    }

    /// Returns the static encoded width of a value, when one exists.
    ///
    /// Strings, containers, and structs are variable width; a struct is
    /// treated as variable even when all of its own fields are fixed.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Void => Some(0),
            Self::Bool | Self::Byte => Some(1),
            Self::I16 => Some(2),
            Self::I32 | Self::Enum(_) => Some(4),
            Self::I64(_) | Self::Double => Some(8),
            Self::String
            | Self::Binary
            | Self::List { .. }
            | Self::Set { .. }
            | Self::Map { .. }
            | Self::Struct(_) => None,
        }
    }
}

/// Arena of type descriptors.
///
/// Primitive descriptors are pre-seeded so repeated references share one
/// node; composite nodes are appended as the linker resolves type
/// expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePool {
    nodes: Vec<TypeNode>,
}

impl TypePool {
    const PRIMITIVES: [TypeNode; 9] = [
        TypeNode::Void,
        TypeNode::Bool,
        TypeNode::Byte,
        TypeNode::I16,
        TypeNode::I32,
        TypeNode::I64(I64Repr::Raw),
        TypeNode::Double,
        TypeNode::String,
        TypeNode::Binary,
    ];

    /// Creates a pool seeded with the primitive descriptors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Self::PRIMITIVES.to_vec(),
        }
    }

    /// Returns the descriptor behind a handle.
    #[must_use]
    pub fn node(&self, tref: TypeRef) -> &TypeNode {
        &self.nodes[tref.index()]
    }

    /// Returns the shared handle for a pre-seeded primitive.
    ///
    /// Annotated i64 variants are not pre-seeded; use [`Self::push`].
    #[must_use]
    pub fn primitive(&self, node: TypeNode) -> Option<TypeRef> {
        Self::PRIMITIVES
            .iter()
            .position(|seeded| *seeded == node)
            .map(|index| TypeRef(index as u32))
    }

    /// Appends a descriptor and returns its handle.
    pub fn push(&mut self, node: TypeNode) -> TypeRef {
        let index = u32::try_from(self.nodes.len()).expect("type pool exhausted u32 indices");
        self.nodes.push(node);
        TypeRef(index)
    }

    /// Number of descriptors in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_preseeded_and_shared() {
        let pool = TypePool::new();
        let a = pool.primitive(TypeNode::I32).unwrap();
        let b = pool.primitive(TypeNode::I32).unwrap();
        assert_eq!(a, b);
        assert_eq!(*pool.node(a), TypeNode::I32);
    }

    #[test]
    fn annotated_i64_is_not_preseeded() {
        let pool = TypePool::new();
        assert!(pool.primitive(TypeNode::I64(I64Repr::Raw)).is_some());
        assert!(pool.primitive(TypeNode::I64(I64Repr::Hex)).is_none());
    }

    #[test]
    fn push_returns_fresh_handles() {
        let mut pool = TypePool::new();
        let elem = pool.primitive(TypeNode::Bool).unwrap();
        let list = pool.push(TypeNode::List { elem });
        assert_eq!(*pool.node(list), TypeNode::List { elem });
        assert_ne!(list, elem);
    }

    #[test]
    fn wire_types() {
        assert_eq!(TypeNode::Bool.wire_type(), TypeId::Bool);
        assert_eq!(TypeNode::Binary.wire_type(), TypeId::String);
        assert_eq!(TypeNode::Enum(EnumId(0)).wire_type(), TypeId::I32);
        assert_eq!(TypeNode::Struct(StructId(0)).wire_type(), TypeId::Struct);
    }

    #[test]
    fn fixed_widths() {
        assert_eq!(TypeNode::Void.fixed_width(), Some(0));
        assert_eq!(TypeNode::I64(I64Repr::Pair).fixed_width(), Some(8));
        assert_eq!(TypeNode::Enum(EnumId(3)).fixed_width(), Some(4));
        assert_eq!(TypeNode::String.fixed_width(), None);
        assert_eq!(TypeNode::Struct(StructId(1)).fixed_width(), None);
    }
}
