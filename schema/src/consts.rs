//! Resolved constant values.

/// A constant value after link-time resolution.
///
/// Identifier references (to other constants or enum members) are gone by
/// the time this exists: they have been replaced by the referenced literal.
/// Enum member references resolve to the member *name*, because symbolic
/// names are the enum codec's value domain.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<ConstValue>),
    /// Key/value pairs in declaration order.
    Map(Vec<(ConstValue, ConstValue)>),
}

/// A linked constant definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDescriptor {
    pub name: String,
    pub value_type: crate::types::TypeRef,
    pub value: ConstValue,
}
