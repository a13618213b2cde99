//! Schema-driven encode/decode of single values.
//!
//! Three symmetric entry points: [`value_byte_length`] computes the exact
//! encoded size, [`write_value`] emits into a pre-sized buffer, and
//! [`read_value`] materializes the shape the schema declares. Struct-typed
//! values delegate to the struct codec and recurse back here per field.

use std::collections::{BTreeMap, BTreeSet};

use schema::{MapRepr, Schema, SetRepr, TypeNode, TypeRef};
use wire::{read_count, skip_value, ByteReader, ByteWriter, Limits, TypeId, WireError};

use crate::error::{CodecError, CodecResult};
use crate::int64::I64Value;
use crate::structs;
use crate::value::{MapKey, Value};

/// Computes the exact encoded byte length of `value` as type `tref`.
pub fn value_byte_length(schema: &Schema, tref: TypeRef, value: &Value) -> CodecResult<usize> {
    let node = schema.node(tref);
    if let Some(width) = node.fixed_width() {
        // Shape still has to match; width alone is not evidence of that.
        check_scalar_shape(node, value)?;
        return Ok(width);
    }
    match (node, value) {
        (TypeNode::String, Value::String(text)) => Ok(4 + text.len()),
        (TypeNode::Binary, Value::Binary(bytes)) => Ok(4 + bytes.len()),
        (TypeNode::List { elem }, Value::List(items)) => {
            let mut total = 5;
            for item in items {
                total += value_byte_length(schema, *elem, item)?;
            }
            Ok(total)
        }
        (
            TypeNode::Set {
                elem,
                repr: SetRepr::Sequence,
            },
            Value::List(items),
        ) => {
            let mut total = 5;
            for item in items {
                total += value_byte_length(schema, *elem, item)?;
            }
            Ok(total)
        }
        (
            TypeNode::Set {
                elem,
                repr: SetRepr::Membership,
            },
            Value::Members(keys),
        ) => {
            let mut total = 5;
            for key in keys {
                total += key_byte_length(schema, *elem, key)?;
            }
            Ok(total)
        }
        (
            TypeNode::Map {
                key,
                value: val,
                repr: MapRepr::Mapping,
            },
            Value::Map(entries),
        ) => {
            let mut total = 6;
            for (map_key, map_value) in entries {
                total += key_byte_length(schema, *key, map_key)?;
                total += value_byte_length(schema, *val, map_value)?;
            }
            Ok(total)
        }
        (
            TypeNode::Map {
                key,
                value: val,
                repr: MapRepr::Entries,
            },
            Value::Entries(pairs),
        ) => {
            let mut total = 6;
            for (pair_key, pair_value) in pairs {
                total += value_byte_length(schema, *key, pair_key)?;
                total += value_byte_length(schema, *val, pair_value)?;
            }
            Ok(total)
        }
        (TypeNode::Struct(id), Value::Struct(fields)) => {
            structs::struct_byte_length(schema, *id, fields)
        }
        (node, value) => Err(mismatch(node, value)),
    }
}

/// Encodes `value` as type `tref`.
pub fn write_value(
    schema: &Schema,
    tref: TypeRef,
    value: &Value,
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    match (schema.node(tref), value) {
        (TypeNode::Bool, Value::Bool(flag)) => Ok(writer.write_u8(u8::from(*flag))?),
        (TypeNode::Byte, Value::Byte(byte)) => Ok(writer.write_i8(*byte)?),
        (TypeNode::I16, Value::I16(short)) => Ok(writer.write_i16(*short)?),
        (TypeNode::I32, Value::I32(int)) => Ok(writer.write_i32(*int)?),
        (TypeNode::I64(_), Value::I64(wide)) => Ok(writer.write_i64(wide.to_wire()?)?),
        (TypeNode::Double, Value::Double(real)) => Ok(writer.write_f64(*real)?),
        (TypeNode::String, Value::String(text)) => Ok(writer.write_binary(text.as_bytes())?),
        (TypeNode::Binary, Value::Binary(bytes)) => Ok(writer.write_binary(bytes)?),
        (TypeNode::Enum(id), Value::String(member)) => {
            let descriptor = schema.enum_desc(*id);
            let raw = descriptor
                .value_of(member)
                .ok_or_else(|| CodecError::UnknownEnumName {
                    enum_name: descriptor.name.clone(),
                    member: member.clone(),
                })?;
            Ok(writer.write_i32(raw)?)
        }
        // Raw numeric enum values are accepted on encode when they name a
        // declared member.
        (TypeNode::Enum(id), Value::I32(raw)) => {
            let descriptor = schema.enum_desc(*id);
            if descriptor.name_of(*raw).is_none() {
                return Err(CodecError::UnknownEnumValue {
                    enum_name: descriptor.name.clone(),
                    value: *raw,
                });
            }
            Ok(writer.write_i32(*raw)?)
        }
        (TypeNode::List { elem }, Value::List(items)) => {
            write_sequence(schema, *elem, items, writer)
        }
        (
            TypeNode::Set {
                elem,
                repr: SetRepr::Sequence,
            },
            Value::List(items),
        ) => write_sequence(schema, *elem, items, writer),
        (
            TypeNode::Set {
                elem,
                repr: SetRepr::Membership,
            },
            Value::Members(keys),
        ) => {
            writer.write_u8(schema.wire_type(*elem).as_byte())?;
            writer.write_i32(count_i32(keys.len())?)?;
            for key in keys {
                write_key(schema, *elem, key, writer)?;
            }
            Ok(())
        }
        (
            TypeNode::Map {
                key,
                value: val,
                repr: MapRepr::Mapping,
            },
            Value::Map(entries),
        ) => {
            writer.write_u8(schema.wire_type(*key).as_byte())?;
            writer.write_u8(schema.wire_type(*val).as_byte())?;
            writer.write_i32(count_i32(entries.len())?)?;
            for (map_key, map_value) in entries {
                write_key(schema, *key, map_key, writer)?;
                write_value(schema, *val, map_value, writer)?;
            }
            Ok(())
        }
        (
            TypeNode::Map {
                key,
                value: val,
                repr: MapRepr::Entries,
            },
            Value::Entries(pairs),
        ) => {
            writer.write_u8(schema.wire_type(*key).as_byte())?;
            writer.write_u8(schema.wire_type(*val).as_byte())?;
            writer.write_i32(count_i32(pairs.len())?)?;
            for (pair_key, pair_value) in pairs {
                write_value(schema, *key, pair_key, writer)?;
                write_value(schema, *val, pair_value, writer)?;
            }
            Ok(())
        }
        (TypeNode::Struct(id), Value::Struct(fields)) => {
            structs::write_struct(schema, *id, fields, writer)
        }
        (node, value) => Err(mismatch(node, value)),
    }
}

/// Decodes one value of type `tref`.
pub fn read_value(
    schema: &Schema,
    tref: TypeRef,
    reader: &mut ByteReader<'_>,
    limits: &Limits,
) -> CodecResult<Value> {
    read_value_at(schema, tref, reader, limits, 0)
}

pub(crate) fn read_value_at(
    schema: &Schema,
    tref: TypeRef,
    reader: &mut ByteReader<'_>,
    limits: &Limits,
    depth: usize,
) -> CodecResult<Value> {
    match schema.node(tref) {
        TypeNode::Void => Err(CodecError::ValueTypeMismatch {
            expected: "non-void",
            found: "void",
        }),
        TypeNode::Bool => Ok(Value::Bool(reader.read_u8()? != 0)),
        TypeNode::Byte => Ok(Value::Byte(reader.read_i8()?)),
        TypeNode::I16 => Ok(Value::I16(reader.read_i16()?)),
        TypeNode::I32 => Ok(Value::I32(reader.read_i32()?)),
        TypeNode::I64(repr) => Ok(Value::I64(I64Value::from_wire(reader.read_i64()?, *repr))),
        TypeNode::Double => Ok(Value::Double(reader.read_f64()?)),
        TypeNode::String => {
            let bytes = reader.read_binary(limits)?;
            std::str::from_utf8(bytes)
                .map(|text| Value::String(text.to_owned()))
                .map_err(|_| CodecError::InvalidUtf8)
        }
        TypeNode::Binary => Ok(Value::Binary(reader.read_binary(limits)?.to_vec())),
        TypeNode::Enum(id) => {
            let raw = reader.read_i32()?;
            let descriptor = schema.enum_desc(*id);
            descriptor
                .name_of(raw)
                .map(|name| Value::String(name.to_owned()))
                .ok_or_else(|| CodecError::UnknownEnumValue {
                    enum_name: descriptor.name.clone(),
                    value: raw,
                })
        }
        TypeNode::List { elem } => {
            check_depth(limits, depth)?;
            Ok(Value::List(read_sequence(
                schema, *elem, reader, limits, depth,
            )?))
        }
        TypeNode::Set { elem, repr } => {
            check_depth(limits, depth)?;
            match repr {
                SetRepr::Sequence => Ok(Value::List(read_sequence(
                    schema, *elem, reader, limits, depth,
                )?)),
                SetRepr::Membership => {
                    expect_type(schema.wire_type(*elem), reader)?;
                    let count = read_count(reader, limits)?;
                    let mut keys = BTreeSet::new();
                    for _ in 0..count {
                        keys.insert(read_key(schema, *elem, reader, limits)?);
                    }
                    Ok(Value::Members(keys))
                }
            }
        }
        TypeNode::Map { key, value, repr } => {
            check_depth(limits, depth)?;
            expect_type(schema.wire_type(*key), reader)?;
            expect_type(schema.wire_type(*value), reader)?;
            let count = read_count(reader, limits)?;
            match repr {
                MapRepr::Mapping => {
                    let mut entries = BTreeMap::new();
                    for _ in 0..count {
                        let map_key = read_key(schema, *key, reader, limits)?;
                        let map_value = read_value_at(schema, *value, reader, limits, depth + 1)?;
                        entries.insert(map_key, map_value);
                    }
                    Ok(Value::Map(entries))
                }
                MapRepr::Entries => {
                    let mut pairs = Vec::with_capacity(count);
                    for _ in 0..count {
                        let pair_key = read_value_at(schema, *key, reader, limits, depth + 1)?;
                        let pair_value = read_value_at(schema, *value, reader, limits, depth + 1)?;
                        pairs.push((pair_key, pair_value));
                    }
                    Ok(Value::Entries(pairs))
                }
            }
        }
        TypeNode::Struct(id) => {
            check_depth(limits, depth)?;
            Ok(Value::Struct(structs::read_struct_at(
                schema,
                *id,
                reader,
                limits,
                depth + 1,
            )?))
        }
    }
}

/// Decodes a value with no schema to guide it, shaping composites as the
/// generic forms: structs and maps become entries, lists and sets become
/// lists, string-tagged data becomes binary.
pub(crate) fn read_unknown(
    reader: &mut ByteReader<'_>,
    type_id: TypeId,
    limits: &Limits,
    depth: usize,
) -> CodecResult<Value> {
    match type_id {
        TypeId::Void => Ok(Value::Binary(Vec::new())),
        TypeId::Bool => Ok(Value::Bool(reader.read_u8()? != 0)),
        TypeId::Byte => Ok(Value::Byte(reader.read_i8()?)),
        TypeId::I16 => Ok(Value::I16(reader.read_i16()?)),
        TypeId::I32 => Ok(Value::I32(reader.read_i32()?)),
        TypeId::I64 => Ok(Value::I64(I64Value::Raw(reader.read_i64()?.to_be_bytes()))),
        TypeId::Double => Ok(Value::Double(reader.read_f64()?)),
        TypeId::String => Ok(Value::Binary(reader.read_binary(limits)?.to_vec())),
        TypeId::Struct => {
            check_depth(limits, depth)?;
            let mut pairs = Vec::new();
            loop {
                let tag = reader.read_u8()?;
                if tag == TypeId::Stop.as_byte() {
                    return Ok(Value::Entries(pairs));
                }
                let field_type = TypeId::from_byte(tag)?;
                let field_id = reader.read_i16()?;
                let field_value = read_unknown(reader, field_type, limits, depth + 1)?;
                pairs.push((Value::I16(field_id), field_value));
            }
        }
        TypeId::Map => {
            check_depth(limits, depth)?;
            let key_id = TypeId::from_byte(reader.read_u8()?)?;
            let value_id = TypeId::from_byte(reader.read_u8()?)?;
            let count = read_count(reader, limits)?;
            let mut pairs = Vec::with_capacity(count);
            for _ in 0..count {
                let pair_key = read_unknown(reader, key_id, limits, depth + 1)?;
                let pair_value = read_unknown(reader, value_id, limits, depth + 1)?;
                pairs.push((pair_key, pair_value));
            }
            Ok(Value::Entries(pairs))
        }
        TypeId::List | TypeId::Set => {
            check_depth(limits, depth)?;
            let elem_id = TypeId::from_byte(reader.read_u8()?)?;
            let count = read_count(reader, limits)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_unknown(reader, elem_id, limits, depth + 1)?);
            }
            Ok(Value::List(items))
        }
        TypeId::Stop => Err(WireError::InvalidTypeId { found: 0 }.into()),
    }
}

/// Skips one value instead of materializing it; used for unknown or
/// re-typed fields.
pub(crate) fn skip_unknown(
    reader: &mut ByteReader<'_>,
    type_id: TypeId,
    limits: &Limits,
) -> CodecResult<()> {
    skip_value(reader, type_id, limits)?;
    Ok(())
}

fn write_sequence(
    schema: &Schema,
    elem: TypeRef,
    items: &[Value],
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    writer.write_u8(schema.wire_type(elem).as_byte())?;
    writer.write_i32(count_i32(items.len())?)?;
    for item in items {
        write_value(schema, elem, item, writer)?;
    }
    Ok(())
}

fn read_sequence(
    schema: &Schema,
    elem: TypeRef,
    reader: &mut ByteReader<'_>,
    limits: &Limits,
    depth: usize,
) -> CodecResult<Vec<Value>> {
    expect_type(schema.wire_type(elem), reader)?;
    let count = read_count(reader, limits)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_value_at(schema, elem, reader, limits, depth + 1)?);
    }
    Ok(items)
}

pub(crate) fn key_byte_length(schema: &Schema, tref: TypeRef, key: &MapKey) -> CodecResult<usize> {
    match (schema.node(tref), key) {
        (TypeNode::Bool, MapKey::Bool(_)) | (TypeNode::Byte, MapKey::Byte(_)) => Ok(1),
        (TypeNode::I16, MapKey::I16(_)) => Ok(2),
        (TypeNode::I32, MapKey::I32(_)) | (TypeNode::Enum(_), MapKey::String(_)) => Ok(4),
        (TypeNode::I64(_), MapKey::I64(_)) => Ok(8),
        (TypeNode::String | TypeNode::Binary, MapKey::String(text)) => Ok(4 + text.len()),
        (node, key) => Err(key_mismatch(node, key)),
    }
}

pub(crate) fn write_key(
    schema: &Schema,
    tref: TypeRef,
    key: &MapKey,
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    match (schema.node(tref), key) {
        (TypeNode::Bool, MapKey::Bool(flag)) => Ok(writer.write_u8(u8::from(*flag))?),
        (TypeNode::Byte, MapKey::Byte(byte)) => Ok(writer.write_i8(*byte)?),
        (TypeNode::I16, MapKey::I16(short)) => Ok(writer.write_i16(*short)?),
        (TypeNode::I32, MapKey::I32(int)) => Ok(writer.write_i32(*int)?),
        (TypeNode::I64(_), MapKey::I64(wide)) => Ok(writer.write_i64(*wide)?),
        (TypeNode::String | TypeNode::Binary, MapKey::String(text)) => {
            Ok(writer.write_binary(text.as_bytes())?)
        }
        (TypeNode::Enum(id), MapKey::String(member)) => {
            let descriptor = schema.enum_desc(*id);
            let raw = descriptor
                .value_of(member)
                .ok_or_else(|| CodecError::UnknownEnumName {
                    enum_name: descriptor.name.clone(),
                    member: member.clone(),
                })?;
            Ok(writer.write_i32(raw)?)
        }
        (node, key) => Err(key_mismatch(node, key)),
    }
}

pub(crate) fn read_key(
    schema: &Schema,
    tref: TypeRef,
    reader: &mut ByteReader<'_>,
    limits: &Limits,
) -> CodecResult<MapKey> {
    match schema.node(tref) {
        TypeNode::Bool => Ok(MapKey::Bool(reader.read_u8()? != 0)),
        TypeNode::Byte => Ok(MapKey::Byte(reader.read_i8()?)),
        TypeNode::I16 => Ok(MapKey::I16(reader.read_i16()?)),
        TypeNode::I32 => Ok(MapKey::I32(reader.read_i32()?)),
        TypeNode::I64(_) => Ok(MapKey::I64(reader.read_i64()?)),
        TypeNode::String | TypeNode::Binary => {
            let bytes = reader.read_binary(limits)?;
            std::str::from_utf8(bytes)
                .map(|text| MapKey::String(text.to_owned()))
                .map_err(|_| CodecError::InvalidUtf8)
        }
        TypeNode::Enum(id) => {
            let raw = reader.read_i32()?;
            let descriptor = schema.enum_desc(*id);
            descriptor
                .name_of(raw)
                .map(|name| MapKey::String(name.to_owned()))
                .ok_or_else(|| CodecError::UnknownEnumValue {
                    enum_name: descriptor.name.clone(),
                    value: raw,
                })
        }
        node => Err(CodecError::ValueTypeMismatch {
            expected: "scalar key type",
            found: node_kind(node),
        }),
    }
}

fn check_scalar_shape(node: &TypeNode, value: &Value) -> CodecResult<()> {
    match (node, value) {
        (TypeNode::Bool, Value::Bool(_))
        | (TypeNode::Byte, Value::Byte(_))
        | (TypeNode::I16, Value::I16(_))
        | (TypeNode::I32, Value::I32(_))
        | (TypeNode::I64(_), Value::I64(_))
        | (TypeNode::Double, Value::Double(_))
        | (TypeNode::Enum(_), Value::String(_) | Value::I32(_)) => Ok(()),
        _ => Err(mismatch(node, value)),
    }
}

pub(crate) fn expect_type(expected: TypeId, reader: &mut ByteReader<'_>) -> CodecResult<()> {
    let found = TypeId::from_byte(reader.read_u8()?)?;
    if found == expected {
        Ok(())
    } else {
        Err(CodecError::UnexpectedTypeId { expected, found })
    }
}

pub(crate) fn count_i32(len: usize) -> CodecResult<i32> {
    i32::try_from(len).map_err(|_| {
        WireError::LimitExceeded {
            kind: wire::LimitKind::ContainerItems,
            limit: i32::MAX as usize,
            actual: len,
        }
        .into()
    })
}

pub(crate) const fn check_depth(limits: &Limits, depth: usize) -> Result<(), WireError> {
    if depth >= limits.max_depth {
        return Err(WireError::DepthExceeded {
            limit: limits.max_depth,
        });
    }
    Ok(())
}

fn mismatch(node: &TypeNode, value: &Value) -> CodecError {
    CodecError::ValueTypeMismatch {
        expected: node_kind(node),
        found: value.kind_name(),
    }
}

fn key_mismatch(node: &TypeNode, key: &MapKey) -> CodecError {
    CodecError::ValueTypeMismatch {
        expected: node_kind(node),
        found: key.kind_name(),
    }
}

pub(crate) const fn node_kind(node: &TypeNode) -> &'static str {
    match node {
        TypeNode::Void => "void",
        TypeNode::Bool => "bool",
        TypeNode::Byte => "byte",
        TypeNode::I16 => "i16",
        TypeNode::I32 => "i32",
        TypeNode::I64(_) => "i64",
        TypeNode::Double => "double",
        TypeNode::String => "string",
        TypeNode::Binary => "binary",
        TypeNode::List { .. } => "list",
        TypeNode::Set { .. } => "set",
        TypeNode::Map { .. } => "map",
        TypeNode::Struct(_) => "struct",
        TypeNode::Enum(_) => "enum",
    }
}
