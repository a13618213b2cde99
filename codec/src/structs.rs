//! Struct, union, and exception codec.
//!
//! Encoding walks declared fields in wire order and validates the value
//! against each field's presence rule; decoding is id-driven off the wire,
//! skipping unknown fields and rejecting known fields that arrive under the
//! wrong type tag. Synthesized result structs instead capture unknown
//! frames, because a reply from a newer peer may carry an exception this
//! schema does not know.

use std::collections::{BTreeMap, BTreeSet};

use schema::{
    ConstValue, Field, MapRepr, Requiredness, Schema, SetRepr, StructId, TypeNode, TypeRef,
};
use wire::{ByteReader, ByteWriter, Limits, TypeId};

use crate::error::{CodecError, CodecResult, UnionReason};
use crate::int64::I64Value;
use crate::value::{MapKey, StructValue, Value};
use crate::value_codec::{
    check_depth, read_unknown, read_value_at, skip_unknown, value_byte_length, write_value,
};

/// Computes the encoded byte length of a struct body, including STOP.
pub fn struct_byte_length(schema: &Schema, id: StructId, value: &StructValue) -> CodecResult<usize> {
    let descriptor = schema.struct_desc(id);
    if descriptor.kind.is_union() {
        let (field, chosen) = union_choice(schema, id, value)?;
        return Ok(1 + 3 + value_byte_length(schema, field.value_type, chosen)?);
    }
    check_declared(schema, id, value)?;
    if let Some(fixed) = descriptor.fixed_len {
        // The precomputed length is only trustworthy for a value that would
        // actually encode, so presence still gets checked.
        for field in &descriptor.fields {
            if field.requires_value() && value.get(&field.name).is_none() {
                return Err(CodecError::MissingRequiredField {
                    strukt: descriptor.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        return Ok(fixed);
    }
    let mut total = 1; // STOP
    for field in &descriptor.fields {
        match value.get(&field.name) {
            Some(present) => {
                total += 3 + value_byte_length(schema, field.value_type, present)?;
            }
            None => match field.requiredness {
                Requiredness::Required => {
                    return Err(CodecError::MissingRequiredField {
                        strukt: descriptor.name.clone(),
                        field: field.name.clone(),
                    })
                }
                Requiredness::Defaulted => {
                    if let Some(default) = &field.default {
                        let materialized = const_to_value(schema, field.value_type, default)?;
                        total += 3 + value_byte_length(schema, field.value_type, &materialized)?;
                    }
                }
                Requiredness::Optional => {}
            },
        }
    }
    Ok(total)
}

/// Encodes a struct body, including the STOP terminator.
pub fn write_struct(
    schema: &Schema,
    id: StructId,
    value: &StructValue,
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    let descriptor = schema.struct_desc(id);
    if descriptor.kind.is_union() {
        let (field, chosen) = union_choice(schema, id, value)?;
        writer.write_u8(schema.wire_type(field.value_type).as_byte())?;
        writer.write_i16(field.id)?;
        write_value(schema, field.value_type, chosen, writer)?;
        writer.write_u8(TypeId::Stop.as_byte())?;
        return Ok(());
    }
    check_declared(schema, id, value)?;
    for field in &descriptor.fields {
        match value.get(&field.name) {
            Some(present) => {
                writer.write_u8(schema.wire_type(field.value_type).as_byte())?;
                writer.write_i16(field.id)?;
                write_value(schema, field.value_type, present, writer)?;
            }
            None => match field.requiredness {
                Requiredness::Required => {
                    return Err(CodecError::MissingRequiredField {
                        strukt: descriptor.name.clone(),
                        field: field.name.clone(),
                    })
                }
                // Absent defaulted fields encode their default, so a peer
                // that never learns the default still sees the value.
                Requiredness::Defaulted => {
                    if let Some(default) = &field.default {
                        let materialized = const_to_value(schema, field.value_type, default)?;
                        writer.write_u8(schema.wire_type(field.value_type).as_byte())?;
                        writer.write_i16(field.id)?;
                        write_value(schema, field.value_type, &materialized, writer)?;
                    }
                }
                Requiredness::Optional => {}
            },
        }
    }
    writer.write_u8(TypeId::Stop.as_byte())?;
    Ok(())
}

/// Decodes a struct body.
pub fn read_struct(
    schema: &Schema,
    id: StructId,
    reader: &mut ByteReader<'_>,
    limits: &Limits,
) -> CodecResult<StructValue> {
    read_struct_at(schema, id, reader, limits, 0)
}

pub(crate) fn read_struct_at(
    schema: &Schema,
    id: StructId,
    reader: &mut ByteReader<'_>,
    limits: &Limits,
    depth: usize,
) -> CodecResult<StructValue> {
    check_depth(limits, depth)?;
    let descriptor = schema.struct_desc(id);
    let mut out = StructValue::new();
    loop {
        let tag = reader.read_u8()?;
        if tag == TypeId::Stop.as_byte() {
            break;
        }
        let type_id = TypeId::from_byte(tag)?;
        let field_id = reader.read_i16()?;
        match descriptor.field_by_id(field_id) {
            Some(field) if schema.wire_type(field.value_type) == type_id => {
                if descriptor.kind.is_union() && !out.fields.is_empty() {
                    return Err(CodecError::InvalidUnion {
                        union: descriptor.name.clone(),
                        reason: UnionReason::MultipleFields {
                            field: field.name.clone(),
                            id: field_id,
                        },
                    });
                }
                let decoded = read_value_at(schema, field.value_type, reader, limits, depth + 1)?;
                out.fields.insert(field.name.clone(), decoded);
            }
            Some(field) => {
                return Err(CodecError::UnexpectedTypeId {
                    expected: schema.wire_type(field.value_type),
                    found: type_id,
                })
            }
            None => {
                if descriptor.kind.is_result() {
                    let captured = read_unknown(reader, type_id, limits, depth + 1)?;
                    out.unrecognized.push((field_id, captured));
                } else {
                    skip_unknown(reader, type_id, limits)?;
                }
            }
        }
    }

    if descriptor.kind.is_union() {
        return if out.fields.len() == 1 {
            Ok(out)
        } else {
            // Skipped unknown frames do not count as data.
            Err(CodecError::InvalidUnion {
                union: descriptor.name.clone(),
                reason: UnionReason::NoData,
            })
        };
    }

    for field in &descriptor.fields {
        if out.fields.contains_key(&field.name) {
            continue;
        }
        match field.requiredness {
            Requiredness::Required => {
                return Err(CodecError::MissingRequiredField {
                    strukt: descriptor.name.clone(),
                    field: field.name.clone(),
                })
            }
            Requiredness::Defaulted => {
                if let Some(default) = &field.default {
                    let materialized = const_to_value(schema, field.value_type, default)?;
                    out.fields.insert(field.name.clone(), materialized);
                }
            }
            Requiredness::Optional => {}
        }
    }
    Ok(out)
}

/// Validates the exactly-one-field union rule and returns the chosen
/// field's type and value.
fn union_choice<'s, 'v>(
    schema: &'s Schema,
    id: StructId,
    value: &'v StructValue,
) -> CodecResult<(&'s Field, &'v Value)> {
    let descriptor = schema.struct_desc(id);
    let mut iter = value.fields.iter();
    let Some((name, chosen)) = iter.next() else {
        return Err(CodecError::InvalidUnion {
            union: descriptor.name.clone(),
            reason: UnionReason::NoData,
        });
    };
    let field = descriptor
        .field_by_name(name)
        .ok_or_else(|| CodecError::InvalidUnion {
            union: descriptor.name.clone(),
            reason: UnionReason::UnknownChoice { name: name.clone() },
        })?;
    if let Some((extra, _)) = iter.next() {
        let reason = match descriptor.field_by_name(extra) {
            Some(second) => UnionReason::MultipleFields {
                field: second.name.clone(),
                id: second.id,
            },
            None => UnionReason::UnknownChoice {
                name: extra.clone(),
            },
        };
        return Err(CodecError::InvalidUnion {
            union: descriptor.name.clone(),
            reason,
        });
    }
    Ok((field, chosen))
}

/// Rejects encode-side values naming fields the schema does not declare.
fn check_declared(schema: &Schema, id: StructId, value: &StructValue) -> CodecResult<()> {
    let descriptor = schema.struct_desc(id);
    for name in value.fields.keys() {
        if descriptor.field_by_name(name).is_none() {
            return Err(CodecError::UnknownField {
                strukt: descriptor.name.clone(),
                field: name.clone(),
            });
        }
    }
    Ok(())
}

/// Materializes a linked constant as a codec value of the given type.
pub fn const_to_value(schema: &Schema, tref: TypeRef, value: &ConstValue) -> CodecResult<Value> {
    match (schema.node(tref), value) {
        (TypeNode::Bool, ConstValue::Bool(flag)) => Ok(Value::Bool(*flag)),
        (TypeNode::Byte, ConstValue::Int(raw)) => Ok(Value::Byte(narrow(*raw)?)),
        (TypeNode::I16, ConstValue::Int(raw)) => Ok(Value::I16(narrow(*raw)?)),
        (TypeNode::I32, ConstValue::Int(raw)) => Ok(Value::I32(narrow(*raw)?)),
        (TypeNode::I64(repr), ConstValue::Int(raw)) => {
            Ok(Value::I64(I64Value::from_wire(*raw, *repr)))
        }
        (TypeNode::Double, ConstValue::Double(real)) => Ok(Value::Double(*real)),
        (TypeNode::Double, ConstValue::Int(raw)) => Ok(Value::Double(*raw as f64)),
        (TypeNode::String, ConstValue::String(text)) => Ok(Value::String(text.clone())),
        (TypeNode::Binary, ConstValue::String(text)) => {
            Ok(Value::Binary(text.as_bytes().to_vec()))
        }
        (TypeNode::Enum(id), ConstValue::String(member)) => {
            let descriptor = schema.enum_desc(*id);
            if descriptor.value_of(member).is_none() {
                return Err(CodecError::UnknownEnumName {
                    enum_name: descriptor.name.clone(),
                    member: member.clone(),
                });
            }
            Ok(Value::String(member.clone()))
        }
        (TypeNode::Enum(id), ConstValue::Int(raw)) => {
            let descriptor = schema.enum_desc(*id);
            let raw = narrow::<i32>(*raw)?;
            descriptor
                .name_of(raw)
                .map(|name| Value::String(name.to_owned()))
                .ok_or_else(|| CodecError::UnknownEnumValue {
                    enum_name: descriptor.name.clone(),
                    value: raw,
                })
        }
        (TypeNode::List { elem }, ConstValue::List(items))
        | (
            TypeNode::Set {
                elem,
                repr: SetRepr::Sequence,
            },
            ConstValue::List(items),
        ) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(const_to_value(schema, *elem, item)?);
            }
            Ok(Value::List(out))
        }
        (
            TypeNode::Set {
                elem,
                repr: SetRepr::Membership,
            },
            ConstValue::List(items),
        ) => {
            let mut out = BTreeSet::new();
            for item in items {
                out.insert(const_to_key(schema, *elem, item)?);
            }
            Ok(Value::Members(out))
        }
        (
            TypeNode::Map {
                key,
                value: val,
                repr: MapRepr::Mapping,
            },
            ConstValue::Map(pairs),
        ) => {
            let mut out = BTreeMap::new();
            for (pair_key, pair_value) in pairs {
                out.insert(
                    const_to_key(schema, *key, pair_key)?,
                    const_to_value(schema, *val, pair_value)?,
                );
            }
            Ok(Value::Map(out))
        }
        (
            TypeNode::Map {
                key,
                value: val,
                repr: MapRepr::Entries,
            },
            ConstValue::Map(pairs),
        ) => {
            let mut out = Vec::with_capacity(pairs.len());
            for (pair_key, pair_value) in pairs {
                out.push((
                    const_to_value(schema, *key, pair_key)?,
                    const_to_value(schema, *val, pair_value)?,
                ));
            }
            Ok(Value::Entries(out))
        }
        (TypeNode::Struct(id), ConstValue::Map(pairs)) => {
            let descriptor = schema.struct_desc(*id);
            let mut out = StructValue::new();
            for (pair_key, pair_value) in pairs {
                let ConstValue::String(name) = pair_key else {
                    return Err(CodecError::ValueTypeMismatch {
                        expected: "field name",
                        found: "constant",
                    });
                };
                let field =
                    descriptor
                        .field_by_name(name)
                        .ok_or_else(|| CodecError::UnknownField {
                            strukt: descriptor.name.clone(),
                            field: name.clone(),
                        })?;
                out.fields.insert(
                    name.clone(),
                    const_to_value(schema, field.value_type, pair_value)?,
                );
            }
            Ok(Value::Struct(out))
        }
        (node, _) => Err(CodecError::ValueTypeMismatch {
            expected: crate::value_codec::node_kind(node),
            found: "constant",
        }),
    }
}

fn const_to_key(schema: &Schema, tref: TypeRef, value: &ConstValue) -> CodecResult<MapKey> {
    match (schema.node(tref), value) {
        (TypeNode::Bool, ConstValue::Bool(flag)) => Ok(MapKey::Bool(*flag)),
        (TypeNode::Byte, ConstValue::Int(raw)) => Ok(MapKey::Byte(narrow(*raw)?)),
        (TypeNode::I16, ConstValue::Int(raw)) => Ok(MapKey::I16(narrow(*raw)?)),
        (TypeNode::I32, ConstValue::Int(raw)) => Ok(MapKey::I32(narrow(*raw)?)),
        (TypeNode::I64(_), ConstValue::Int(raw)) => Ok(MapKey::I64(*raw)),
        (TypeNode::String | TypeNode::Binary, ConstValue::String(text)) => {
            Ok(MapKey::String(text.clone()))
        }
        (TypeNode::Enum(id), ConstValue::String(member)) => {
            let descriptor = schema.enum_desc(*id);
            if descriptor.value_of(member).is_none() {
                return Err(CodecError::UnknownEnumName {
                    enum_name: descriptor.name.clone(),
                    member: member.clone(),
                });
            }
            Ok(MapKey::String(member.clone()))
        }
        (node, _) => Err(CodecError::ValueTypeMismatch {
            expected: crate::value_codec::node_kind(node),
            found: "constant",
        }),
    }
}

fn narrow<T: TryFrom<i64>>(raw: i64) -> CodecResult<T> {
    T::try_from(raw).map_err(|_| CodecError::InvalidI64 {
        detail: format!("constant {raw} does not fit the declared integer width"),
    })
}
