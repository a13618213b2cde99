//! Schemaless skipping of encoded values.
//!
//! The skip dispatcher advances the read cursor past a value of a given type
//! id without materializing it. Struct decoding uses it to recover from
//! unknown field ids (forward compatibility); callers can also use it to
//! locate the next sibling value cheaply.

use crate::error::{LimitKind, WireError, WireResult};
use crate::limits::Limits;
use crate::reader::ByteReader;
use crate::typeid::TypeId;

/// Skips one encoded value of type `type_id`, advancing the reader past it.
///
/// Fails with [`WireError::InvalidTypeId`] on unknown tags (including STOP,
/// which is a struct terminator rather than a value), with
/// [`WireError::ShortBuffer`] if the value runs past the buffer, and with
/// [`WireError::DepthExceeded`] on adversarial nesting.
pub fn skip_value(reader: &mut ByteReader<'_>, type_id: TypeId, limits: &Limits) -> WireResult<()> {
    skip_at_depth(reader, type_id, limits, 0)
}

fn skip_at_depth(
    reader: &mut ByteReader<'_>,
    type_id: TypeId,
    limits: &Limits,
    depth: usize,
) -> WireResult<()> {
    match type_id {
        TypeId::Void => Ok(()),
        TypeId::Bool | TypeId::Byte => {
            reader.read_bytes(1)?;
            Ok(())
        }
        TypeId::I16 => {
            reader.read_bytes(2)?;
            Ok(())
        }
        TypeId::I32 => {
            reader.read_bytes(4)?;
            Ok(())
        }
        TypeId::I64 | TypeId::Double => {
            reader.read_bytes(8)?;
            Ok(())
        }
        TypeId::String => {
            check_depth(limits, depth)?;
            reader.read_binary(limits)?;
            Ok(())
        }
        TypeId::Struct => {
            check_depth(limits, depth)?;
            skip_struct_body(reader, limits, depth)
        }
        TypeId::Map => {
            check_depth(limits, depth)?;
            let key_id = TypeId::from_byte(reader.read_u8()?)?;
            let value_id = TypeId::from_byte(reader.read_u8()?)?;
            let count = read_count(reader, limits)?;
            for _ in 0..count {
                skip_at_depth(reader, key_id, limits, depth + 1)?;
                skip_at_depth(reader, value_id, limits, depth + 1)?;
            }
            Ok(())
        }
        TypeId::List | TypeId::Set => {
            check_depth(limits, depth)?;
            let elem_id = TypeId::from_byte(reader.read_u8()?)?;
            let count = read_count(reader, limits)?;
            for _ in 0..count {
                skip_at_depth(reader, elem_id, limits, depth + 1)?;
            }
            Ok(())
        }
        // STOP terminates a struct; it is never a standalone value.
        TypeId::Stop => Err(WireError::InvalidTypeId { found: 0 }),
    }
}

const fn check_depth(limits: &Limits, depth: usize) -> WireResult<()> {
    if depth >= limits.max_depth {
        return Err(WireError::DepthExceeded {
            limit: limits.max_depth,
        });
    }
    Ok(())
}

fn skip_struct_body(reader: &mut ByteReader<'_>, limits: &Limits, depth: usize) -> WireResult<()> {
    loop {
        let field_id = TypeId::from_byte(reader.read_u8()?)?;
        if field_id == TypeId::Stop {
            return Ok(());
        }
        reader.read_i16()?;
        skip_at_depth(reader, field_id, limits, depth + 1)?;
    }
}

/// Reads a 4-byte signed container count, rejecting negatives and counts
/// above `limits.max_container_items`.
pub fn read_count(reader: &mut ByteReader<'_>, limits: &Limits) -> WireResult<usize> {
    let count = reader.read_i32()?;
    if count < 0 {
        return Err(WireError::InvalidSize { size: count });
    }
    let count = count as usize;
    if count > limits.max_container_items {
        return Err(WireError::LimitExceeded {
            kind: LimitKind::ContainerItems,
            limit: limits.max_container_items,
            actual: count,
        });
    }
    Ok(count)
}
