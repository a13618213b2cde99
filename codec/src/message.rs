//! RPC message codec: envelope header plus schema-typed body.
//!
//! The body type comes from the service descriptor: calls and oneways carry
//! the function's synthesized argument struct, replies and exceptions carry
//! its synthesized result struct.

use schema::{Schema, ServiceId, StructId};
use wire::{read_message_header, write_message_header, ByteReader, ByteWriter, Limits,
    MessageHeader, MessageType};

use crate::error::{CodecError, CodecResult};
use crate::structs::{read_struct, struct_byte_length, write_struct};
use crate::value::StructValue;

/// A complete RPC message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub header: MessageHeader,
    pub body: StructValue,
}

impl Message {
    #[must_use]
    pub fn new(header: MessageHeader, body: StructValue) -> Self {
        Self { header, body }
    }
}

/// Computes the full encoded length of a message.
pub fn message_byte_length(
    schema: &Schema,
    service: ServiceId,
    message: &Message,
) -> CodecResult<usize> {
    let body = body_struct(schema, service, &message.header)?;
    Ok(message.header.encoded_len() + struct_byte_length(schema, body, &message.body)?)
}

/// Encodes a message: envelope header, then the typed body.
pub fn write_message(
    schema: &Schema,
    service: ServiceId,
    message: &Message,
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    let body = body_struct(schema, service, &message.header)?;
    write_message_header(&message.header, writer)?;
    write_struct(schema, body, &message.body, writer)
}

/// Decodes a message addressed to the given service.
pub fn read_message(
    schema: &Schema,
    service: ServiceId,
    reader: &mut ByteReader<'_>,
    limits: &Limits,
) -> CodecResult<Message> {
    let header = read_message_header(reader, limits)?;
    let body = body_struct(schema, service, &header)?;
    let body = read_struct(schema, body, reader, limits)?;
    Ok(Message { header, body })
}

/// Resolves the struct the body is typed as. Oneway functions have no
/// result struct, so replies to them are unaddressable.
fn body_struct(
    schema: &Schema,
    service: ServiceId,
    header: &MessageHeader,
) -> CodecResult<StructId> {
    let descriptor = schema.service_desc(service);
    let function =
        descriptor
            .function(&header.name)
            .ok_or_else(|| CodecError::UnknownFunction {
                service: descriptor.name.clone(),
                function: header.name.clone(),
            })?;
    match header.message_type {
        MessageType::Call | MessageType::Oneway => Ok(function.args),
        MessageType::Reply | MessageType::Exception => {
            function.result.ok_or_else(|| CodecError::UnknownFunction {
                service: descriptor.name.clone(),
                function: header.name.clone(),
            })
        }
    }
}
