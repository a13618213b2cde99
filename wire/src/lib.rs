//! Binary wire primitives for the ridl codec.
//!
//! This crate owns the byte-level half of the wire contract:
//! - Numeric type tags ([`TypeId`])
//! - Big-endian primitive reads/writes over borrowed buffers
//! - Schemaless value skipping for forward compatibility
//! - RPC message envelope header framing (strict and legacy)
//!
//! # Design Principles
//!
//! - **Borrowed buffers** - No buffer is retained past a call.
//! - **Typed failures** - Every malformed input maps to a specific error.
//! - **Bounded decoding** - Lengths, counts, and depth respect [`Limits`].

mod envelope;
mod error;
mod limits;
mod reader;
mod skip;
mod typeid;
mod writer;

pub use envelope::{
    read_message_header, write_message_header, MessageHeader, MessageType, STRICT_VERSION,
};
pub use error::{EnvelopeError, LimitKind, WireError, WireResult};
pub use limits::Limits;
pub use reader::ByteReader;
pub use skip::{read_count, skip_value};
pub use typeid::TypeId;
pub use writer::ByteWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = Limits::default();
        let _ = TypeId::from_byte(2);
        let _ = MessageType::Call;
        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn reader_writer_pairing() {
        let mut buf = [0u8; 4];
        ByteWriter::new(&mut buf).write_i32(-7).unwrap();
        assert_eq!(ByteReader::new(&buf).read_i32().unwrap(), -7);
    }

    #[test]
    fn strict_version_is_one() {
        assert_eq!(STRICT_VERSION, 1);
    }
}
