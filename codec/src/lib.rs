//! Schema-driven binary codec.
//!
//! Values are generic records ([`Value`], [`StructValue`]) rather than
//! generated types; the linked schema's descriptors drive every encode and
//! decode. The three-phase calling convention is length, then write into a
//! pre-sized buffer, then read:
//!
//! ```
//! use codec::{value_byte_length, write_value, read_value, StructValue, Value};
//! use schema::ast::{BaseType, Definition, FieldDef, Program, StructDef, TypeExpr};
//! use schema::{compile, CompilerOptions, MemoryLoader};
//! use wire::{ByteReader, ByteWriter, Limits};
//!
//! let mut loader = MemoryLoader::new();
//! loader.insert(
//!     "point.ridl",
//!     Program::new(
//!         vec![],
//!         vec![Definition::Struct(StructDef::new(
//!             "Point",
//!             vec![
//!                 FieldDef::new(1, "x", TypeExpr::base(BaseType::I32)).required(),
//!                 FieldDef::new(2, "y", TypeExpr::base(BaseType::I32)).required(),
//!             ],
//!         ))],
//!     ),
//! );
//! let schema = compile(&loader, "point.ridl", CompilerOptions::default()).unwrap();
//! let point = schema.lookup_type("Point").unwrap();
//!
//! let value = Value::Struct(StructValue::new().with("x", 3i32).with("y", 4i32));
//! let len = value_byte_length(&schema, point, &value).unwrap();
//! let mut buf = vec![0u8; len];
//! write_value(&schema, point, &value, &mut ByteWriter::new(&mut buf)).unwrap();
//!
//! let decoded = read_value(
//!     &schema,
//!     point,
//!     &mut ByteReader::new(&buf),
//!     &Limits::default(),
//! )
//! .unwrap();
//! assert_eq!(decoded, value);
//! ```

mod error;
mod int64;
mod message;
mod structs;
mod value;
mod value_codec;

pub use error::{CodecError, CodecResult, UnionReason};
pub use int64::I64Value;
pub use message::{message_byte_length, read_message, write_message, Message};
pub use structs::{const_to_value, read_struct, struct_byte_length, write_struct};
pub use value::{ErrorValue, MapKey, StructValue, Value};
pub use value_codec::{read_value, value_byte_length, write_value};
