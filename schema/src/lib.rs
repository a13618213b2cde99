//! Schema compilation and linking.
//!
//! A schema is a graph of modules: each declares types, constants, and
//! services, and may include other modules through relative paths. This
//! crate turns parsed modules ([`ast::Program`]) into an immutable linked
//! [`Schema`] whose descriptors the codec walks at encode/decode time.
//!
//! Compilation runs in two passes. The first claims every definition name
//! across the include graph so that handles exist for everything; the
//! second resolves type expressions, defaults, constants, and services
//! against those handles. Cyclic references, including include cycles,
//! therefore need no special handling.

pub mod ast;

mod consts;
mod enums;
mod error;
mod field;
mod hash;
mod link;
mod repr;
mod schema;
mod types;

pub use consts::{ConstDescriptor, ConstValue};
pub use enums::EnumDescriptor;
pub use error::{SchemaError, SchemaResult};
pub use field::{Field, Requiredness, StructDescriptor, StructKind};
pub use link::{compile, CompilerOptions, MemoryLoader, ModuleLoader};
pub use repr::{i64_repr, map_repr, set_repr, I64Repr, MapRepr, SetRepr, REPR_KEY};
pub use schema::{FunctionDescriptor, Module, NamedDef, Schema, ServiceDescriptor};
pub use types::{ConstId, EnumId, ModuleId, ServiceId, StructId, TypeNode, TypePool, TypeRef};
