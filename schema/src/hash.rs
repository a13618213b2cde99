//! Stable schema fingerprint.
//!
//! The hash walks the linked descriptor tables in deterministic order, so
//! two compiles of the same module graph (even across processes) agree, and
//! any semantic change to a definition changes the value. Length-prefixing
//! every string keeps the encoding prefix-free.

use blake3::Hasher;

use crate::consts::ConstValue;
use crate::field::Requiredness;
use crate::schema::{NamedDef, Schema};
use crate::types::{TypeNode, TypeRef};

impl Schema {
    /// Returns a 64-bit fingerprint of the linked schema content.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        let mut hasher = Hasher::new();

        for module in self.modules() {
            hash_str(&mut hasher, &module.path);
            hash_str(&mut hasher, &module.name);
            for (name, def) in module.defs() {
                hash_str(&mut hasher, name);
                match def {
                    NamedDef::Struct(id) => hash_tagged(&mut hasher, 0, id.index()),
                    NamedDef::Enum(id) => hash_tagged(&mut hasher, 1, id.index()),
                    NamedDef::Typedef(tref) => hash_tagged(&mut hasher, 2, tref.index()),
                    NamedDef::Const(id) => hash_tagged(&mut hasher, 3, id.index()),
                    NamedDef::Service(id) => hash_tagged(&mut hasher, 4, id.index()),
                }
            }
        }

        for descriptor in self.structs() {
            hash_str(&mut hasher, &descriptor.name);
            hasher.update(&[descriptor.kind as u8]);
            hasher.update(&(descriptor.fields.len() as u64).to_le_bytes());
            for field in &descriptor.fields {
                hasher.update(&field.id.to_le_bytes());
                hash_str(&mut hasher, &field.name);
                hasher.update(&[match field.requiredness {
                    Requiredness::Required => 0,
                    Requiredness::Optional => 1,
                    Requiredness::Defaulted => 2,
                }]);
                self.hash_type(&mut hasher, field.value_type);
                match &field.default {
                    None => {
                        hasher.update(&[0]);
                    }
                    Some(value) => {
                        hasher.update(&[1]);
                        hash_const(&mut hasher, value);
                    }
                }
            }
        }

        for descriptor in self.enums() {
            hash_str(&mut hasher, &descriptor.name);
            for (name, value) in &descriptor.members {
                hash_str(&mut hasher, name);
                hasher.update(&value.to_le_bytes());
            }
        }

        for descriptor in self.services() {
            hash_str(&mut hasher, &descriptor.name);
            for function in &descriptor.functions {
                hash_str(&mut hasher, &function.name);
                hasher.update(&(function.args.index() as u64).to_le_bytes());
                match function.result {
                    None => {
                        hasher.update(&[0]);
                    }
                    Some(id) => hash_tagged(&mut hasher, 1, id.index()),
                }
                hasher.update(&[u8::from(function.oneway)]);
            }
        }

        for descriptor in self.consts() {
            hash_str(&mut hasher, &descriptor.name);
            self.hash_type(&mut hasher, descriptor.value_type);
            hash_const(&mut hasher, &descriptor.value);
        }

        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(word)
    }

    /// Hashes a type descriptor. Struct and enum nodes hash as table
    /// indices, which both breaks reference cycles and ties the node to the
    /// separately hashed descriptor.
    fn hash_type(&self, hasher: &mut Hasher, tref: TypeRef) {
        match self.node(tref) {
            TypeNode::Void => {
                hasher.update(&[0]);
            }
            TypeNode::Bool => {
                hasher.update(&[1]);
            }
            TypeNode::Byte => {
                hasher.update(&[2]);
            }
            TypeNode::I16 => {
                hasher.update(&[3]);
            }
            TypeNode::I32 => {
                hasher.update(&[4]);
            }
            TypeNode::I64(repr) => {
                hasher.update(&[5, *repr as u8]);
            }
            TypeNode::Double => {
                hasher.update(&[6]);
            }
            TypeNode::String => {
                hasher.update(&[7]);
            }
            TypeNode::Binary => {
                hasher.update(&[8]);
            }
            TypeNode::List { elem } => {
                hasher.update(&[9]);
                self.hash_type(hasher, *elem);
            }
            TypeNode::Set { elem, repr } => {
                hasher.update(&[10, *repr as u8]);
                self.hash_type(hasher, *elem);
            }
            TypeNode::Map { key, value, repr } => {
                hasher.update(&[11, *repr as u8]);
                self.hash_type(hasher, *key);
                self.hash_type(hasher, *value);
            }
            TypeNode::Struct(id) => hash_tagged(hasher, 12, id.index()),
            TypeNode::Enum(id) => hash_tagged(hasher, 13, id.index()),
        }
    }
}

fn hash_str(hasher: &mut Hasher, text: &str) {
    hasher.update(&(text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}

fn hash_tagged(hasher: &mut Hasher, tag: u8, index: usize) {
    hasher.update(&[tag]);
    hasher.update(&(index as u64).to_le_bytes());
}

fn hash_const(hasher: &mut Hasher, value: &ConstValue) {
    match value {
        ConstValue::Bool(v) => {
            hasher.update(&[0, u8::from(*v)]);
        }
        ConstValue::Int(v) => {
            hasher.update(&[1]);
            hasher.update(&v.to_le_bytes());
        }
        ConstValue::Double(v) => {
            hasher.update(&[2]);
            hasher.update(&v.to_bits().to_le_bytes());
        }
        ConstValue::String(v) => {
            hasher.update(&[3]);
            hash_str(hasher, v);
        }
        ConstValue::List(items) => {
            hasher.update(&[4]);
            hasher.update(&(items.len() as u64).to_le_bytes());
            for item in items {
                hash_const(hasher, item);
            }
        }
        ConstValue::Map(pairs) => {
            hasher.update(&[5]);
            hasher.update(&(pairs.len() as u64).to_le_bytes());
            for (key, val) in pairs {
                hash_const(hasher, key);
                hash_const(hasher, val);
            }
        }
    }
}
