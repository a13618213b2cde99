//! Schema checking and value transcoding tools for the ridl codec.
//!
//! The library side of the `ridl-tools` binary:
//!
//! - Load schema modules from AST JSON files on disk
//! - Bridge codec values to and from JSON
//! - Encode and decode single values against a compiled schema

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use codec::{I64Value, MapKey, StructValue, Value};
use schema::ast::Program;
use schema::{
    compile, CompilerOptions, ModuleLoader, Schema, SchemaError, SchemaResult, SetRepr, TypeNode,
    TypeRef,
};
use wire::{ByteReader, ByteWriter, Limits};

/// Loads AST JSON modules relative to a base directory.
///
/// Include paths in the modules resolve against the including module's
/// directory, the same way the in-memory loader resolves normalized paths.
pub struct DiskLoader {
    base: PathBuf,
}

impl DiskLoader {
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ModuleLoader for DiskLoader {
    fn load(&self, path: &str) -> SchemaResult<Program> {
        let full = self.base.join(path);
        let contents = fs::read_to_string(&full).map_err(|_| SchemaError::ModuleNotFound {
            path: path.to_owned(),
        })?;
        serde_json::from_str(&contents).map_err(|_| SchemaError::ModuleNotFound {
            path: path.to_owned(),
        })
    }
}

/// Compiles the module at `root` (a path relative to its parent directory).
pub fn load_schema(root: &Path) -> Result<Schema> {
    let base = root.parent().unwrap_or_else(|| Path::new("."));
    let name = root
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("schema path {} has no file name", root.display()))?;
    let loader = DiskLoader::new(base);
    compile(&loader, name, CompilerOptions::default())
        .with_context(|| format!("compile schema {}", root.display()))
}

/// One line of the `check` report: a definition and what it is.
#[derive(Debug, serde::Serialize)]
pub struct CheckEntry {
    pub module: String,
    pub name: String,
    pub kind: &'static str,
}

/// Summary produced by the `check` command for one schema root.
#[derive(Debug, serde::Serialize)]
pub struct CheckReport {
    pub root: String,
    pub modules: usize,
    pub content_hash: String,
    pub definitions: Vec<CheckEntry>,
}

/// Compiles a schema root and summarizes everything it declares.
pub fn check_schema(root: &Path) -> Result<CheckReport> {
    let schema = load_schema(root)?;
    let mut definitions = Vec::new();
    for module in schema.modules() {
        for (name, def) in module.defs() {
            definitions.push(CheckEntry {
                module: module.path.clone(),
                name: name.to_owned(),
                kind: match def {
                    schema::NamedDef::Struct(id) => match schema.struct_desc(id).kind {
                        schema::StructKind::Union => "union",
                        schema::StructKind::Exception => "exception",
                        _ => "struct",
                    },
                    schema::NamedDef::Enum(_) => "enum",
                    schema::NamedDef::Typedef(_) => "typedef",
                    schema::NamedDef::Const(_) => "const",
                    schema::NamedDef::Service(_) => "service",
                },
            });
        }
    }
    Ok(CheckReport {
        root: root.display().to_string(),
        modules: schema.modules().count(),
        content_hash: format!("{:016x}", schema.content_hash()),
        definitions,
    })
}

/// Encodes a JSON value as the named type, returning the wire bytes.
pub fn encode_value(schema: &Schema, type_name: &str, json: &serde_json::Value) -> Result<Vec<u8>> {
    let tref = schema
        .lookup_type(type_name)
        .ok_or_else(|| anyhow!("unknown type {type_name}"))?;
    let value = json_to_value(schema, tref, json)?;
    let len = codec::value_byte_length(schema, tref, &value)?;
    let mut buf = vec![0u8; len];
    codec::write_value(schema, tref, &value, &mut ByteWriter::new(&mut buf))?;
    Ok(buf)
}

/// Decodes wire bytes as the named type, returning JSON.
pub fn decode_value(schema: &Schema, type_name: &str, bytes: &[u8]) -> Result<serde_json::Value> {
    let tref = schema
        .lookup_type(type_name)
        .ok_or_else(|| anyhow!("unknown type {type_name}"))?;
    let mut reader = ByteReader::new(bytes);
    let value = codec::read_value(schema, tref, &mut reader, &Limits::default())?;
    if !reader.is_empty() {
        bail!("{} trailing bytes after value", reader.remaining());
    }
    Ok(value_to_json(&value))
}

/// Converts a decoded value to JSON.
///
/// Binary data and raw i64 bytes render as lowercase hex strings; the other
/// shapes map onto JSON directly.
#[must_use]
pub fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::json;
    match value {
        Value::Bool(flag) => json!(flag),
        Value::Byte(byte) => json!(byte),
        Value::I16(short) => json!(short),
        Value::I32(int) => json!(int),
        Value::I64(wide) => i64_to_json(wide),
        Value::Double(real) => json!(real),
        Value::String(text) => json!(text),
        Value::Binary(bytes) => json!(hex_string(bytes)),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Entries(pairs) => serde_json::Value::Array(
            pairs
                .iter()
                .map(|(key, value)| json!([value_to_json(key), value_to_json(value)]))
                .collect(),
        ),
        Value::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key_string(key), value_to_json(value)))
                .collect(),
        ),
        Value::Members(keys) => {
            serde_json::Value::Array(keys.iter().map(|key| json!(key_string(key))).collect())
        }
        Value::Struct(fields) => struct_to_json(fields),
    }
}

fn struct_to_json(value: &StructValue) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    for (name, field) in &value.fields {
        object.insert(name.clone(), value_to_json(field));
    }
    if !value.unrecognized.is_empty() {
        let captured: Vec<_> = value
            .unrecognized
            .iter()
            .map(|(id, field)| serde_json::json!([id, value_to_json(field)]))
            .collect();
        object.insert("$unrecognized".to_owned(), serde_json::Value::Array(captured));
    }
    serde_json::Value::Object(object)
}

fn i64_to_json(value: &I64Value) -> serde_json::Value {
    use serde_json::json;
    match value {
        I64Value::Raw(bytes) => json!(hex_string(bytes)),
        I64Value::Pair { hi, lo } => json!({ "hi": hi, "lo": lo }),
        I64Value::Hex(text) => json!(text),
        I64Value::Bytes(bytes) => json!(hex_string(bytes)),
        I64Value::Int(int) | I64Value::Timestamp(int) => json!(int),
    }
}

fn key_string(key: &MapKey) -> String {
    match key {
        MapKey::Bool(flag) => flag.to_string(),
        MapKey::Byte(byte) => byte.to_string(),
        MapKey::I16(short) => short.to_string(),
        MapKey::I32(int) => int.to_string(),
        MapKey::I64(wide) => wide.to_string(),
        MapKey::String(text) => text.clone(),
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Parses a hex string (whitespace tolerated) into bytes.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    let mut out = Vec::with_capacity(compact.len() / 2);
    for index in (0..compact.len()).step_by(2) {
        let pair = &compact[index..index + 2];
        out.push(u8::from_str_radix(pair, 16).with_context(|| format!("bad hex byte {pair}"))?);
    }
    Ok(out)
}

/// Converts a JSON value into the codec shape the schema declares for `tref`.
pub fn json_to_value(
    schema: &Schema,
    tref: TypeRef,
    json: &serde_json::Value,
) -> Result<Value> {
    match (schema.node(tref), json) {
        (TypeNode::Bool, serde_json::Value::Bool(flag)) => Ok(Value::Bool(*flag)),
        (TypeNode::Byte, serde_json::Value::Number(number)) => {
            Ok(Value::Byte(number_as::<i8>(number)?))
        }
        (TypeNode::I16, serde_json::Value::Number(number)) => {
            Ok(Value::I16(number_as::<i16>(number)?))
        }
        (TypeNode::I32, serde_json::Value::Number(number)) => {
            Ok(Value::I32(number_as::<i32>(number)?))
        }
        (TypeNode::I64(_), json) => Ok(Value::I64(json_to_i64(json)?)),
        (TypeNode::Double, serde_json::Value::Number(number)) => number
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| anyhow!("{number} is not a double")),
        (TypeNode::String | TypeNode::Enum(_), serde_json::Value::String(text)) => {
            Ok(Value::String(text.clone()))
        }
        (TypeNode::Binary, serde_json::Value::String(text)) => {
            Ok(Value::Binary(parse_hex(text)?))
        }
        (TypeNode::List { elem }, serde_json::Value::Array(items))
        | (
            TypeNode::Set {
                elem,
                repr: SetRepr::Sequence,
            },
            serde_json::Value::Array(items),
        ) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(json_to_value(schema, *elem, item)?);
            }
            Ok(Value::List(out))
        }
        (
            TypeNode::Set {
                elem,
                repr: SetRepr::Membership,
            },
            serde_json::Value::Array(items),
        ) => {
            let mut out = BTreeSet::new();
            for item in items {
                out.insert(json_to_key(schema, *elem, item)?);
            }
            Ok(Value::Members(out))
        }
        (TypeNode::Map { key, value, repr }, json) => match (repr, json) {
            (schema::MapRepr::Mapping, serde_json::Value::Object(object)) => {
                let mut out = BTreeMap::new();
                for (text, item) in object {
                    out.insert(
                        string_to_key(schema, *key, text)?,
                        json_to_value(schema, *value, item)?,
                    );
                }
                Ok(Value::Map(out))
            }
            (schema::MapRepr::Entries, serde_json::Value::Array(pairs)) => {
                let mut out = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    let serde_json::Value::Array(both) = pair else {
                        bail!("entries map expects [key, value] pairs");
                    };
                    let [pair_key, pair_value] = both.as_slice() else {
                        bail!("entries map expects [key, value] pairs");
                    };
                    out.push((
                        json_to_value(schema, *key, pair_key)?,
                        json_to_value(schema, *value, pair_value)?,
                    ));
                }
                Ok(Value::Entries(out))
            }
            _ => bail!("json shape does not match the map representation"),
        },
        (TypeNode::Struct(id), serde_json::Value::Object(object)) => {
            let descriptor = schema.struct_desc(*id);
            let mut out = StructValue::new();
            for (name, item) in object {
                let field = descriptor
                    .field_by_name(name)
                    .ok_or_else(|| anyhow!("{} has no field {name}", descriptor.name))?;
                out.insert(name.clone(), json_to_value(schema, field.value_type, item)?);
            }
            Ok(Value::Struct(out))
        }
        (node, json) => bail!("cannot shape {json} as a {node:?} value"),
    }
}

fn json_to_i64(json: &serde_json::Value) -> Result<I64Value> {
    match json {
        serde_json::Value::Number(number) => number
            .as_i64()
            .map(I64Value::Int)
            .ok_or_else(|| anyhow!("{number} is not an i64")),
        serde_json::Value::String(text) => Ok(I64Value::Hex(text.clone())),
        serde_json::Value::Object(object) => {
            let hi = object
                .get("hi")
                .and_then(serde_json::Value::as_i64)
                .ok_or_else(|| anyhow!("i64 pair object needs an integer \"hi\""))?;
            let lo = object
                .get("lo")
                .and_then(serde_json::Value::as_i64)
                .ok_or_else(|| anyhow!("i64 pair object needs an integer \"lo\""))?;
            Ok(I64Value::Pair {
                hi: i32::try_from(hi).context("pair \"hi\" out of range")?,
                lo: u32::try_from(lo).context("pair \"lo\" out of range")?,
            })
        }
        other => bail!("cannot shape {other} as an i64"),
    }
}

fn json_to_key(schema: &Schema, tref: TypeRef, json: &serde_json::Value) -> Result<MapKey> {
    match (schema.node(tref), json) {
        (TypeNode::Byte, serde_json::Value::Number(number)) => {
            Ok(MapKey::Byte(number_as::<i8>(number)?))
        }
        (TypeNode::I16, serde_json::Value::Number(number)) => {
            Ok(MapKey::I16(number_as::<i16>(number)?))
        }
        (TypeNode::I32, serde_json::Value::Number(number)) => {
            Ok(MapKey::I32(number_as::<i32>(number)?))
        }
        (TypeNode::String | TypeNode::Enum(_), serde_json::Value::String(text)) => {
            Ok(MapKey::String(text.clone()))
        }
        (node, json) => bail!("cannot shape {json} as a {node:?} set element"),
    }
}

fn string_to_key(schema: &Schema, tref: TypeRef, text: &str) -> Result<MapKey> {
    let key = match schema.node(tref) {
        TypeNode::Bool => MapKey::Bool(text.parse().context("bool key")?),
        TypeNode::Byte => MapKey::Byte(text.parse().context("byte key")?),
        TypeNode::I16 => MapKey::I16(text.parse().context("i16 key")?),
        TypeNode::I32 => MapKey::I32(text.parse().context("i32 key")?),
        TypeNode::I64(_) => MapKey::I64(text.parse().context("i64 key")?),
        TypeNode::String | TypeNode::Binary | TypeNode::Enum(_) => {
            MapKey::String(text.to_owned())
        }
        node => bail!("{node:?} cannot key a mapping-mode map"),
    };
    Ok(key)
}

fn number_as<T: TryFrom<i64>>(number: &serde_json::Number) -> Result<T> {
    let raw = number
        .as_i64()
        .ok_or_else(|| anyhow!("{number} is not an integer"))?;
    T::try_from(raw).map_err(|_| anyhow!("{number} does not fit the declared integer width"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::ast::{BaseType, Definition, FieldDef, StructDef, TypeExpr};
    use schema::MemoryLoader;

    fn point_schema() -> Schema {
        let mut loader = MemoryLoader::new();
        loader.insert(
            "point.ridl",
            Program::new(
                vec![],
                vec![Definition::Struct(StructDef::new(
                    "Point",
                    vec![
                        FieldDef::new(1, "x", TypeExpr::base(BaseType::I32)).required(),
                        FieldDef::new(2, "y", TypeExpr::base(BaseType::I32)).required(),
                    ],
                ))],
            ),
        );
        compile(&loader, "point.ridl", CompilerOptions::default()).unwrap()
    }

    #[test]
    fn json_roundtrips_through_the_codec() {
        let schema = point_schema();
        let json = serde_json::json!({ "x": 3, "y": -4 });
        let bytes = encode_value(&schema, "Point", &json).unwrap();
        let back = decode_value(&schema, "Point", &bytes).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn hex_parsing_tolerates_whitespace() {
        assert_eq!(parse_hex("0a ff\n01").unwrap(), vec![0x0a, 0xff, 0x01]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn binary_renders_as_hex() {
        assert_eq!(value_to_json(&Value::Binary(vec![0, 255])), "00ff");
    }

    #[test]
    fn unknown_type_name_is_reported() {
        let schema = point_schema();
        let err = encode_value(&schema, "Missing", &serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }
}
