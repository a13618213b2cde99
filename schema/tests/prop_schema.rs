//! Property tests for linker invariants.

use proptest::prelude::*;
use schema::ast::{
    Annotations, Definition, EnumDef, EnumMemberDef, FieldDef, Ident, Program, StructDef, TypeExpr,
};
use schema::{compile, CompilerOptions, MemoryLoader, Schema, TypeNode};

fn build(definitions: Vec<Definition>) -> Schema {
    let mut loader = MemoryLoader::new();
    loader.insert("main.ridl", Program::new(vec![], definitions));
    compile(&loader, "main.ridl", CompilerOptions::default()).unwrap()
}

proptest! {
    #[test]
    fn enum_auto_increment_continues_from_explicit_values(
        explicit in proptest::collection::vec(0i64..1000, 1..8),
    ) {
        // Interleave explicit and implicit members; implicit ones must take
        // previous + 1. Spread explicit values apart so names stay unique
        // per value run and collisions cannot occur.
        let mut members = Vec::new();
        let mut expected = Vec::new();
        for (index, base) in explicit.iter().enumerate() {
            let base = base + (index as i64) * 2000;
            members.push(EnumMemberDef::with_value(format!("E{index}"), base));
            members.push(EnumMemberDef::new(format!("I{index}")));
            expected.push((format!("E{index}"), base as i32));
            expected.push((format!("I{index}"), base as i32 + 1));
        }
        let schema = build(vec![Definition::Enum(EnumDef {
            name: Ident::new("Gen"),
            members,
            annotations: Annotations::new(),
        })]);
        let tref = schema.lookup_type("Gen").unwrap();
        let TypeNode::Enum(id) = schema.node(tref) else {
            panic!("expected enum node");
        };
        let descriptor = schema.enum_desc(*id);
        for (name, value) in expected {
            prop_assert_eq!(descriptor.value_of(&name), Some(value));
        }
    }

    #[test]
    fn content_hash_tracks_field_ids(id_a in 1i16..100, id_b in 1i16..100) {
        let with_id = |id: i16| {
            build(vec![Definition::Struct(StructDef::new(
                "S",
                vec![FieldDef::new(id, "x", TypeExpr::base(schema::ast::BaseType::I32))
                    .required()],
            ))])
        };
        let hash_a = with_id(id_a).content_hash();
        let hash_b = with_id(id_b).content_hash();
        prop_assert_eq!(hash_a == hash_b, id_a == id_b);
    }
}
