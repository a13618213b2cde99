//! End-to-end compile/link tests over in-memory module graphs.

use schema::ast::{
    BaseType, ConstDef, ConstExpr, Definition, EnumDef, EnumMemberDef, FieldDef, FunctionDef,
    Header, Ident, Program, ServiceDef, StructDef, TypeExpr, TypedefDef,
};
use schema::{
    compile, CompilerOptions, ConstValue, MemoryLoader, NamedDef, Requiredness, SchemaError,
    SetRepr, StructKind, TypeNode,
};

fn include(path: &str) -> Header {
    Header::Include {
        path: path.to_owned(),
        alias: None,
        pos: schema::ast::Pos::default(),
    }
}

fn include_as(path: &str, alias: &str) -> Header {
    Header::Include {
        path: path.to_owned(),
        alias: Some(alias.to_owned()),
        pos: schema::ast::Pos::default(),
    }
}

fn lax() -> CompilerOptions {
    CompilerOptions { strict: false }
}

#[test]
fn includes_resolve_through_default_alias() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "shared.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Id",
                vec![FieldDef::new(1, "value", TypeExpr::base(BaseType::I64)).required()],
            ))],
        ),
    );
    loader.insert(
        "main.ridl",
        Program::new(
            vec![include("./shared.ridl")],
            vec![Definition::Struct(StructDef::new(
                "User",
                vec![FieldDef::new(1, "id", TypeExpr::named("shared.Id")).required()],
            ))],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let user = schema.lookup_type("User").unwrap();
    let TypeNode::Struct(user_id) = schema.node(user) else {
        panic!("expected struct node");
    };
    let field = schema.struct_desc(*user_id).field_by_name("id").unwrap();
    assert_eq!(field.value_type, schema.lookup_type("shared.Id").unwrap());
}

#[test]
fn explicit_alias_shadows_file_stem() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "types/common.ridl",
        Program::new(
            vec![],
            vec![Definition::Enum(EnumDef {
                name: Ident::new("Kind"),
                members: vec![EnumMemberDef::new("A")],
                annotations: Default::default(),
            })],
        ),
    );
    loader.insert(
        "main.ridl",
        Program::new(
            vec![include_as("./types/common.ridl", "c")],
            vec![Definition::Struct(StructDef::new(
                "Holder",
                vec![FieldDef::new(1, "kind", TypeExpr::named("c.Kind")).optional()],
            ))],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    assert!(schema.lookup_type("c.Kind").is_some());
    assert!(schema.lookup_type("common.Kind").is_none());
}

#[test]
fn cyclic_includes_link_to_one_module_instance() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "a.ridl",
        Program::new(
            vec![include("./b.ridl")],
            vec![Definition::Struct(StructDef::new(
                "Tree",
                vec![FieldDef::new(1, "child", TypeExpr::named("b.Node")).optional()],
            ))],
        ),
    );
    loader.insert(
        "b.ridl",
        Program::new(
            vec![include("./a.ridl")],
            vec![Definition::Struct(StructDef::new(
                "Node",
                vec![FieldDef::new(1, "tree", TypeExpr::named("a.Tree")).optional()],
            ))],
        ),
    );
    let schema = compile(&loader, "a.ridl", CompilerOptions::default()).unwrap();

    let tree = schema.lookup_type("Tree").unwrap();
    let node = schema.lookup_type("b.Node").unwrap();
    let TypeNode::Struct(node_id) = schema.node(node) else {
        panic!("expected struct node");
    };
    // b's view of a.Tree is the same descriptor as the root's Tree.
    let back = schema.struct_desc(*node_id).field_by_name("tree").unwrap();
    assert_eq!(back.value_type, tree);
    assert_eq!(schema.modules().count(), 2);
}

#[test]
fn diamond_includes_share_one_module() {
    let shared = Program::new(
        vec![],
        vec![Definition::Struct(StructDef::new(
            "Id",
            vec![FieldDef::new(1, "v", TypeExpr::base(BaseType::I32)).required()],
        ))],
    );
    let mut loader = MemoryLoader::new();
    loader.insert("shared.ridl", shared);
    loader.insert(
        "left.ridl",
        Program::new(vec![include("./shared.ridl")], vec![]),
    );
    loader.insert(
        "right.ridl",
        Program::new(vec![include("./shared.ridl")], vec![]),
    );
    loader.insert(
        "main.ridl",
        Program::new(
            vec![include("./left.ridl"), include("./right.ridl")],
            vec![Definition::Struct(StructDef::new(
                "Pair",
                vec![
                    FieldDef::new(1, "a", TypeExpr::named("left.shared.Id")).required(),
                    FieldDef::new(2, "b", TypeExpr::named("right.shared.Id")).required(),
                ],
            ))],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let pair = schema.lookup_type("Pair").unwrap();
    let TypeNode::Struct(pair_id) = schema.node(pair) else {
        panic!("expected struct node");
    };
    let desc = schema.struct_desc(*pair_id);
    assert_eq!(
        desc.field_by_name("a").unwrap().value_type,
        desc.field_by_name("b").unwrap().value_type,
    );
    assert_eq!(schema.modules().count(), 4);
}

#[test]
fn absolute_include_rejected() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(vec![include("shared.ridl")], vec![]),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::IncludeNotRelative { .. }));
}

#[test]
fn typedef_collapses_to_target() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Typedef(TypedefDef {
                    name: Ident::new("UserId"),
                    target: TypeExpr::base(BaseType::I64),
                    annotations: Default::default(),
                }),
                Definition::Typedef(TypedefDef {
                    name: Ident::new("AccountId"),
                    target: TypeExpr::named("UserId"),
                    annotations: Default::default(),
                }),
            ],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let user = schema.lookup_type("UserId").unwrap();
    let account = schema.lookup_type("AccountId").unwrap();
    assert_eq!(user, account);
    assert!(matches!(schema.node(user), TypeNode::I64(_)));
}

#[test]
fn typedef_cycle_detected() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Typedef(TypedefDef {
                    name: Ident::new("A"),
                    target: TypeExpr::named("B"),
                    annotations: Default::default(),
                }),
                Definition::Typedef(TypedefDef {
                    name: Ident::new("B"),
                    target: TypeExpr::named("A"),
                    annotations: Default::default(),
                }),
            ],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::TypedefCycle { .. }));
}

#[test]
fn consts_chase_references_and_enum_members() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Enum(EnumDef {
                    name: Ident::new("Status"),
                    members: vec![EnumMemberDef::new("OK"), EnumMemberDef::new("FAILED")],
                    annotations: Default::default(),
                }),
                Definition::Const(ConstDef {
                    name: Ident::new("RETRIES"),
                    value_type: TypeExpr::base(BaseType::I32),
                    value: ConstExpr::Int(3),
                }),
                Definition::Const(ConstDef {
                    name: Ident::new("MAX_RETRIES"),
                    value_type: TypeExpr::base(BaseType::I32),
                    value: ConstExpr::Ident(Ident::new("RETRIES")),
                }),
                Definition::Const(ConstDef {
                    name: Ident::new("INITIAL"),
                    value_type: TypeExpr::named("Status"),
                    value: ConstExpr::Ident(Ident::new("Status.OK")),
                }),
            ],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let by_name: std::collections::HashMap<_, _> = schema
        .consts()
        .map(|c| (c.name.as_str(), c.value.clone()))
        .collect();
    assert_eq!(by_name["MAX_RETRIES"], ConstValue::Int(3));
    assert_eq!(by_name["INITIAL"], ConstValue::String("OK".to_owned()));
}

#[test]
fn unknown_enum_member_in_const_rejected() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Enum(EnumDef {
                    name: Ident::new("Status"),
                    members: vec![EnumMemberDef::new("OK")],
                    annotations: Default::default(),
                }),
                Definition::Const(ConstDef {
                    name: Ident::new("BAD"),
                    value_type: TypeExpr::named("Status"),
                    value: ConstExpr::Ident(Ident::new("Status.MISSING")),
                }),
            ],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownEnumMember { .. }));
}

#[test]
fn const_cycle_detected() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Const(ConstDef {
                    name: Ident::new("A"),
                    value_type: TypeExpr::base(BaseType::I32),
                    value: ConstExpr::Ident(Ident::new("B")),
                }),
                Definition::Const(ConstDef {
                    name: Ident::new("B"),
                    value_type: TypeExpr::base(BaseType::I32),
                    value: ConstExpr::Ident(Ident::new("A")),
                }),
            ],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::ConstCycle { .. }));
}

#[test]
fn strict_mode_requires_explicit_requiredness() {
    let program = Program::new(
        vec![],
        vec![Definition::Struct(StructDef::new(
            "Loose",
            vec![FieldDef::new(1, "x", TypeExpr::base(BaseType::I32))],
        ))],
    );
    let mut loader = MemoryLoader::new();
    loader.insert("main.ridl", program.clone());

    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::FieldNotStrict { .. }));

    let schema = compile(&loader, "main.ridl", lax()).unwrap();
    let tref = schema.lookup_type("Loose").unwrap();
    let TypeNode::Struct(id) = schema.node(tref) else {
        panic!("expected struct node");
    };
    assert_eq!(
        schema.struct_desc(*id).field_by_name("x").unwrap().requiredness,
        Requiredness::Optional,
    );
}

#[test]
fn default_makes_field_defaulted_in_strict_mode() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Config",
                vec![FieldDef::new(1, "retries", TypeExpr::base(BaseType::I32))
                    .with_default(ConstExpr::Int(5))],
            ))],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let tref = schema.lookup_type("Config").unwrap();
    let TypeNode::Struct(id) = schema.node(tref) else {
        panic!("expected struct node");
    };
    let field = schema.struct_desc(*id).field_by_name("retries").unwrap();
    assert_eq!(field.requiredness, Requiredness::Defaulted);
    assert_eq!(field.default, Some(ConstValue::Int(5)));
}

#[test]
fn duplicate_definitions_rejected() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Struct(StructDef::new("X", vec![])),
                Definition::Enum(EnumDef {
                    name: Ident::new("X"),
                    members: vec![],
                    annotations: Default::default(),
                }),
            ],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateDefinition { .. }));
}

#[test]
fn field_id_must_be_positive_and_unique() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Bad",
                vec![FieldDef::new(0, "x", TypeExpr::base(BaseType::I32)).required()],
            ))],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidFieldId { .. }));

    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Bad",
                vec![
                    FieldDef::new(1, "x", TypeExpr::base(BaseType::I32)).required(),
                    FieldDef::new(1, "y", TypeExpr::base(BaseType::I32)).required(),
                ],
            ))],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateFieldId { .. }));
}

#[test]
fn service_synthesizes_args_and_result_structs() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Exception(StructDef::new(
                    "NotFound",
                    vec![FieldDef::new(1, "what", TypeExpr::base(BaseType::String)).required()],
                )),
                Definition::Service(ServiceDef {
                    name: Ident::new("Lookup"),
                    functions: vec![
                        FunctionDef {
                            name: Ident::new("get"),
                            result: Some(TypeExpr::base(BaseType::String)),
                            args: vec![FieldDef::new(1, "key", TypeExpr::base(BaseType::String))],
                            throws: vec![FieldDef::new(1, "notFound", TypeExpr::named("NotFound"))],
                            oneway: false,
                        },
                        FunctionDef {
                            name: Ident::new("ping"),
                            result: None,
                            args: vec![],
                            throws: vec![],
                            oneway: true,
                        },
                    ],
                    annotations: Default::default(),
                }),
            ],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let service = schema.service_desc(schema.lookup_service("Lookup").unwrap());

    let get = service.function("get").unwrap();
    let args = schema.struct_desc(get.args);
    assert_eq!(args.kind, StructKind::Args);
    assert_eq!(
        args.field_by_name("key").unwrap().requiredness,
        Requiredness::Required,
    );

    let result = schema.struct_desc(get.result.unwrap());
    assert_eq!(result.kind, StructKind::Result);
    let success = result.field_by_id(0).unwrap();
    assert_eq!(success.name, "success");
    assert_eq!(success.requiredness, Requiredness::Optional);
    assert_eq!(
        result.field_by_name("notFound").unwrap().requiredness,
        Requiredness::Optional,
    );

    let ping = service.function("ping").unwrap();
    assert!(ping.oneway);
    assert!(ping.result.is_none());
}

#[test]
fn fixed_length_computed_only_for_fixed_present_fields() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Struct(StructDef::new(
                    "Point",
                    vec![
                        FieldDef::new(1, "x", TypeExpr::base(BaseType::I32)).required(),
                        FieldDef::new(2, "y", TypeExpr::base(BaseType::I32)).required(),
                    ],
                )),
                Definition::Struct(StructDef::new(
                    "Named",
                    vec![
                        FieldDef::new(1, "x", TypeExpr::base(BaseType::I32)).required(),
                        FieldDef::new(2, "name", TypeExpr::base(BaseType::String)).required(),
                    ],
                )),
                Definition::Struct(StructDef::new(
                    "Sparse",
                    vec![FieldDef::new(1, "x", TypeExpr::base(BaseType::I32)).optional()],
                )),
            ],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let desc = |name: &str| {
        let tref = schema.lookup_type(name).unwrap();
        let TypeNode::Struct(id) = schema.node(tref) else {
            panic!("expected struct node");
        };
        schema.struct_desc(*id)
    };
    // two fields: (1 type + 2 id + 4 value) each, plus STOP.
    assert_eq!(desc("Point").fixed_len, Some(15));
    assert_eq!(desc("Named").fixed_len, None);
    assert_eq!(desc("Sparse").fixed_len, None);
}

#[test]
fn membership_set_rejects_wide_elements() {
    let mut loader = MemoryLoader::new();
    let mut annotations = schema::ast::Annotations::new();
    annotations.insert(schema::REPR_KEY.to_owned(), "membership".to_owned());
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Bad",
                vec![FieldDef::new(
                    1,
                    "s",
                    TypeExpr::Set {
                        elem: Box::new(TypeExpr::base(BaseType::Double)),
                        annotations,
                    },
                )
                .required()],
            ))],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::UnsupportedMembershipElement));
}

#[test]
fn mapping_map_requires_scalar_key() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Bad",
                vec![FieldDef::new(
                    1,
                    "m",
                    TypeExpr::map(
                        TypeExpr::list(TypeExpr::base(BaseType::I32)),
                        TypeExpr::base(BaseType::String),
                    ),
                )
                .required()],
            ))],
        ),
    );
    let err = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::NonScalarMapKey));
}

#[test]
fn entries_map_allows_composite_keys() {
    let mut loader = MemoryLoader::new();
    let mut annotations = schema::ast::Annotations::new();
    annotations.insert(schema::REPR_KEY.to_owned(), "entries".to_owned());
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Ok",
                vec![FieldDef::new(
                    1,
                    "m",
                    TypeExpr::Map {
                        key: Box::new(TypeExpr::list(TypeExpr::base(BaseType::I32))),
                        value: Box::new(TypeExpr::base(BaseType::String)),
                        annotations,
                    },
                )
                .required()],
            ))],
        ),
    );
    assert!(compile(&loader, "main.ridl", CompilerOptions::default()).is_ok());
}

#[test]
fn annotated_set_reprs_reach_the_descriptor() {
    let mut loader = MemoryLoader::new();
    let mut annotations = schema::ast::Annotations::new();
    annotations.insert(schema::REPR_KEY.to_owned(), "membership".to_owned());
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![Definition::Struct(StructDef::new(
                "Flags",
                vec![FieldDef::new(
                    1,
                    "names",
                    TypeExpr::Set {
                        elem: Box::new(TypeExpr::base(BaseType::String)),
                        annotations,
                    },
                )
                .required()],
            ))],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let tref = schema.lookup_type("Flags").unwrap();
    let TypeNode::Struct(id) = schema.node(tref) else {
        panic!("expected struct node");
    };
    let field = schema.struct_desc(*id).field_by_name("names").unwrap();
    let TypeNode::Set { repr, .. } = schema.node(field.value_type) else {
        panic!("expected set node");
    };
    assert_eq!(*repr, SetRepr::Membership);
}

#[test]
fn content_hash_is_stable_and_sensitive() {
    let program = Program::new(
        vec![],
        vec![Definition::Struct(StructDef::new(
            "Point",
            vec![
                FieldDef::new(1, "x", TypeExpr::base(BaseType::I32)).required(),
                FieldDef::new(2, "y", TypeExpr::base(BaseType::I32)).required(),
            ],
        ))],
    );
    let mut loader = MemoryLoader::new();
    loader.insert("main.ridl", program.clone());
    let first = compile(&loader, "main.ridl", CompilerOptions::default())
        .unwrap()
        .content_hash();
    let second = compile(&loader, "main.ridl", CompilerOptions::default())
        .unwrap()
        .content_hash();
    assert_eq!(first, second);

    let mut changed = program;
    if let Definition::Struct(def) = &mut changed.definitions[0] {
        def.fields[1].name = Ident::new("z");
    }
    let mut loader = MemoryLoader::new();
    loader.insert("main.ridl", changed);
    let third = compile(&loader, "main.ridl", CompilerOptions::default())
        .unwrap()
        .content_hash();
    assert_ne!(first, third);
}

#[test]
fn module_defs_enumerate_in_name_order() {
    let mut loader = MemoryLoader::new();
    loader.insert(
        "main.ridl",
        Program::new(
            vec![],
            vec![
                Definition::Struct(StructDef::new("Zed", vec![])),
                Definition::Struct(StructDef::new("Abel", vec![])),
            ],
        ),
    );
    let schema = compile(&loader, "main.ridl", CompilerOptions::default()).unwrap();
    let names: Vec<_> = schema.root_module().defs().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Abel", "Zed"]);
    assert!(matches!(
        schema.root_module().def("Abel"),
        Some(NamedDef::Struct(_))
    ));
}
