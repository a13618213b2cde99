//! Two-pass module compiler.
//!
//! Pass one walks the include graph, claims every definition name, and
//! builds enum descriptors plus placeholder struct descriptors so that type
//! handles exist before any field is resolved. Pass two resolves field
//! types, defaults, constants, typedefs, and service functions against those
//! handles. Splitting the passes is what makes cyclic references (including
//! cyclic includes) link without any special casing.

use std::collections::{BTreeMap, HashMap};

use crate::ast::{
    Annotations, BaseType, ConstDef, ConstExpr, Definition, FieldDef, FieldRequiredness, Header,
    Ident, Program, ServiceDef, StructDef, TypeExpr, TypedefDef,
};
use crate::consts::{ConstDescriptor, ConstValue};
use crate::enums::EnumDescriptor;
use crate::error::{SchemaError, SchemaResult};
use crate::field::{Field, Requiredness, StructDescriptor, StructKind};
use crate::repr::{i64_repr, map_repr, set_repr, MapRepr, SetRepr};
use crate::schema::{FunctionDescriptor, Module, NamedDef, Schema, ServiceDescriptor};
use crate::types::{ConstId, EnumId, ModuleId, ServiceId, StructId, TypeNode, TypePool, TypeRef};

/// Source of module text, keyed by normalized path.
pub trait ModuleLoader {
    /// Loads and parses the module at `path`.
    fn load(&self, path: &str) -> SchemaResult<Program>;
}

/// In-memory loader for tests and programmatic schemas.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    modules: HashMap<String, Program>,
}

impl MemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, program: Program) {
        self.modules.insert(path.into(), program);
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&self, path: &str) -> SchemaResult<Program> {
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| SchemaError::ModuleNotFound {
                path: path.to_owned(),
            })
    }
}

/// Compilation options.
#[derive(Debug, Clone, Copy)]
pub struct CompilerOptions {
    /// When set, every declared struct/exception field must be explicitly
    /// required, optional, or carry a default. When clear, unspecified
    /// fields link as optional.
    pub strict: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Compiles the module graph rooted at `root_path` into a linked [`Schema`].
pub fn compile(
    loader: &dyn ModuleLoader,
    root_path: &str,
    options: CompilerOptions,
) -> SchemaResult<Schema> {
    let mut compiler = Compiler::new(loader, options);
    let root = compiler.construct(&normalize_path("", root_path))?;
    compiler.link()?;
    Ok(compiler.finish(root))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState<T> {
    Unlinked,
    Linking,
    Linked(T),
}

#[derive(Debug, Clone, Copy)]
enum WorkDef {
    Struct(StructId),
    Enum(EnumId),
    Typedef(usize),
    Const(usize),
    Service(usize),
}

struct WorkModule {
    path: String,
    name: String,
    defs: BTreeMap<String, WorkDef>,
    includes: BTreeMap<String, ModuleId>,
}

struct TypedefSlot {
    module: ModuleId,
    def: TypedefDef,
    state: LinkState<TypeRef>,
}

struct ConstSlot {
    module: ModuleId,
    def: ConstDef,
    state: LinkState<ConstId>,
}

struct ServiceSlot {
    module: ModuleId,
    def: ServiceDef,
}

struct Compiler<'a> {
    loader: &'a dyn ModuleLoader,
    options: CompilerOptions,
    memo: HashMap<String, ModuleId>,
    modules: Vec<WorkModule>,
    types: TypePool,
    structs: Vec<StructDescriptor>,
    struct_refs: Vec<TypeRef>,
    /// Declaration sources, parallel to `structs`; synthesized service
    /// structs have no source.
    struct_srcs: Vec<Option<(ModuleId, StructKind, StructDef)>>,
    enums: Vec<EnumDescriptor>,
    enum_refs: Vec<TypeRef>,
    typedefs: Vec<TypedefSlot>,
    const_slots: Vec<ConstSlot>,
    consts: Vec<ConstDescriptor>,
    service_slots: Vec<ServiceSlot>,
    services: Vec<ServiceDescriptor>,
}

impl<'a> Compiler<'a> {
    fn new(loader: &'a dyn ModuleLoader, options: CompilerOptions) -> Self {
        Self {
            loader,
            options,
            memo: HashMap::new(),
            modules: Vec::new(),
            types: TypePool::new(),
            structs: Vec::new(),
            struct_refs: Vec::new(),
            struct_srcs: Vec::new(),
            enums: Vec::new(),
            enum_refs: Vec::new(),
            typedefs: Vec::new(),
            const_slots: Vec::new(),
            consts: Vec::new(),
            service_slots: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Pass one. Memoizes on normalized path before processing includes, so
    /// an include cycle folds back onto the already-claimed module.
    fn construct(&mut self, path: &str) -> SchemaResult<ModuleId> {
        if let Some(&id) = self.memo.get(path) {
            return Ok(id);
        }
        let program = self.loader.load(path)?;
        let id = ModuleId(self.modules.len() as u32);
        self.memo.insert(path.to_owned(), id);
        self.modules.push(WorkModule {
            path: path.to_owned(),
            name: path_stem(path).to_owned(),
            defs: BTreeMap::new(),
            includes: BTreeMap::new(),
        });

        for header in &program.headers {
            match header {
                Header::Include {
                    path: include_path,
                    alias,
                    pos,
                } => {
                    if !include_path.starts_with("./") && !include_path.starts_with("../") {
                        return Err(SchemaError::IncludeNotRelative {
                            path: include_path.clone(),
                            pos: *pos,
                        });
                    }
                    let resolved = normalize_path(path_dir(path), include_path);
                    let alias = alias
                        .clone()
                        .unwrap_or_else(|| path_stem(&resolved).to_owned());
                    let pos = *pos;
                    let child = self.construct(&resolved)?;
                    let module = &mut self.modules[id.index()];
                    if module.includes.insert(alias.clone(), child).is_some() {
                        return Err(SchemaError::DuplicateDefinition {
                            module: module.path.clone(),
                            name: alias,
                            pos,
                        });
                    }
                }
                Header::Namespace { .. } => {}
            }
        }

        for definition in &program.definitions {
            let ident = definition.ident().clone();
            let work = match definition {
                Definition::Enum(def) => {
                    let descriptor = EnumDescriptor::from_def(def)?;
                    let enum_id = EnumId(self.enums.len() as u32);
                    self.enums.push(descriptor);
                    self.enum_refs.push(self.types.push(TypeNode::Enum(enum_id)));
                    WorkDef::Enum(enum_id)
                }
                Definition::Struct(def) => self.claim_struct(id, StructKind::Struct, def),
                Definition::Union(def) => self.claim_struct(id, StructKind::Union, def),
                Definition::Exception(def) => self.claim_struct(id, StructKind::Exception, def),
                Definition::Typedef(def) => {
                    self.typedefs.push(TypedefSlot {
                        module: id,
                        def: def.clone(),
                        state: LinkState::Unlinked,
                    });
                    WorkDef::Typedef(self.typedefs.len() - 1)
                }
                Definition::Const(def) => {
                    self.const_slots.push(ConstSlot {
                        module: id,
                        def: def.clone(),
                        state: LinkState::Unlinked,
                    });
                    WorkDef::Const(self.const_slots.len() - 1)
                }
                Definition::Service(def) => {
                    self.service_slots.push(ServiceSlot {
                        module: id,
                        def: def.clone(),
                    });
                    WorkDef::Service(self.service_slots.len() - 1)
                }
            };
            let module = &mut self.modules[id.index()];
            if module.defs.insert(ident.name.clone(), work).is_some() {
                return Err(SchemaError::DuplicateDefinition {
                    module: module.path.clone(),
                    name: ident.name,
                    pos: ident.pos,
                });
            }
        }

        Ok(id)
    }

    fn claim_struct(&mut self, module: ModuleId, kind: StructKind, def: &StructDef) -> WorkDef {
        let struct_id = StructId(self.structs.len() as u32);
        self.structs.push(StructDescriptor::new(
            def.name.name.clone(),
            kind,
            Vec::new(),
            def.annotations.clone(),
        ));
        self.struct_refs
            .push(self.types.push(TypeNode::Struct(struct_id)));
        self.struct_srcs.push(Some((module, kind, def.clone())));
        WorkDef::Struct(struct_id)
    }

    /// Pass two.
    fn link(&mut self) -> SchemaResult<()> {
        for index in 0..self.struct_srcs.len() {
            if let Some((module, kind, def)) = self.struct_srcs[index].clone() {
                self.structs[index] =
                    self.link_struct(module, kind, &def.name.name, &def.fields, def.annotations)?;
            }
        }
        for index in 0..self.service_slots.len() {
            self.link_service(index)?;
        }
        // Unreferenced typedefs and constants still validate eagerly.
        for index in 0..self.typedefs.len() {
            self.resolve_typedef(index)?;
        }
        for index in 0..self.const_slots.len() {
            self.resolve_const(index)?;
        }
        Ok(())
    }

    fn finish(mut self, root: ModuleId) -> Schema {
        let modules = self
            .modules
            .drain(..)
            .map(|work| Module {
                path: work.path,
                name: work.name,
                defs: work
                    .defs
                    .into_iter()
                    .map(|(name, def)| {
                        let named = match def {
                            WorkDef::Struct(id) => NamedDef::Struct(id),
                            WorkDef::Enum(id) => NamedDef::Enum(id),
                            WorkDef::Typedef(index) => match self.typedefs[index].state {
                                LinkState::Linked(tref) => NamedDef::Typedef(tref),
                                // link() resolved every slot.
                                LinkState::Unlinked | LinkState::Linking => unreachable!(),
                            },
                            WorkDef::Const(index) => match self.const_slots[index].state {
                                LinkState::Linked(id) => NamedDef::Const(id),
                                LinkState::Unlinked | LinkState::Linking => unreachable!(),
                            },
                            // Services link in slot order, so ids and slot
                            // indices coincide.
                            WorkDef::Service(index) => {
                                NamedDef::Service(ServiceId(index as u32))
                            }
                        };
                        (name, named)
                    })
                    .collect(),
                includes: work.includes,
            })
            .collect();
        Schema {
            types: self.types,
            structs: self.structs,
            struct_refs: self.struct_refs,
            enums: self.enums,
            enum_refs: self.enum_refs,
            services: self.services,
            consts: self.consts,
            modules,
            root,
        }
    }

    fn link_struct(
        &mut self,
        module: ModuleId,
        kind: StructKind,
        name: &str,
        fields: &[FieldDef],
        annotations: Annotations,
    ) -> SchemaResult<StructDescriptor> {
        let mut linked = Vec::with_capacity(fields.len());
        let mut seen_ids = HashMap::new();
        let mut seen_names = HashMap::new();
        for field in fields {
            if field.id <= 0 {
                return Err(SchemaError::InvalidFieldId {
                    strukt: name.to_owned(),
                    field: field.name.name.clone(),
                    id: field.id,
                    pos: field.name.pos,
                });
            }
            if seen_ids.insert(field.id, ()).is_some() {
                return Err(SchemaError::DuplicateFieldId {
                    strukt: name.to_owned(),
                    id: field.id,
                    pos: field.name.pos,
                });
            }
            if seen_names.insert(field.name.name.clone(), ()).is_some() {
                return Err(SchemaError::DuplicateFieldName {
                    strukt: name.to_owned(),
                    field: field.name.name.clone(),
                    pos: field.name.pos,
                });
            }
            linked.push(self.link_field(module, kind, name, field)?);
        }
        let mut descriptor = StructDescriptor::new(name.to_owned(), kind, linked, annotations);
        descriptor.fixed_len = self.fixed_struct_len(&descriptor);
        Ok(descriptor)
    }

    fn link_field(
        &mut self,
        module: ModuleId,
        kind: StructKind,
        strukt: &str,
        field: &FieldDef,
    ) -> SchemaResult<Field> {
        let value_type = self.resolve_type(module, &field.value_type, None)?;
        // Unions and synthesized results carry their own presence rule;
        // defaults make no sense there and are discarded.
        let (requiredness, default) = if kind.is_union() || kind.is_result() {
            (Requiredness::Optional, None)
        } else if let Some(expr) = &field.default {
            let value = self.eval_const(module, expr)?;
            (Requiredness::Defaulted, Some(value))
        } else if kind.is_argument() {
            (Requiredness::Required, None)
        } else {
            match field.requiredness {
                FieldRequiredness::Required => (Requiredness::Required, None),
                FieldRequiredness::Optional => (Requiredness::Optional, None),
                FieldRequiredness::Unspecified => {
                    if self.options.strict {
                        return Err(SchemaError::FieldNotStrict {
                            strukt: strukt.to_owned(),
                            field: field.name.name.clone(),
                            pos: field.name.pos,
                        });
                    }
                    (Requiredness::Optional, None)
                }
            }
        };
        Ok(Field {
            id: field.id,
            name: field.name.name.clone(),
            requiredness,
            default,
            annotations: field.annotations.clone(),
            value_type,
        })
    }

    /// Total encoded length of the struct body when it is statically known:
    /// every field fixed-width and guaranteed present.
    fn fixed_struct_len(&self, descriptor: &StructDescriptor) -> Option<usize> {
        if descriptor.kind.is_union() {
            return None;
        }
        let mut total = 1; // STOP
        for field in &descriptor.fields {
            if field.requiredness == Requiredness::Optional {
                return None;
            }
            let width = self.types.node(field.value_type).fixed_width()?;
            total += 3 + width; // type id + field id + value
        }
        Some(total)
    }

    fn link_service(&mut self, index: usize) -> SchemaResult<()> {
        let module = self.service_slots[index].module;
        let def = self.service_slots[index].def.clone();
        let service_name = def.name.name.clone();
        let mut functions = Vec::with_capacity(def.functions.len());
        for function in &def.functions {
            let args_name = format!("{service_name}.{}.args", function.name.name);
            let args_desc = self.link_struct(
                module,
                StructKind::Args,
                &args_name,
                &function.args,
                Annotations::new(),
            )?;
            let args = self.push_synthesized(args_desc);

            let result = if function.oneway {
                None
            } else {
                let result_name = format!("{service_name}.{}.result", function.name.name);
                let mut result_desc = self.link_struct(
                    module,
                    StructKind::Result,
                    &result_name,
                    &function.throws,
                    Annotations::new(),
                )?;
                if let Some(result_type) = &function.result {
                    let success_type = self.resolve_type(module, result_type, None)?;
                    result_desc = {
                        let mut fields = vec![Field {
                            id: 0,
                            name: "success".to_owned(),
                            requiredness: Requiredness::Optional,
                            default: None,
                            annotations: Annotations::new(),
                            value_type: success_type,
                        }];
                        fields.extend(result_desc.fields);
                        StructDescriptor::new(
                            result_name,
                            StructKind::Result,
                            fields,
                            Annotations::new(),
                        )
                    };
                }
                Some(self.push_synthesized(result_desc))
            };

            functions.push(FunctionDescriptor {
                name: function.name.name.clone(),
                args,
                result,
                oneway: function.oneway,
            });
        }
        self.services
            .push(ServiceDescriptor::new(service_name, functions, def.annotations));
        Ok(())
    }

    fn push_synthesized(&mut self, descriptor: StructDescriptor) -> StructId {
        let id = StructId(self.structs.len() as u32);
        self.structs.push(descriptor);
        self.struct_refs.push(self.types.push(TypeNode::Struct(id)));
        self.struct_srcs.push(None);
        id
    }

    fn resolve_typedef(&mut self, index: usize) -> SchemaResult<TypeRef> {
        match self.typedefs[index].state {
            LinkState::Linked(tref) => return Ok(tref),
            LinkState::Linking => {
                return Err(SchemaError::TypedefCycle {
                    name: self.typedefs[index].def.name.name.clone(),
                    pos: self.typedefs[index].def.name.pos,
                })
            }
            LinkState::Unlinked => {}
        }
        self.typedefs[index].state = LinkState::Linking;
        let module = self.typedefs[index].module;
        let def = self.typedefs[index].def.clone();
        let extra = if def.annotations.is_empty() {
            None
        } else {
            Some(&def.annotations)
        };
        let tref = self.resolve_type(module, &def.target, extra)?;
        self.typedefs[index].state = LinkState::Linked(tref);
        Ok(tref)
    }

    /// Resolves a type expression to a pool handle. `extra` overlays
    /// annotations from an enclosing typedef onto the outermost type.
    fn resolve_type(
        &mut self,
        module: ModuleId,
        expr: &TypeExpr,
        extra: Option<&Annotations>,
    ) -> SchemaResult<TypeRef> {
        match expr {
            TypeExpr::Base { base, annotations } => {
                let merged = merge_annotations(annotations, extra);
                let node = match base {
                    BaseType::Void => TypeNode::Void,
                    BaseType::Bool => TypeNode::Bool,
                    BaseType::Byte => TypeNode::Byte,
                    BaseType::I16 => TypeNode::I16,
                    BaseType::I32 => TypeNode::I32,
                    BaseType::I64 => TypeNode::I64(i64_repr(&merged)?),
                    BaseType::Double => TypeNode::Double,
                    BaseType::String => TypeNode::String,
                    BaseType::Binary => TypeNode::Binary,
                };
                Ok(match self.types.primitive(node) {
                    Some(tref) => tref,
                    None => self.types.push(node),
                })
            }
            TypeExpr::Named(ident) => match self.resolve_workdef(module, ident)? {
                WorkDef::Struct(id) => Ok(self.struct_refs[id.index()]),
                WorkDef::Enum(id) => Ok(self.enum_refs[id.index()]),
                WorkDef::Typedef(slot) => self.resolve_typedef(slot),
                WorkDef::Const(_) | WorkDef::Service(_) => Err(SchemaError::NotAType {
                    name: ident.name.clone(),
                    pos: ident.pos,
                }),
            },
            TypeExpr::List { elem, annotations: _ } => {
                let elem = self.resolve_type(module, elem, None)?;
                Ok(self.types.push(TypeNode::List { elem }))
            }
            TypeExpr::Set { elem, annotations } => {
                let merged = merge_annotations(annotations, extra);
                let repr = set_repr(&merged)?;
                let elem = self.resolve_type(module, elem, None)?;
                if repr == SetRepr::Membership && !self.membership_element(elem) {
                    return Err(SchemaError::UnsupportedMembershipElement);
                }
                Ok(self.types.push(TypeNode::Set { elem, repr }))
            }
            TypeExpr::Map {
                key,
                value,
                annotations,
            } => {
                let merged = merge_annotations(annotations, extra);
                let repr = map_repr(&merged)?;
                let key = self.resolve_type(module, key, None)?;
                let value = self.resolve_type(module, value, None)?;
                if repr == MapRepr::Mapping && !self.scalar_key(key) {
                    return Err(SchemaError::NonScalarMapKey);
                }
                Ok(self.types.push(TypeNode::Map { key, value, repr }))
            }
        }
    }

    fn membership_element(&self, tref: TypeRef) -> bool {
        matches!(
            self.types.node(tref),
            TypeNode::String | TypeNode::Byte | TypeNode::I16 | TypeNode::I32 | TypeNode::Enum(_)
        )
    }

    fn scalar_key(&self, tref: TypeRef) -> bool {
        matches!(
            self.types.node(tref),
            TypeNode::Bool
                | TypeNode::Byte
                | TypeNode::I16
                | TypeNode::I32
                | TypeNode::I64(_)
                | TypeNode::String
                | TypeNode::Binary
                | TypeNode::Enum(_)
        )
    }

    /// Resolves a possibly dotted identifier: leading segments walk include
    /// aliases, the final segment resolves in the reached module.
    fn resolve_workdef(&self, module: ModuleId, ident: &Ident) -> SchemaResult<WorkDef> {
        let mut current = module;
        let mut rest = ident.name.as_str();
        loop {
            let work = &self.modules[current.index()];
            match rest.split_once('.') {
                Some((head, tail)) => match work.includes.get(head) {
                    Some(&next) => {
                        current = next;
                        rest = tail;
                    }
                    None => break,
                },
                None => match work.defs.get(rest) {
                    Some(&def) => return Ok(def),
                    None => break,
                },
            }
        }
        Err(SchemaError::UnresolvedReference {
            module: self.modules[module.index()].path.clone(),
            name: ident.name.clone(),
            pos: ident.pos,
        })
    }

    fn resolve_const(&mut self, index: usize) -> SchemaResult<ConstId> {
        match self.const_slots[index].state {
            LinkState::Linked(id) => return Ok(id),
            LinkState::Linking => {
                return Err(SchemaError::ConstCycle {
                    name: self.const_slots[index].def.name.name.clone(),
                    pos: self.const_slots[index].def.name.pos,
                })
            }
            LinkState::Unlinked => {}
        }
        self.const_slots[index].state = LinkState::Linking;
        let module = self.const_slots[index].module;
        let def = self.const_slots[index].def.clone();
        let value_type = self.resolve_type(module, &def.value_type, None)?;
        let value = self.eval_const(module, &def.value)?;
        let id = ConstId(self.consts.len() as u32);
        self.consts.push(ConstDescriptor {
            name: def.name.name,
            value_type,
            value,
        });
        self.const_slots[index].state = LinkState::Linked(id);
        Ok(id)
    }

    /// Evaluates a constant expression to its linked value. Identifier
    /// references chase other constants; enum member references resolve to
    /// the member's name.
    fn eval_const(&mut self, module: ModuleId, expr: &ConstExpr) -> SchemaResult<ConstValue> {
        match expr {
            ConstExpr::Bool(value) => Ok(ConstValue::Bool(*value)),
            ConstExpr::Int(value) => Ok(ConstValue::Int(*value)),
            ConstExpr::Double(value) => Ok(ConstValue::Double(*value)),
            ConstExpr::String(value) => Ok(ConstValue::String(value.clone())),
            ConstExpr::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_const(module, item)?);
                }
                Ok(ConstValue::List(out))
            }
            ConstExpr::Map(pairs) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    out.push((self.eval_const(module, key)?, self.eval_const(module, value)?));
                }
                Ok(ConstValue::Map(out))
            }
            ConstExpr::Ident(ident) => self.eval_const_ref(module, ident),
        }
    }

    fn eval_const_ref(&mut self, module: ModuleId, ident: &Ident) -> SchemaResult<ConstValue> {
        // Whole name as a constant first, then the last segment as an enum
        // member of the prefix.
        if let Ok(work) = self.resolve_workdef(module, ident) {
            return match work {
                WorkDef::Const(slot) => {
                    let id = self.resolve_const(slot)?;
                    Ok(self.consts[id.index()].value.clone())
                }
                WorkDef::Struct(_) | WorkDef::Enum(_) | WorkDef::Typedef(_)
                | WorkDef::Service(_) => Err(SchemaError::NotAConstant {
                    name: ident.name.clone(),
                    pos: ident.pos,
                }),
            };
        }
        if let Some((prefix, member)) = ident.name.rsplit_once('.') {
            let prefix_ident = Ident {
                name: prefix.to_owned(),
                pos: ident.pos,
            };
            if let Ok(WorkDef::Enum(id)) = self.resolve_workdef(module, &prefix_ident) {
                let descriptor = &self.enums[id.index()];
                return if descriptor.value_of(member).is_some() {
                    Ok(ConstValue::String(member.to_owned()))
                } else {
                    Err(SchemaError::UnknownEnumMember {
                        enum_name: descriptor.name.clone(),
                        member: member.to_owned(),
                        pos: ident.pos,
                    })
                };
            }
        }
        Err(SchemaError::UnresolvedReference {
            module: self.modules[module.index()].path.clone(),
            name: ident.name.clone(),
            pos: ident.pos,
        })
    }
}

fn merge_annotations(own: &Annotations, extra: Option<&Annotations>) -> Annotations {
    match extra {
        None => own.clone(),
        Some(extra) => {
            let mut merged = own.clone();
            for (key, value) in extra {
                merged.insert(key.clone(), value.clone());
            }
            merged
        }
    }
}

/// Directory part of a path, without the trailing slash.
fn path_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// File stem: the last segment with its extension removed.
fn path_stem(path: &str) -> &str {
    let file = path.rsplit_once('/').map_or(path, |(_, file)| file);
    file.rsplit_once('.').map_or(file, |(stem, _)| stem)
}

/// Joins and lexically normalizes a relative path against a base directory.
fn normalize_path(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|&s| s != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
