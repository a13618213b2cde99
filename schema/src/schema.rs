//! The linked schema: modules, descriptor tables, and name lookup.

use std::collections::{BTreeMap, HashMap};

use crate::ast::Annotations;
use crate::consts::ConstDescriptor;
use crate::enums::EnumDescriptor;
use crate::field::StructDescriptor;
use crate::types::{ConstId, EnumId, ModuleId, ServiceId, StructId, TypeNode, TypePool, TypeRef};
use wire::TypeId;

/// What a module-level name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedDef {
    Struct(StructId),
    Enum(EnumId),
    /// Typedefs are collapsed at link time; the name points straight at the
    /// target descriptor.
    Typedef(TypeRef),
    Const(ConstId),
    Service(ServiceId),
}

/// One compiled module's namespace.
#[derive(Debug, Clone)]
pub struct Module {
    /// Normalized loader path.
    pub path: String,
    /// Default include alias, the path's file stem.
    pub name: String,
    pub(crate) defs: BTreeMap<String, NamedDef>,
    pub(crate) includes: BTreeMap<String, ModuleId>,
}

impl Module {
    /// Resolves an unqualified name in this module's own namespace.
    #[must_use]
    pub fn def(&self, name: &str) -> Option<NamedDef> {
        self.defs.get(name).copied()
    }

    /// Resolves an include alias to the included module.
    #[must_use]
    pub fn include(&self, alias: &str) -> Option<ModuleId> {
        self.includes.get(alias).copied()
    }

    /// Iterates definitions in name order.
    pub fn defs(&self) -> impl Iterator<Item = (&str, NamedDef)> {
        self.defs.iter().map(|(name, def)| (name.as_str(), *def))
    }
}

/// A linked service function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Synthesized argument struct.
    pub args: StructId,
    /// Synthesized result struct; `None` for oneway functions.
    pub result: Option<StructId>,
    pub oneway: bool,
}

/// A linked service.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub name: String,
    pub functions: Vec<FunctionDescriptor>,
    pub annotations: Annotations,
    by_name: HashMap<String, usize>,
}

impl ServiceDescriptor {
    #[must_use]
    pub fn new(
        name: String,
        functions: Vec<FunctionDescriptor>,
        annotations: Annotations,
    ) -> Self {
        let by_name = functions
            .iter()
            .enumerate()
            .map(|(index, function)| (function.name.clone(), index))
            .collect();
        Self {
            name,
            functions,
            annotations,
            by_name,
        }
    }

    /// Looks up a function by wire name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.by_name.get(name).map(|&index| &self.functions[index])
    }
}

/// The immutable result of a successful compile.
///
/// All descriptor tables are index-addressed by the handle types; cyclic
/// type graphs are represented by handles, never by owned recursion.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) types: TypePool,
    pub(crate) structs: Vec<StructDescriptor>,
    pub(crate) struct_refs: Vec<TypeRef>,
    pub(crate) enums: Vec<EnumDescriptor>,
    pub(crate) enum_refs: Vec<TypeRef>,
    pub(crate) services: Vec<ServiceDescriptor>,
    pub(crate) consts: Vec<ConstDescriptor>,
    pub(crate) modules: Vec<Module>,
    pub(crate) root: ModuleId,
}

impl Schema {
    /// Returns the descriptor behind a type handle.
    #[must_use]
    pub fn node(&self, tref: TypeRef) -> &TypeNode {
        self.types.node(tref)
    }

    /// Returns the wire type tag for values of a descriptor.
    #[must_use]
    pub fn wire_type(&self, tref: TypeRef) -> TypeId {
        self.node(tref).wire_type()
    }

    /// Returns the static encoded width of a value, when one exists.
    #[must_use]
    pub fn fixed_value_width(&self, tref: TypeRef) -> Option<usize> {
        self.node(tref).fixed_width()
    }

    #[must_use]
    pub fn struct_desc(&self, id: StructId) -> &StructDescriptor {
        &self.structs[id.index()]
    }

    /// Returns the type handle whose node is `Struct(id)`.
    #[must_use]
    pub fn struct_ref(&self, id: StructId) -> TypeRef {
        self.struct_refs[id.index()]
    }

    #[must_use]
    pub fn enum_desc(&self, id: EnumId) -> &EnumDescriptor {
        &self.enums[id.index()]
    }

    /// Returns the type handle whose node is `Enum(id)`.
    #[must_use]
    pub fn enum_ref(&self, id: EnumId) -> TypeRef {
        self.enum_refs[id.index()]
    }

    #[must_use]
    pub fn service_desc(&self, id: ServiceId) -> &ServiceDescriptor {
        &self.services[id.index()]
    }

    #[must_use]
    pub fn const_desc(&self, id: ConstId) -> &ConstDescriptor {
        &self.consts[id.index()]
    }

    #[must_use]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    /// The entry-point module the compile started from.
    #[must_use]
    pub const fn root(&self) -> ModuleId {
        self.root
    }

    #[must_use]
    pub fn root_module(&self) -> &Module {
        self.module(self.root)
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDescriptor> {
        self.structs.iter()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.iter()
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn consts(&self) -> impl Iterator<Item = &ConstDescriptor> {
        self.consts.iter()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Resolves a possibly dotted name starting from a module.
    ///
    /// Leading segments walk include aliases; the final segment resolves in
    /// the reached module's own namespace.
    #[must_use]
    pub fn lookup(&self, from: ModuleId, dotted: &str) -> Option<NamedDef> {
        let mut module = self.module(from);
        let mut rest = dotted;
        while let Some((head, tail)) = rest.split_once('.') {
            module = self.module(module.include(head)?);
            rest = tail;
        }
        module.def(rest)
    }

    /// Resolves a dotted name from the root module to a type handle.
    #[must_use]
    pub fn lookup_type(&self, dotted: &str) -> Option<TypeRef> {
        match self.lookup(self.root, dotted)? {
            NamedDef::Struct(id) => Some(self.struct_ref(id)),
            NamedDef::Enum(id) => Some(self.enum_ref(id)),
            NamedDef::Typedef(tref) => Some(tref),
            NamedDef::Const(_) | NamedDef::Service(_) => None,
        }
    }

    /// Resolves a dotted name from the root module to a service.
    #[must_use]
    pub fn lookup_service(&self, dotted: &str) -> Option<ServiceId> {
        match self.lookup(self.root, dotted)? {
            NamedDef::Service(id) => Some(id),
            _ => None,
        }
    }
}
