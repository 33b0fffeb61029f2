use crate::registry::member::{FieldInfo, MemberInfo, MethodInfo, PropertyInfo};
use crate::ty::Ty;
use crate::value::Value;
use derive_more::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference semantics.
    Class,
    /// Value semantics: copied on read, written back on mutation.
    Struct,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indexer {
    #[default]
    None,
    /// `[n]` yields type argument 0.
    Typed,
    /// `[n]` yields `object`.
    Untyped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialConstraints {
    pub reference_type: bool,
    pub value_type: bool,
    pub default_constructor: bool,
}

impl SpecialConstraints {
    pub fn is_empty(&self) -> bool {
        !self.reference_type && !self.value_type && !self.default_constructor
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParamDef {
    pub name: String,
    pub special: SpecialConstraints,
    /// Constraint types; parameters of the declaring definition may appear.
    pub constraints: Vec<Ty>,
}

impl GenericParamDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            special: SpecialConstraints::default(),
            constraints: Vec::new(),
        }
    }
    pub fn reference_type(mut self) -> Self {
        self.special.reference_type = true;
        self
    }
    pub fn value_type(mut self) -> Self {
        self.special.value_type = true;
        self
    }
    pub fn default_constructor(mut self) -> Self {
        self.special.default_constructor = true;
        self
    }
    pub fn constraint(mut self, ty: Ty) -> Self {
        self.constraints.push(ty);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub params: Vec<GenericParamDef>,
    pub base: Option<Ty>,
    pub interfaces: Vec<Ty>,
    pub default_constructible: bool,
    pub indexer: Indexer,
    pub members: Vec<MemberInfo>,
}

impl TypeDef {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            default_constructible: kind == TypeKind::Struct,
            indexer: Indexer::None,
            members: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// The `Param` referring to this definition's parameter at `index`.
    /// Parameters must be declared before being referenced.
    pub fn param_ty(&self, index: usize) -> Ty {
        let name = self
            .params
            .get(index)
            .map(|param| param.name.clone())
            .unwrap_or_else(|| format!("T{}", index));
        Ty::param(self.name.clone(), index, name)
    }

    /// `Name` for plain types, `Name<P0, ..>` (the generic definition) otherwise.
    pub fn self_ty(&self) -> Ty {
        Ty::generic(
            self.name.clone(),
            (0..self.params.len()).map(|idx| self.param_ty(idx)),
        )
    }

    pub fn is_generic(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn generic_param(mut self, param: GenericParamDef) -> Self {
        self.params.push(param);
        self
    }

    /// Declares a parameter whose constraints may mention the parameters of
    /// `self`, including ones declared later (through `param_ty`).
    pub fn generic_param_with(
        mut self,
        name: impl Into<String>,
        build: impl FnOnce(&TypeDef, GenericParamDef) -> GenericParamDef,
    ) -> Self {
        let param = build(&self, GenericParamDef::new(name));
        self.params.push(param);
        self
    }

    pub fn base(mut self, base: Ty) -> Self {
        self.base = Some(base);
        self
    }
    pub fn implements(mut self, interface: Ty) -> Self {
        self.interfaces.push(interface);
        self
    }
    pub fn default_constructible(mut self) -> Self {
        self.default_constructible = true;
        self
    }
    pub fn indexer(mut self, indexer: Indexer) -> Self {
        self.indexer = indexer;
        self
    }

    pub fn member(mut self, member: impl Into<MemberInfo>) -> Self {
        self.members.push(member.into());
        self
    }
    pub fn field(self, name: impl Into<String>, ty: Ty) -> Self {
        self.member(FieldInfo::record(name, ty))
    }
    pub fn readonly_field(self, name: impl Into<String>, ty: Ty) -> Self {
        self.member(FieldInfo::record(name, ty).readonly())
    }
    pub fn static_field(self, name: impl Into<String>, ty: Ty, initial: Value) -> Self {
        self.member(FieldInfo::static_slot(name, ty, initial))
    }
    pub fn property(self, property: PropertyInfo) -> Self {
        self.member(property)
    }
    pub fn method(self, method: MethodInfo) -> Self {
        self.member(method)
    }

    pub fn declared_members<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberInfo> {
        self.members.iter().filter(move |member| member.name() == name)
    }

    /// Record-backed instance fields, in declaration order.
    pub fn record_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.members.iter().filter_map(|member| match member {
            MemberInfo::Field(field) if !field.is_static => Some(field.as_ref()),
            _ => None,
        })
    }
}
