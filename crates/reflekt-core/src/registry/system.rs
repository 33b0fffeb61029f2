use crate::error::Result;
use crate::registry::def::{Indexer, TypeDef, TypeKind};
use crate::registry::member::{MemberInfo, PropertyInfo};
use crate::registry::name::parse_type_name;
use crate::ty::{names, Ty};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberScope {
    pub is_static: bool,
    /// Also search the base-class chain.
    pub inherited: bool,
}

impl MemberScope {
    pub const INSTANCE: MemberScope = MemberScope {
        is_static: false,
        inherited: true,
    };
    pub const STATIC: MemberScope = MemberScope {
        is_static: true,
        inherited: true,
    };

    pub fn declared_only(mut self) -> Self {
        self.inherited = false;
        self
    }
}

/// How `[n]` reads from a value of some type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKind {
    Array(Ty),
    TypedList(Ty),
    UntypedList,
}

/// Type metadata queries consumed by the path compiler and the matcher.
///
/// Only `type_def` is required; the remaining queries are derived from the
/// definitions and may be overridden by hosts with their own rules.
pub trait TypeSystem: Send + Sync {
    fn type_def(&self, name: &str) -> Option<Arc<TypeDef>>;

    /// Resolves `Name`, `Name<Arg, ..>` and `Elem[]`. A bare generic name
    /// resolves to its generic definition.
    fn resolve_type_name(&self, name: &str) -> Result<Ty> {
        parse_type_name(name, &|def_name| self.type_def(def_name))
    }

    /// Members named `name` on `ty`, declared members first, with member types
    /// instantiated for `ty`'s type arguments.
    fn find_members(&self, ty: &Ty, name: &str, scope: MemberScope) -> Vec<MemberInfo> {
        let mut out = Vec::new();
        match ty {
            Ty::Array(_) => {
                if name == "Length" && !scope.is_static {
                    out.push(array_length());
                }
            }
            Ty::Named(_) => {
                let chain = if scope.inherited {
                    self.base_chain(ty)
                } else {
                    vec![ty.clone()]
                };
                for owner in chain {
                    let Some(named) = owner.as_named() else {
                        continue;
                    };
                    let Some(def) = self.type_def(&named.name) else {
                        continue;
                    };
                    out.extend(
                        def.declared_members(name)
                            .filter(|member| member.is_static() == scope.is_static)
                            .map(|member| member.instantiate(&def.name, &named.args)),
                    );
                }
            }
            Ty::Param(_) => {}
        }
        out
    }

    /// `ty` followed by its base classes, most derived first.
    fn base_chain(&self, ty: &Ty) -> Vec<Ty> {
        let mut chain = vec![ty.clone()];
        let mut current = ty.clone();
        while let Some(base) = self.base_of(&current) {
            if chain.contains(&base) {
                break;
            }
            chain.push(base.clone());
            current = base;
        }
        chain
    }

    fn base_of(&self, ty: &Ty) -> Option<Ty> {
        let named = ty.as_named()?;
        let def = self.type_def(&named.name)?;
        def.base
            .as_ref()
            .map(|base| base.instantiate(&def.name, &named.args))
    }

    /// Every type `ty` converts to: itself, base classes, interfaces
    /// (transitively), then `object`. Breadth-first, without duplicates.
    fn supertypes(&self, ty: &Ty) -> Vec<Ty> {
        let mut out: Vec<Ty> = Vec::new();
        let mut queue = VecDeque::from([ty.clone()]);
        while let Some(current) = queue.pop_front() {
            if out.contains(&current) {
                continue;
            }
            match &current {
                Ty::Named(named) => {
                    if let Some(def) = self.type_def(&named.name) {
                        if let Some(base) = &def.base {
                            queue.push_back(base.instantiate(&def.name, &named.args));
                        }
                        for interface in &def.interfaces {
                            queue.push_back(interface.instantiate(&def.name, &named.args));
                        }
                    }
                }
                Ty::Array(elem) => {
                    queue.push_back(Ty::enumerable(elem.as_ref().clone()));
                    queue.push_back(Ty::named(names::LIST_INTERFACE));
                }
                Ty::Param(_) => {}
            }
            out.push(current);
        }
        let object = Ty::object();
        if !matches!(ty, Ty::Param(_)) && !out.contains(&object) {
            out.push(object);
        }
        out
    }

    fn is_assignable(&self, to: &Ty, from: &Ty) -> bool {
        if to == from || (to.is_object() && !from.is_void()) {
            return true;
        }
        self.supertypes(from).contains(to)
    }

    fn is_value_type(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Named(named) => self
                .type_def(&named.name)
                .map(|def| def.kind == TypeKind::Struct)
                .unwrap_or(false),
            _ => false,
        }
    }

    fn is_reference_type(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Named(named) => self
                .type_def(&named.name)
                .map(|def| def.kind != TypeKind::Struct)
                .unwrap_or(false),
            Ty::Array(_) => true,
            Ty::Param(_) => false,
        }
    }

    fn has_default_constructor(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Named(named) => self
                .type_def(&named.name)
                .map(|def| def.kind == TypeKind::Struct || def.default_constructible)
                .unwrap_or(false),
            _ => false,
        }
    }

    fn index_kind(&self, ty: &Ty) -> Option<IndexKind> {
        if let Ty::Array(elem) = ty {
            return Some(IndexKind::Array(elem.as_ref().clone()));
        }
        self.supertypes(ty).into_iter().find_map(|sup| {
            let named = sup.as_named()?;
            let def = self.type_def(&named.name)?;
            match def.indexer {
                Indexer::Typed => Some(IndexKind::TypedList(
                    named.args.first().cloned().unwrap_or_else(Ty::object),
                )),
                Indexer::Untyped => Some(IndexKind::UntypedList),
                Indexer::None => None,
            }
        })
    }
}

fn array_length() -> MemberInfo {
    PropertyInfo::new("Length", Ty::int(), |owner| {
        Ok(Value::Int(owner.len()? as i64))
    })
    .into()
}
