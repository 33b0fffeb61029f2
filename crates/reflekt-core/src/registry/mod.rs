//! The type-metadata table: definitions keyed by name, assembled during
//! bootstrap and queried through [`TypeSystem`].

mod builtins;
mod def;
mod member;
mod name;
mod system;

pub use builtins::builtin_types;
pub use def::*;
pub use member::*;
pub use name::parse_type_name;
pub use system::*;

use crate::error::{Error, Result};
use crate::ty::{names, Ty};
use crate::value::{Record, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct RegistryState {
    defs: HashMap<String, Arc<TypeDef>>,
    order: Vec<String>,
}

/// Central registry for type information
#[derive(Default)]
pub struct TypeRegistry {
    state: RwLock<RegistryState>,
}

impl TypeRegistry {
    /// A registry holding the built-in types.
    pub fn new() -> Self {
        let registry = Self::empty();
        for def in builtin_types() {
            registry.register(def);
        }
        registry
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a definition and returns its self type.
    pub fn register(&self, def: TypeDef) -> Ty {
        let def = normalize_param_names(def);
        let self_ty = def.self_ty();
        let mut state = self.state.write();
        if state.defs.contains_key(&def.name) {
            crate::warn!("replacing registered type `{}`", def.name);
        } else {
            state.order.push(def.name.clone());
        }
        crate::debug!("registered type `{}`", self_ty);
        state.defs.insert(def.name.clone(), Arc::new(def));
        self_ty
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeDef>> {
        self.state.read().defs.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().defs.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn list_types(&self) -> Vec<String> {
        self.state.read().order.clone()
    }

    /// Default value for a slot of type `ty`: zero for primitives, a default
    /// instance for registered structs, `Null` for references.
    pub fn default_value(&self, ty: &Ty) -> Value {
        match ty.definition_name() {
            Some(names::INT) => Value::Int(0),
            Some(names::FLOAT) => Value::Float(0.0),
            Some(names::BOOL) => Value::Bool(false),
            _ if self.is_value_type(ty) => self.instantiate(ty).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Builds a default instance of a record type.
    pub fn instantiate(&self, ty: &Ty) -> Result<Value> {
        let named = ty
            .as_named()
            .ok_or_else(|| Error::type_resolution(ty.to_string(), "not a named type"))?;
        let def = self
            .get(&named.name)
            .ok_or_else(|| Error::type_resolution(ty.to_string(), "unknown type"))?;
        if ty.is_open() {
            return Err(Error::type_resolution(
                ty.to_string(),
                "cannot instantiate an open type",
            ));
        }
        if named.name == names::LIST {
            let elem = ty.args().first().cloned().unwrap_or_else(Ty::object);
            return Ok(Value::list(elem, []));
        }
        if named.name == names::ARRAY_LIST {
            return Ok(Value::untyped_list([]));
        }
        let mut record = Record::new(ty.clone());
        for owner in self.base_chain(ty) {
            let Some(owner_def) = owner.definition_name().and_then(|name| self.get(name)) else {
                continue;
            };
            for field in owner_def.record_fields() {
                let field_ty = field.ty.instantiate(&owner_def.name, owner.args());
                record
                    .fields
                    .entry(field.name.clone())
                    .or_insert_with(|| self.default_value(&field_ty));
            }
        }
        Ok(match def.kind {
            TypeKind::Struct => Value::Struct(record),
            TypeKind::Class | TypeKind::Interface => {
                Value::Object(Arc::new(RwLock::new(record)))
            }
        })
    }
}

impl TypeSystem for TypeRegistry {
    fn type_def(&self, name: &str) -> Option<Arc<TypeDef>> {
        self.get(name)
    }
}

/// Parameters referenced before their declaration carry placeholder names;
/// rewrite every occurrence with the declared name.
fn normalize_param_names(mut def: TypeDef) -> TypeDef {
    if def.params.is_empty() {
        return def;
    }
    let own_params = def.self_ty().args().to_vec();
    let name = def.name.clone();
    let rename = |ty: &Ty| ty.instantiate(&name, &own_params);
    for param in &mut def.params {
        param.constraints = param.constraints.iter().map(rename).collect();
    }
    def.base = def.base.as_ref().map(rename);
    def.interfaces = def.interfaces.iter().map(rename).collect();
    def.members = def
        .members
        .iter()
        .map(|member| member.instantiate(&name, &own_params))
        .collect();
    def
}
