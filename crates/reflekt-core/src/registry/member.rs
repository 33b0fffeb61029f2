use crate::error::Result;
use crate::ty::Ty;
use crate::value::Value;
use derive_more::Display;
use parking_lot::RwLock;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Reads a member from its owner (`Value::Null` for statics).
pub type GetFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;
/// Writes a member and returns the owner value to store back.
pub type SetFn = Arc<dyn Fn(Value, Value) -> Result<Value> + Send + Sync>;
/// Invokes a method on a receiver (`Value::Null` for statics).
pub type InvokeFn = Arc<dyn Fn(&Value, &[Value]) -> Result<Value> + Send + Sync>;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Method,
}

#[derive(Clone)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Ty,
    pub is_static: bool,
    pub readonly: bool,
    pub get: GetFn,
    pub set: SetFn,
}

impl FieldInfo {
    /// Instance field stored in the owner's record.
    pub fn record(name: impl Into<String>, ty: Ty) -> Self {
        let name = name.into();
        let read_name = name.clone();
        let write_name = name.clone();
        Self {
            name,
            ty,
            is_static: false,
            readonly: false,
            get: Arc::new(move |owner| owner.field(&read_name)),
            set: Arc::new(move |owner, value| owner.with_field(&write_name, value)),
        }
    }

    /// Static field backed by its own slot.
    pub fn static_slot(name: impl Into<String>, ty: Ty, initial: Value) -> Self {
        let slot = Arc::new(RwLock::new(initial));
        let read_slot = slot.clone();
        Self {
            name: name.into(),
            ty,
            is_static: true,
            readonly: false,
            get: Arc::new(move |_| Ok(read_slot.read().clone())),
            set: Arc::new(move |_, value| {
                *slot.write() = value;
                Ok(Value::Null)
            }),
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

#[derive(Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: Ty,
    pub is_static: bool,
    pub get: GetFn,
    pub set: Option<SetFn>,
}

impl PropertyInfo {
    pub fn new(
        name: impl Into<String>,
        ty: Ty,
        get: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            get: Arc::new(get),
            set: None,
        }
    }

    pub fn with_setter(
        mut self,
        set: impl Fn(Value, Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.set = Some(Arc::new(set));
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: Ty,
}

#[derive(Clone)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub ret: Ty,
    pub is_static: bool,
    pub invoke: InvokeFn,
}

impl MethodInfo {
    pub fn new<N: Into<String>>(
        name: impl Into<String>,
        params: impl IntoIterator<Item = (N, Ty)>,
        ret: Ty,
        invoke: impl Fn(&Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: params
                .into_iter()
                .map(|(name, ty)| ParamInfo {
                    name: name.into(),
                    ty,
                })
                .collect(),
            ret,
            is_static: false,
            invoke: Arc::new(invoke),
        }
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn signature(&self) -> String {
        format!(
            "{}({})",
            self.name,
            self.params
                .iter()
                .map(|param| param.ty.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[derive(Clone)]
pub enum MemberInfo {
    Field(Arc<FieldInfo>),
    Property(Arc<PropertyInfo>),
    Method(Arc<MethodInfo>),
}

impl MemberInfo {
    pub fn name(&self) -> &str {
        match self {
            MemberInfo::Field(field) => &field.name,
            MemberInfo::Property(prop) => &prop.name,
            MemberInfo::Method(method) => &method.name,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            MemberInfo::Field(_) => MemberKind::Field,
            MemberInfo::Property(_) => MemberKind::Property,
            MemberInfo::Method(_) => MemberKind::Method,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            MemberInfo::Field(field) => field.is_static,
            MemberInfo::Property(prop) => prop.is_static,
            MemberInfo::Method(method) => method.is_static,
        }
    }

    /// Field/property type, or a method's return type.
    pub fn ty(&self) -> &Ty {
        match self {
            MemberInfo::Field(field) => &field.ty,
            MemberInfo::Property(prop) => &prop.ty,
            MemberInfo::Method(method) => &method.ret,
        }
    }

    /// Rewrites the member's types for a concrete instantiation of its owner.
    /// Accessor functions are shared with the declaration.
    pub fn instantiate(&self, owner: &str, args: &[Ty]) -> MemberInfo {
        if args.is_empty() {
            return self.clone();
        }
        match self {
            MemberInfo::Field(field) => MemberInfo::Field(Arc::new(FieldInfo {
                ty: field.ty.instantiate(owner, args),
                ..FieldInfo::clone(field)
            })),
            MemberInfo::Property(prop) => MemberInfo::Property(Arc::new(PropertyInfo {
                ty: prop.ty.instantiate(owner, args),
                ..PropertyInfo::clone(prop)
            })),
            MemberInfo::Method(method) => MemberInfo::Method(Arc::new(MethodInfo {
                params: method
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        name: param.name.clone(),
                        ty: param.ty.instantiate(owner, args),
                    })
                    .collect(),
                ret: method.ret.instantiate(owner, args),
                ..MethodInfo::clone(method)
            })),
        }
    }
}

impl Debug for MemberInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberInfo::Method(method) => write!(f, "Method({})", method.signature()),
            other => write!(f, "{}({}: {})", other.kind(), other.name(), other.ty()),
        }
    }
}

impl From<FieldInfo> for MemberInfo {
    fn from(field: FieldInfo) -> Self {
        MemberInfo::Field(Arc::new(field))
    }
}
impl From<PropertyInfo> for MemberInfo {
    fn from(prop: PropertyInfo) -> Self {
        MemberInfo::Property(Arc::new(prop))
    }
}
impl From<MethodInfo> for MemberInfo {
    fn from(method: MethodInfo) -> Self {
        MemberInfo::Method(Arc::new(method))
    }
}
