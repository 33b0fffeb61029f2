use reflekt_core::error::{Error, Result};
use reflekt_core::registry::{FieldInfo, MethodInfo, PropertyInfo};
use reflekt_core::{Ty, Value};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

#[derive(Clone)]
pub enum MemberRef {
    Field(Arc<FieldInfo>),
    Property(Arc<PropertyInfo>),
    /// A call with its literal arguments bound at parse time.
    Method {
        method: Arc<MethodInfo>,
        args: Vec<Value>,
    },
}

impl MemberRef {
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Field(field) => &field.name,
            MemberRef::Property(prop) => &prop.name,
            MemberRef::Method { method, .. } => &method.name,
        }
    }
}

impl Debug for MemberRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRef::Field(field) => write!(f, "Field({})", field.name),
            MemberRef::Property(prop) => write!(f, "Property({})", prop.name),
            MemberRef::Method { method, args } => {
                write!(f, "Method({}, {} args)", method.signature(), args.len())
            }
        }
    }
}

/// One traversal unit of a compiled path.
#[derive(Debug, Clone)]
pub enum PathStep {
    Member {
        member: MemberRef,
        is_static: bool,
        result_ty: Ty,
    },
    ArrayElement {
        index: usize,
        elem_ty: Ty,
    },
    TypedListElement {
        index: usize,
        elem_ty: Ty,
    },
    UntypedListElement {
        index: usize,
    },
}

impl PathStep {
    pub fn result_ty(&self) -> Ty {
        match self {
            PathStep::Member { result_ty, .. } => result_ty.clone(),
            PathStep::ArrayElement { elem_ty, .. } | PathStep::TypedListElement { elem_ty, .. } => {
                elem_ty.clone()
            }
            PathStep::UntypedListElement { .. } => Ty::object(),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, PathStep::Member { is_static: true, .. })
    }

    /// Whether the step may be the target of a setter.
    pub fn is_writable(&self) -> bool {
        match self {
            PathStep::Member { member, .. } => match member {
                MemberRef::Field(field) => !field.readonly,
                MemberRef::Property(prop) => prop.set.is_some(),
                MemberRef::Method { .. } => false,
            },
            _ => false,
        }
    }

    /// Whether a modified copy of this step's value can be stored back into
    /// its owner. Element steps write into their shared collection.
    pub fn propagates_writes(&self) -> bool {
        match self {
            PathStep::Member { .. } => self.is_writable(),
            _ => true,
        }
    }

    /// Why the step cannot be written, for error messages.
    pub fn read_only_reason(&self) -> String {
        match self {
            PathStep::Member { member, .. } => match member {
                MemberRef::Field(field) => format!("field `{}` is read-only", field.name),
                MemberRef::Property(prop) => format!("property `{}` has no setter", prop.name),
                MemberRef::Method { method, .. } => format!("`{}` is a method call", method.name),
            },
            _ => format!("element access `{}` cannot be assigned", self),
        }
    }

    pub fn read(&self, current: &Value) -> Result<Value> {
        match self {
            PathStep::Member {
                member, is_static, ..
            } => {
                let null = Value::Null;
                let receiver = if *is_static {
                    &null
                } else if current.is_null() {
                    return Err(Error::NullReference {
                        segment: member.name().to_string(),
                    });
                } else {
                    current
                };
                match member {
                    MemberRef::Field(field) => (field.get)(receiver),
                    MemberRef::Property(prop) => (prop.get)(receiver),
                    MemberRef::Method { method, args } => (method.invoke)(receiver, args),
                }
            }
            PathStep::ArrayElement { index, .. } => {
                self.expect_shape(current, matches!(current, Value::Array(_)), "array")?;
                current.element(*index)
            }
            PathStep::TypedListElement { index, .. } | PathStep::UntypedListElement { index } => {
                self.expect_shape(current, matches!(current, Value::List(_)), "list")?;
                current.element(*index)
            }
        }
    }

    /// Stores `value` through this step and returns the owner to write back.
    pub fn write(&self, owner: Value, value: Value) -> Result<Value> {
        match self {
            PathStep::Member {
                member, is_static, ..
            } => {
                let owner = if *is_static {
                    Value::Null
                } else if owner.is_null() {
                    return Err(Error::NullReference {
                        segment: member.name().to_string(),
                    });
                } else {
                    owner
                };
                match member {
                    MemberRef::Field(field) if !field.readonly => (field.set)(owner, value),
                    MemberRef::Property(prop) => match &prop.set {
                        Some(set) => set(owner, value),
                        None => Err(Error::not_writable(
                            self.to_string(),
                            self.read_only_reason(),
                        )),
                    },
                    _ => Err(Error::not_writable(
                        self.to_string(),
                        self.read_only_reason(),
                    )),
                }
            }
            PathStep::ArrayElement { index, .. }
            | PathStep::TypedListElement { index, .. }
            | PathStep::UntypedListElement { index } => owner.with_element(*index, value),
        }
    }

    fn expect_shape(&self, current: &Value, ok: bool, shape: &str) -> Result<()> {
        if ok {
            Ok(())
        } else if current.is_null() {
            Err(Error::NullReference {
                segment: self.to_string(),
            })
        } else {
            Err(Error::type_mismatch(shape, current.type_of()))
        }
    }
}

impl Display for PathStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathStep::Member { member, .. } => f.write_str(member.name()),
            PathStep::ArrayElement { index, .. }
            | PathStep::TypedListElement { index, .. }
            | PathStep::UntypedListElement { index } => write!(f, "[{}]", index),
        }
    }
}

/// An immutable, reusable path compiled against a root type.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    pub root: Ty,
    pub text: String,
    pub is_static: bool,
    pub steps: Vec<PathStep>,
}

impl CompiledPath {
    pub fn result_ty(&self) -> Ty {
        self.steps
            .last()
            .map(PathStep::result_ty)
            .unwrap_or_else(|| self.root.clone())
    }

    pub fn last_step(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Display for CompiledPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
