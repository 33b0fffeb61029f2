use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Names of the types bootstrapped by `TypeRegistry::new`.
pub mod names {
    pub const OBJECT: &str = "object";
    pub const VOID: &str = "void";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const BOOL: &str = "bool";
    pub const STRING: &str = "string";
    pub const ENUMERABLE: &str = "IEnumerable";
    pub const LIST_INTERFACE: &str = "IList";
    pub const LIST: &str = "List";
    pub const ARRAY_LIST: &str = "ArrayList";
}

/// An unresolved generic parameter, identified by its declaring definition
/// and position. The name is display-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TyParam {
    pub owner: String,
    pub index: usize,
    pub name: String,
}

impl PartialEq for TyParam {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.owner == other.owner
    }
}
impl Eq for TyParam {}
impl std::hash::Hash for TyParam {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.index.hash(state);
    }
}
impl PartialOrd for TyParam {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for TyParam {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.owner, self.index).cmp(&(&other.owner, other.index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamedTy {
    pub name: String,
    pub args: Vec<Ty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ty {
    Named(NamedTy),
    Array(Box<Ty>),
    Param(TyParam),
}

impl Ty {
    pub fn named(name: impl Into<String>) -> Ty {
        Ty::Named(NamedTy {
            name: name.into(),
            args: Vec::new(),
        })
    }
    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = Ty>) -> Ty {
        Ty::Named(NamedTy {
            name: name.into(),
            args: args.into_iter().collect(),
        })
    }
    pub fn array(elem: Ty) -> Ty {
        Ty::Array(Box::new(elem))
    }
    pub fn param(owner: impl Into<String>, index: usize, name: impl Into<String>) -> Ty {
        Ty::Param(TyParam {
            owner: owner.into(),
            index,
            name: name.into(),
        })
    }

    pub fn object() -> Ty {
        Ty::named(names::OBJECT)
    }
    pub fn void() -> Ty {
        Ty::named(names::VOID)
    }
    pub fn int() -> Ty {
        Ty::named(names::INT)
    }
    pub fn float() -> Ty {
        Ty::named(names::FLOAT)
    }
    pub fn bool() -> Ty {
        Ty::named(names::BOOL)
    }
    pub fn string() -> Ty {
        Ty::named(names::STRING)
    }
    pub fn list(elem: Ty) -> Ty {
        Ty::generic(names::LIST, [elem])
    }
    pub fn enumerable(elem: Ty) -> Ty {
        Ty::generic(names::ENUMERABLE, [elem])
    }
    pub fn array_list() -> Ty {
        Ty::named(names::ARRAY_LIST)
    }

    pub fn as_named(&self) -> Option<&NamedTy> {
        match self {
            Ty::Named(named) => Some(named),
            _ => None,
        }
    }
    pub fn as_param(&self) -> Option<&TyParam> {
        match self {
            Ty::Param(param) => Some(param),
            _ => None,
        }
    }
    /// Name of the generic definition (or plain type) this type instantiates.
    pub fn definition_name(&self) -> Option<&str> {
        self.as_named().map(|named| named.name.as_str())
    }
    pub fn args(&self) -> &[Ty] {
        match self {
            Ty::Named(named) => &named.args,
            _ => &[],
        }
    }
    pub fn is_object(&self) -> bool {
        matches!(self, Ty::Named(named) if named.name == names::OBJECT && named.args.is_empty())
    }
    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Named(named) if named.name == names::VOID && named.args.is_empty())
    }

    /// True if any `Param` occurs in the type.
    pub fn is_open(&self) -> bool {
        match self {
            Ty::Named(named) => named.args.iter().any(Ty::is_open),
            Ty::Array(elem) => elem.is_open(),
            Ty::Param(_) => true,
        }
    }

    /// True for `Name<P0, P1, ..>` where every argument is the definition's own
    /// parameter at its own position.
    pub fn is_generic_definition(&self) -> bool {
        match self {
            Ty::Named(named) if !named.args.is_empty() => {
                named.args.iter().enumerate().all(|(idx, arg)| {
                    matches!(arg, Ty::Param(p) if p.owner == named.name && p.index == idx)
                })
            }
            _ => false,
        }
    }

    /// Distinct parameters in first-occurrence order.
    pub fn params(&self) -> Vec<TyParam> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params(&self, out: &mut Vec<TyParam>) {
        match self {
            Ty::Named(named) => named.args.iter().for_each(|arg| arg.collect_params(out)),
            Ty::Array(elem) => elem.collect_params(out),
            Ty::Param(param) => {
                if !out.contains(param) {
                    out.push(param.clone());
                }
            }
        }
    }

    pub fn mentions(&self, param: &TyParam) -> bool {
        match self {
            Ty::Named(named) => named.args.iter().any(|arg| arg.mentions(param)),
            Ty::Array(elem) => elem.mentions(param),
            Ty::Param(p) => p == param,
        }
    }

    /// Replaces every parameter for which `f` yields a type.
    pub fn substitute(&self, f: &impl Fn(&TyParam) -> Option<Ty>) -> Ty {
        match self {
            Ty::Named(named) => Ty::Named(NamedTy {
                name: named.name.clone(),
                args: named.args.iter().map(|arg| arg.substitute(f)).collect(),
            }),
            Ty::Array(elem) => Ty::Array(Box::new(elem.substitute(f))),
            Ty::Param(param) => f(param).unwrap_or_else(|| self.clone()),
        }
    }

    /// Substitutes the parameters of definition `owner` positionally.
    pub fn instantiate(&self, owner: &str, args: &[Ty]) -> Ty {
        self.substitute(&|param| {
            if param.owner == owner {
                args.get(param.index).cloned()
            } else {
                None
            }
        })
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Named(named) if named.args.is_empty() => f.write_str(&named.name),
            Ty::Named(named) => write!(f, "{}<{}>", named.name, named.args.iter().join(", ")),
            Ty::Array(elem) => write!(f, "{}[]", elem),
            Ty::Param(param) => f.write_str(&param.name),
        }
    }
}

impl Display for TyParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
