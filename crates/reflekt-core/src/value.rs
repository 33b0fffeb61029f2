//! Dynamic values with explicit value/reference semantics.
//!
//! `Struct` records are copied whenever they are read out of an owner, so a
//! write on an intermediate struct has to be written back by the caller.
//! `Object`, `Array` and `List` share their payload behind `Arc<RwLock<_>>`.
//!
//! Objects compare and print by identity once nested, so object graphs may
//! refer back to themselves. A sequence must not contain itself.

use crate::error::{Error, Result};
use crate::ty::Ty;
use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub ty: Ty,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(ty: Ty) -> Self {
        Self {
            ty,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_fields<K: Into<String>>(
        ty: Ty,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Self {
            ty,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    /// `None` for untyped lists.
    pub elem: Option<Ty>,
    pub items: Vec<Value>,
}

pub type SharedRecord = Arc<RwLock<Record>>;
pub type SharedSequence = Arc<RwLock<Sequence>>;

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Struct(Record),
    Object(SharedRecord),
    Array(SharedSequence),
    List(SharedSequence),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    pub fn structure<K: Into<String>>(
        ty: Ty,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        Value::Struct(Record::with_fields(ty, fields))
    }

    pub fn object<K: Into<String>>(
        ty: Ty,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        Value::Object(Arc::new(RwLock::new(Record::with_fields(ty, fields))))
    }

    pub fn array(elem: Ty, items: impl IntoIterator<Item = Value>) -> Value {
        Value::Array(Arc::new(RwLock::new(Sequence {
            elem: Some(elem),
            items: items.into_iter().collect(),
        })))
    }

    pub fn list(elem: Ty, items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(Arc::new(RwLock::new(Sequence {
            elem: Some(elem),
            items: items.into_iter().collect(),
        })))
    }

    pub fn untyped_list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(Arc::new(RwLock::new(Sequence {
            elem: None,
            items: items.into_iter().collect(),
        })))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type of the value. `Null` reports `object`.
    pub fn type_of(&self) -> Ty {
        match self {
            Value::Null => Ty::object(),
            Value::Bool(_) => Ty::bool(),
            Value::Int(_) => Ty::int(),
            Value::Float(_) => Ty::float(),
            Value::String(_) => Ty::string(),
            Value::Struct(record) => record.ty.clone(),
            Value::Object(record) => record.read().ty.clone(),
            Value::Array(seq) => Ty::array(seq.read().elem.clone().unwrap_or_else(Ty::object)),
            Value::List(seq) => match &seq.read().elem {
                Some(elem) => Ty::list(elem.clone()),
                None => Ty::array_list(),
            },
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Reads a record field. Struct fields are returned as copies.
    pub fn field(&self, name: &str) -> Result<Value> {
        let found = match self {
            Value::Struct(record) => record.fields.get(name).cloned(),
            Value::Object(record) => record.read().fields.get(name).cloned(),
            Value::Null => return Err(Error::NullReference { segment: name.into() }),
            other => return Err(Error::type_mismatch("record", other.type_of())),
        };
        found.ok_or_else(|| Error::member_not_found(self.type_of(), name))
    }

    /// Writes a record field and returns the owner to store back: a modified
    /// copy for structs, the same shared handle for objects.
    pub fn with_field(self, name: &str, value: Value) -> Result<Value> {
        match self {
            Value::Struct(mut record) => {
                record.fields.insert(name.to_string(), value);
                Ok(Value::Struct(record))
            }
            Value::Object(record) => {
                record.write().fields.insert(name.to_string(), value);
                Ok(Value::Object(record))
            }
            Value::Null => Err(Error::NullReference { segment: name.into() }),
            other => Err(Error::type_mismatch("record", other.type_of())),
        }
    }

    fn sequence(&self) -> Result<&SharedSequence> {
        match self {
            Value::Array(seq) | Value::List(seq) => Ok(seq),
            Value::Null => Err(Error::NullReference {
                segment: "[]".into(),
            }),
            other => Err(Error::type_mismatch("array or list", other.type_of())),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.sequence()?.read().items.len())
    }

    pub fn element(&self, index: usize) -> Result<Value> {
        let seq = self.sequence()?.read();
        seq.items.get(index).cloned().ok_or(Error::IndexOutOfRange {
            index,
            len: seq.items.len(),
        })
    }

    /// Stores an element in place; sequences are always shared, so the
    /// returned owner is the receiver itself.
    pub fn with_element(self, index: usize, value: Value) -> Result<Value> {
        {
            let mut seq = self.sequence()?.write();
            let len = seq.items.len();
            let slot = seq
                .items
                .get_mut(index)
                .ok_or(Error::IndexOutOfRange { index, len })?;
            *slot = value;
        }
        Ok(self)
    }

    /// True when values of this shape are copied on read.
    pub fn has_value_semantics(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Struct(_)
        )
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b).is_eq(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) | (Value::List(a), Value::List(b)) => {
                Arc::ptr_eq(a, b) || *a.read() == *b.read()
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

fn fmt_record(f: &mut Formatter<'_>, record: &Record) -> std::fmt::Result {
    write!(
        f,
        "{} {{ {} }}",
        record.ty,
        record
            .fields
            .iter()
            .map(|(name, value)| format!("{}: {}", name, Nested(value)))
            .join(", ")
    )
}

/// Prints a value reached through an owner; objects show only their type.
struct Nested<'a>(&'a Value);

impl Display for Nested<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Value::Object(record) => write!(f, "&{}", record.read_recursive().ty),
            other => Display::fmt(other, f),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Struct(record) => fmt_record(f, record),
            Value::Object(record) => fmt_record(f, &record.read()),
            Value::Array(seq) | Value::List(seq) => {
                write!(f, "[{}]", seq.read().items.iter().map(Nested).join(", "))
            }
        }
    }
}
