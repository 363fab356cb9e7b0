//! Dynamic values seen by the template evaluator.
//!
//! Templates are evaluated without static type knowledge, so every receiver,
//! argument and result is a [`Value`]. Content-model types plug in through the
//! [`Object`] trait, which exposes methods by name and answers capability
//! queries for identity tracking instead of relying on reflection.

pub mod params;

pub use params::Params;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::ExecContext;
use crate::funcs::{CallError, Signature};
use crate::identity::{IdentitiesByNameProvider, IdentitiesProvider, IdentityProvider};

/// A dynamically typed template value.
///
/// Containers are reference counted so cloning a value is cheap; nested
/// template invocations pass values around freely.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    List(Arc<Vec<Value>>),
    /// Generic map with exact, case-sensitive keys.
    Map(Arc<BTreeMap<String, Value>>),
    /// Case-insensitive configuration map.
    Params(Params),
    Object(Arc<dyn Object>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    pub fn map(map: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(map))
    }

    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn Object>> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Whether the value can be indexed by key (`Map` or `Params`).
    pub fn is_map_like(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Params(_))
    }

    /// Template truthiness: nil, false, zero and empty values are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Params(params) => !params.is_empty(),
            Value::Object(_) => true,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Params(_) => "params",
            Value::Object(object) => object.type_name(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Params(params) => fmt::Debug::fmt(params, f),
            Value::Object(object) => write!(f, "Object({object:?})"),
        }
    }
}

/// Renders values the way they appear in template output.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => write_entries(f, map.iter()),
            Value::Params(params) => write_entries(f, params.iter()),
            Value::Object(object) => match object.to_text() {
                Some(text) => f.write_str(&text),
                None => write!(f, "<{}>", object.type_name()),
            },
        }
    }
}

fn write_entries<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> fmt::Result {
    f.write_str("map[")?;
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{key}:{value}")?;
    }
    f.write_str("]")
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Params(a), Value::Params(b)) => a == b,
            // Objects compare by identity of the underlying allocation.
            (Value::Object(a), Value::Object(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Self {
        Value::Params(params)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::list(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// A content-model value with methods resolvable by name.
///
/// The `as_*` methods are capability queries: an implementor returns `Some(self)`
/// for each identity capability it supports. The dependency tracker uses them to
/// decide between fine-grained and shallow tracking.
pub trait Object: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Describe the method `name`, or `None` if the object has no such method.
    fn method(&self, name: &str) -> Option<Signature>;

    /// Invoke a method previously described by [`Object::method`].
    ///
    /// Arity and the implicit context have already been checked against the
    /// signature; `cx` is `Some` exactly when the signature takes a context.
    fn call_method(
        &self,
        name: &str,
        cx: Option<&ExecContext>,
        args: &[Value],
    ) -> Result<Value, CallError>;

    /// Method names, used for "did you mean" suggestions.
    fn method_names(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Text used when the object itself is printed.
    fn to_text(&self) -> Option<String> {
        None
    }

    fn as_identity_provider(&self) -> Option<&dyn IdentityProvider> {
        None
    }

    fn as_identities_provider(&self) -> Option<&dyn IdentitiesProvider> {
        None
    }

    fn as_identities_by_name(&self) -> Option<&dyn IdentitiesByNameProvider> {
        None
    }
}
