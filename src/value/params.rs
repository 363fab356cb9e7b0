//! Case-insensitive configuration maps.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::Value;

/// A configuration map whose key case never affects lookup.
///
/// Keys are lower-cased on construction, nested maps included, so lookups only
/// need to lower-case the requested key. Two `Params` can be equal in content
/// and still be different objects; [`Params::ptr_eq`] tells them apart.
#[derive(Clone, Default, PartialEq)]
pub struct Params(Arc<BTreeMap<String, Value>>);

impl Params {
    pub fn new(map: BTreeMap<String, Value>) -> Self {
        map.into_iter().collect()
    }

    /// Look up `key` ignoring case.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }

    /// Whether both handles point at the same underlying map.
    pub fn ptr_eq(&self, other: &Params) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), normalize(value)))
            .collect();
        Params(Arc::new(map))
    }
}

/// Nested generic maps become `Params` so the whole tree is case-insensitive.
fn normalize(value: Value) -> Value {
    match value {
        Value::Map(map) => {
            let map = Arc::unwrap_or_clone(map);
            Value::Params(Params::new(map))
        }
        Value::List(items) => {
            let items = Arc::unwrap_or_clone(items);
            Value::list(items.into_iter().map(normalize).collect())
        }
        other => other,
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Params").field(&self.0).finish()
    }
}
