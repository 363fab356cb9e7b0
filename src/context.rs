//! Execution context threaded through every hook call.
//!
//! The context carries the dependency manager of the current render scope and
//! a bag of ambient values that context-aware functions may read. It is never
//! mutated in place: `with_*` methods derive a new context, so a nested
//! template can change its scope without affecting its caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::identity::DependencyManager;
use crate::value::Value;

/// Immutable-by-convention carrier for one render scope.
///
/// Cloning is cheap: the manager and the value bag are reference counted.
#[derive(Clone, Default)]
pub struct ExecContext {
    deps: Option<Arc<dyn DependencyManager>>,
    values: Arc<HashMap<String, Value>>,
}

impl ExecContext {
    /// A context with no dependency scope and no ambient values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context whose scope records into `manager`.
    pub fn with_dependency_scope(&self, manager: Arc<dyn DependencyManager>) -> Self {
        Self {
            deps: Some(manager),
            values: Arc::clone(&self.values),
        }
    }

    /// Derive a context with no dependency scope.
    pub fn without_dependency_scope(&self) -> Self {
        Self {
            deps: None,
            values: Arc::clone(&self.values),
        }
    }

    /// The dependency manager of the current scope, if any.
    pub fn dependency_manager(&self) -> Option<&Arc<dyn DependencyManager>> {
        self.deps.as_ref()
    }

    /// Derive a context with `key` bound to `value`.
    pub fn with_value(&self, key: impl Into<String>, value: Value) -> Self {
        let mut values = HashMap::clone(&self.values);
        values.insert(key.into(), value);
        Self {
            deps: self.deps.clone(),
            values: Arc::new(values),
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether both contexts record into the same dependency manager.
    pub fn shares_scope_with(&self, other: &ExecContext) -> bool {
        match (&self.deps, &other.deps) {
            (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl fmt::Debug for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("ExecContext")
            .field("dependency_scope", &self.deps.is_some())
            .field("values", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, IdentitySet};

    #[test]
    fn test_derived_contexts_do_not_touch_parent() {
        let parent = ExecContext::new().with_value("lang", Value::from("en"));
        let child = parent.with_value("lang", Value::from("nn"));

        assert_eq!(parent.value("lang"), Some(&Value::from("en")));
        assert_eq!(child.value("lang"), Some(&Value::from("nn")));
    }

    #[test]
    fn test_scope_is_shared_by_clones() {
        let set = Arc::new(IdentitySet::new("page"));
        let cx = ExecContext::new().with_dependency_scope(set.clone());
        let nested = cx.with_value("page", Value::Nil);

        assert!(cx.shares_scope_with(&nested));
        nested
            .dependency_manager()
            .expect("scope should be inherited")
            .add_identity(Identity::new("content/a.md"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_without_scope() {
        let set = Arc::new(IdentitySet::new("page"));
        let cx = ExecContext::new().with_dependency_scope(set);
        let detached = cx.without_dependency_scope();

        assert!(detached.dependency_manager().is_none());
        assert!(!cx.shares_scope_with(&detached));
        assert!(cx.dependency_manager().is_some());
    }
}
