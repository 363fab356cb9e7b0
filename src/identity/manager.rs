//! Per-scope dependency managers.
//!
//! A dependency manager accumulates the identities observed while rendering one
//! scope (a page, a cached partial). Managers are owned by the caching layer and
//! reach the hooks through [`ExecContext`](crate::context::ExecContext).

use dashmap::DashSet;

use super::Identity;

/// Append-only set of identities for one render scope.
///
/// `add_identity` may be called from several threads at once when the evaluator
/// renders sibling nodes of the same scope in parallel. Adding an identity that
/// is already present must not change the set.
pub trait DependencyManager: Send + Sync {
    fn add_identity(&self, id: Identity);

    fn add_identities(&self, ids: &mut dyn Iterator<Item = Identity>) {
        for id in ids {
            self.add_identity(id);
        }
    }
}

/// Thread-safe [`DependencyManager`] backed by a sharded [`DashSet`].
///
/// The anonymous identity is dropped on insert. Iteration order is unspecified;
/// use [`IdentitySet::snapshot`] for a stable view.
#[derive(Debug, Default)]
pub struct IdentitySet {
    name: String,
    ids: DashSet<Identity>,
}

impl IdentitySet {
    /// Create an empty set. `name` is only used in log output.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ids: DashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.ids.contains(id)
    }

    /// Sorted copy of the current members.
    pub fn snapshot(&self) -> Vec<Identity> {
        let mut ids: Vec<Identity> = self.ids.iter().map(|id| Identity::clone(&id)).collect();
        ids.sort();
        ids
    }
}

impl DependencyManager for IdentitySet {
    fn add_identity(&self, id: Identity) {
        if id.is_anonymous() {
            return;
        }
        if self.ids.insert(id.clone()) {
            tracing::trace!("Scope '{}' now depends on {}", self.name, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_add_is_idempotent() {
        let set = IdentitySet::new("page");
        set.add_identity(Identity::new("content/a.md"));
        set.add_identity(Identity::new("content/a.md"));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Identity::new("content/a.md")));
    }

    #[test]
    fn test_anonymous_is_ignored() {
        let set = IdentitySet::new("page");
        set.add_identity(Identity::anonymous());
        assert!(set.is_empty());
    }

    #[test]
    fn test_membership_never_shrinks() {
        let set = IdentitySet::new("page");
        let mut last = 0;
        for key in ["a", "b", "a", "c", "b", "d"] {
            set.add_identity(Identity::new(key));
            assert!(set.len() >= last);
            last = set.len();
        }
        assert_eq!(last, 4);
    }

    #[test]
    fn test_add_identities_default_method() {
        let set = IdentitySet::new("page");
        let mut ids = vec![Identity::new("b"), Identity::new("a"), Identity::new("b")].into_iter();
        set.add_identities(&mut ids);
        assert_eq!(set.snapshot(), vec![Identity::new("a"), Identity::new("b")]);
    }

    #[test]
    fn test_concurrent_adds() {
        let set = Arc::new(IdentitySet::new("page"));

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let set = Arc::clone(&set);
                scope.spawn(move || {
                    for i in 0..100 {
                        // Every worker overlaps with every other on half the keys.
                        let key = if i % 2 == 0 {
                            format!("shared/{i}")
                        } else {
                            format!("worker{worker}/{i}")
                        };
                        set.add_identity(Identity::new(key));
                    }
                });
            }
        });

        assert_eq!(set.len(), 50 + 8 * 50);
    }
}
