//! Identities and the capabilities values use to expose them.
//!
//! An [`Identity`] names a unit of source data (a content file, a template,
//! a resource) whose change must invalidate every cached render that read it.
//! Values expose identities through three narrow capability traits:
//!
//! - [`IdentityProvider`]: the value has an identity of its own
//! - [`IdentitiesProvider`]: the value stands for a group of identities
//! - [`IdentitiesByNameProvider`]: the value can tell which identities a read
//!   of one specific member implicates
//!
//! The last one is the fine-grained path used by the dependency tracker. Values
//! without it fall back to [`walk_identities_shallow`], which is coarser but
//! never misses the value's own identities.

pub mod manager;

pub use manager::{DependencyManager, IdentitySet};

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Opaque token for a unit of source data.
///
/// Only equality and hashing are meaningful. The empty key is reserved for
/// [`Identity::anonymous`], which is never reported to a dependency manager.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Arc<str>);

impl Identity {
    /// Create an identity from any string-like key.
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// The identity of values that must never be tracked.
    pub fn anonymous() -> Self {
        Self(Arc::from(""))
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            f.write_str("Identity(<anonymous>)")
        } else {
            write!(f, "Identity({})", self.0)
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Identity {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// A value with an identity of its own.
pub trait IdentityProvider {
    fn identity(&self) -> Identity;
}

/// A value that stands for a group of identities, e.g. a collection of pages.
pub trait IdentitiesProvider {
    fn identities(&self) -> Vec<Identity>;
}

/// Per-member identity enumeration.
///
/// Implementors report only the identities that reading `name` depends on.
/// A transformed resource, for example, can report nothing for `RelPermalink`
/// when the permalink is not fingerprinted, so a stylesheet edit does not
/// invalidate every page that links to it.
pub trait IdentitiesByNameProvider {
    /// Call `f` with each identity implicated by reading `name`.
    /// Enumeration stops as soon as `f` returns `true`.
    fn for_each_identity_by_name(&self, name: &str, f: &mut dyn FnMut(&Identity) -> bool);
}

/// Walk the identities reachable from `value` without deep recursion.
///
/// Level 0 covers the value's own identity and identity group. Level 1 covers
/// the level-0 identities of the direct elements of a list or map. Nested
/// containers below that are not visited. Anonymous identities are skipped.
/// `f` receives the level and the identity and returns `true` to stop the walk.
pub fn walk_identities_shallow(value: &Value, f: &mut dyn FnMut(usize, &Identity) -> bool) {
    if own_identities(value, 0, f) {
        return;
    }

    match value {
        Value::List(items) => {
            for item in items.iter() {
                if own_identities(item, 1, f) {
                    return;
                }
            }
        }
        Value::Map(map) => {
            for item in map.values() {
                if own_identities(item, 1, f) {
                    return;
                }
            }
        }
        Value::Params(params) => {
            for item in params.values() {
                if own_identities(item, 1, f) {
                    return;
                }
            }
        }
        _ => {}
    }
}

/// Visit the identities an object exposes directly. Returns `true` if `f` asked to stop.
fn own_identities(
    value: &Value,
    level: usize,
    f: &mut dyn FnMut(usize, &Identity) -> bool,
) -> bool {
    let Value::Object(object) = value else {
        return false;
    };

    // An object may be both a provider and a group provider.
    if let Some(provider) = object.as_identity_provider() {
        let id = provider.identity();
        if !id.is_anonymous() && f(level, &id) {
            return true;
        }
    }

    if let Some(group) = object.as_identities_provider() {
        for id in group.identities() {
            if !id.is_anonymous() && f(level, &id) {
                return true;
            }
        }
    }

    false
}
