//! Execution hooks called by the template evaluator.
//!
//! The evaluator owns parsing and control flow. Whenever it needs to resolve an
//! identifier it asks an [`ExecHelper`]:
//!
//! - [`ExecHelper::get_func`] for free functions (`{{ lower .Title }}`)
//! - [`ExecHelper::get_method`] for members of the dot (`{{ .Title }}`)
//! - [`ExecHelper::get_map_value`] for map keys (`{{ .Params.title }}`)
//!
//! It also calls [`ExecHelper::init`] when it enters a template body and
//! [`ExecHelper::on_called`] after each function or method call.
//!
//! [`TemplateExecHelper`] is the implementation used for site rendering. Besides
//! resolving names it records, per render scope, which identities a render
//! read, so an incremental rebuild can invalidate exactly the affected output.
//!
//! # Tracking granularity
//!
//! Recording too little leaves stale output after an edit; recording too much
//! re-renders unrelated pages. Receivers that can enumerate identities per
//! member ([`IdentitiesByNameProvider`](crate::identity::IdentitiesByNameProvider))
//! get fine-grained tracking. Everything else falls back to a shallow identity
//! walk, which may over-invalidate but never misses a dependency.

mod tracking;


use std::collections::HashSet;

use crate::config::{ExecConfig, MethodAlias};
use crate::context::ExecContext;
use crate::funcs::{Callable, FuncRegistry, Resolved};
use crate::identity::Identity;
use crate::value::{Params, Value};

/// What the hooks know about the template being executed.
pub trait TemplateDescriptor: Send + Sync {
    fn name(&self) -> &str;

    /// The template's own identity. A render that executes the template body
    /// depends on its source regardless of the data it reads.
    fn identity(&self) -> Option<Identity> {
        None
    }
}

/// Hooks invoked by the template evaluator.
///
/// `tmpl` is the template frame being executed. It is optional in the
/// signature because evaluators built around these hooks may call them outside
/// a frame; [`TemplateExecHelper`] treats a missing frame during tracking as a
/// programming error.
pub trait ExecHelper: Send + Sync {
    /// Called once per template frame before its body is evaluated.
    fn init(&self, cx: &ExecContext, tmpl: Option<&dyn TemplateDescriptor>);

    /// Resolve a free function by its exact name.
    fn get_func(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        name: &str,
    ) -> Option<Resolved>;

    /// Index a map-like receiver.
    fn get_map_value(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        receiver: &Value,
        key: &Value,
    ) -> Option<Value>;

    /// Resolve `name` as a method on `receiver`.
    fn get_method(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        receiver: &Value,
        name: &str,
    ) -> Option<Resolved>;

    /// Called after a resolved function or method returned successfully.
    fn on_called(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        name: &str,
        args: &[Value],
        result: &Value,
    );

    /// Names `get_func` can resolve, used for "did you mean" hints.
    fn func_names(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// The site object and its params, needed by the deprecated-alias redirect.
#[derive(Debug, Clone)]
struct SiteBinding {
    site: Value,
    params: Params,
}

/// [`ExecHelper`] for site rendering with optional dependency tracking.
///
/// One helper is built per render session. Whether it records dependencies is
/// fixed at construction (`watching`), so a server session and a one-off build
/// can run side by side without sharing mode state.
#[derive(Debug)]
pub struct TemplateExecHelper {
    watching: bool,
    funcs: FuncRegistry,
    site: Option<SiteBinding>,
    post_call_scan: HashSet<String>,
    method_aliases: Vec<MethodAlias>,
}

impl TemplateExecHelper {
    pub fn new(config: &ExecConfig, funcs: FuncRegistry) -> Self {
        Self {
            watching: config.watching,
            funcs,
            site: None,
            post_call_scan: config.post_call_scan.iter().cloned().collect(),
            method_aliases: config.method_aliases.clone(),
        }
    }

    /// Bind the global site object and its params.
    ///
    /// Deprecated aliases are only redirected for this exact params map
    /// (compared by pointer, not content).
    pub fn with_site(mut self, site: Value, params: Params) -> Self {
        self.site = Some(SiteBinding {
            site,
            params,
        });
        self
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn funcs(&self) -> &FuncRegistry {
        &self.funcs
    }

    /// Rewrite `(receiver, name)` if `name` is a deprecated alias read from the
    /// global site params.
    fn redirect<'a>(&'a self, receiver: &'a Value, name: &'a str) -> (&'a Value, &'a str) {
        let (Some(binding), Value::Params(params)) = (&self.site, receiver) else {
            return (receiver, name);
        };

        if !params.ptr_eq(&binding.params) {
            return (receiver, name);
        }

        match self.method_aliases.iter().find(|alias| alias.matches(name)) {
            Some(alias) => {
                tracing::debug!(
                    "Redirecting deprecated site params member '{}' to site.{}",
                    name,
                    alias.canonical
                );
                (&binding.site, alias.canonical.as_str())
            }
            None => (receiver, name),
        }
    }
}

impl ExecHelper for TemplateExecHelper {
    fn init(&self, cx: &ExecContext, tmpl: Option<&dyn TemplateDescriptor>) {
        if !self.watching {
            return;
        }

        if let Some(tmpl) = tmpl {
            if tmpl.identity().is_some() {
                self.track_dependencies(cx, Some(tmpl), "", None);
            }
        }
    }

    fn get_func(
        &self,
        cx: &ExecContext,
        _tmpl: Option<&dyn TemplateDescriptor>,
        name: &str,
    ) -> Option<Resolved> {
        let func = self.funcs.get(name)?;
        Some(Resolved::new(Callable::Func(func.clone()), cx))
    }

    fn get_map_value(
        &self,
        _cx: &ExecContext,
        _tmpl: Option<&dyn TemplateDescriptor>,
        receiver: &Value,
        key: &Value,
    ) -> Option<Value> {
        let key = key.as_str()?;
        match receiver {
            // Case insensitive.
            Value::Params(params) => params.get(key).cloned(),
            Value::Map(map) => map.get(key).cloned(),
            _ => None,
        }
    }

    fn get_method(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        receiver: &Value,
        name: &str,
    ) -> Option<Resolved> {
        let (receiver, name) = self.redirect(receiver, name);

        let tracked;
        let cx = if self.watching {
            tracked = self.track_dependencies(cx, tmpl, name, Some(receiver));
            &tracked
        } else {
            cx
        };

        let Value::Object(object) = receiver else {
            tracing::trace!("No method '{}' on {}", name, receiver.type_name());
            return None;
        };

        let signature = object.method(name)?;
        let callable = Callable::Method {
            receiver: object.clone(),
            signature,
        };
        Some(Resolved::new(callable, cx))
    }

    fn on_called(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        name: &str,
        args: &[Value],
        _result: &Value,
    ) {
        if !self.watching {
            return;
        }

        // Most calls end here.
        if !self.post_call_scan.contains(name) {
            return;
        }

        self.scan_arguments(cx, tmpl, name, args);
    }

    fn func_names(&self) -> Vec<&str> {
        self.funcs.names()
    }
}
