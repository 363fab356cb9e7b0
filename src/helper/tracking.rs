//! Dependency tracking for [`TemplateExecHelper`].

use crate::context::ExecContext;
use crate::identity::{DependencyManager, walk_identities_shallow};
use crate::value::Value;

use super::{TemplateDescriptor, TemplateExecHelper};

impl TemplateExecHelper {
    /// Record what reading `name` on `receiver` in `tmpl` depends on.
    ///
    /// Adds the template's own identity, then either the identities the
    /// receiver reports for `name` or, if it cannot enumerate per member, the
    /// shallow identity set of the receiver. Returns the context to continue
    /// with; it is unchanged when the scope has no dependency manager.
    ///
    /// # Panics
    ///
    /// Panics if `tmpl` is `None`. The evaluator must only track inside a
    /// template frame; carrying on would silently produce an incomplete graph.
    pub fn track_dependencies(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        name: &str,
        receiver: Option<&Value>,
    ) -> ExecContext {
        let Some(tmpl) = tmpl else {
            panic!("must provide a template");
        };

        let Some(idm) = cx.dependency_manager() else {
            return cx.clone();
        };

        if let Some(id) = tmpl.identity().filter(|id| !id.is_anonymous()) {
            idm.add_identity(id);
        }

        // The receiver is the dot of the member access, e.g. the page in `.Resources`.
        let Some(receiver) = receiver.filter(|r| !r.is_nil()) else {
            return cx.clone();
        };

        let by_name = receiver.as_object().and_then(|object| object.as_identities_by_name());
        match by_name {
            Some(provider) => {
                // Lets e.g. `.RelPermalink` on a non-fingerprinted resource skip
                // the resource itself, so a CSS edit does not re-render every page.
                let mut added = 0usize;
                provider.for_each_identity_by_name(name, &mut |id| {
                    if !id.is_anonymous() {
                        idm.add_identity(id.clone());
                        added += 1;
                    }
                    false
                });
                tracing::trace!(
                    "Tracked {} identity(ies) for {}.{} in '{}'",
                    added,
                    receiver.type_name(),
                    name,
                    tmpl.name()
                );
            }
            None => {
                let added = add_shallow(idm.as_ref(), receiver);
                tracing::trace!(
                    "Tracked {} identity(ies) shallowly for {}.{} in '{}'",
                    added,
                    receiver.type_name(),
                    name,
                    tmpl.name()
                );
            }
        }

        cx.clone()
    }

    /// Record identities carried by the raw arguments of an allow-listed call.
    pub(super) fn scan_arguments(
        &self,
        cx: &ExecContext,
        tmpl: Option<&dyn TemplateDescriptor>,
        name: &str,
        args: &[Value],
    ) {
        let Some(idm) = cx.dependency_manager() else {
            return;
        };

        let added: usize = args.iter().map(|arg| add_shallow(idm.as_ref(), arg)).sum();
        tracing::debug!(
            "Post-call scan of {} in '{}' recorded {} identity(ies)",
            name,
            tmpl.map_or("<none>", |t| t.name()),
            added
        );
    }
}

fn add_shallow(idm: &dyn DependencyManager, value: &Value) -> usize {
    let mut added = 0;
    walk_identities_shallow(value, &mut |_, id| {
        idm.add_identity(id.clone());
        added += 1;
        false
    });
    added
}
