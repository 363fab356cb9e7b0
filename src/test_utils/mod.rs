//! Test utilities for the template hooks.
//!
//! This module provides logging setup for tests and a small content model
//! (pages, resources, a site, a taxonomy) implementing [`Object`] with the
//! different identity capabilities, so tests can exercise both the
//! fine-grained and the shallow tracking paths.
//!
//! # Example
//!
//! ```rust,no_run
//! use tplexec::test_utils::{TestPage, tracked_context};
//!
//! let (cx, deps) = tracked_context("home");
//! let page = TestPage::new("content/_index.md", "Home").into_value();
//! // Render with `cx`, then inspect `deps.snapshot()`.
//! ```
//!
//! [`Object`]: crate::value::Object

pub mod fixtures;

pub use fixtures::{TestPage, TestResource, TestSite, TestTaxonomy, params_from_json};

use std::sync::{Arc, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::context::ExecContext;
use crate::identity::IdentitySet;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise the
/// `RUST_LOG` environment variable; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=tplexec=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A context with a fresh dependency scope, plus the set it records into.
pub fn tracked_context(scope: &str) -> (ExecContext, Arc<IdentitySet>) {
    let deps = Arc::new(IdentitySet::new(scope));
    let cx = ExecContext::new().with_dependency_scope(deps.clone());
    (cx, deps)
}
