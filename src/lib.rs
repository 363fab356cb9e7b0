//! tplexec - template execution hooks with dependency tracking
//!
//! A template evaluator resolves every identifier it meets (free functions,
//! methods on the dot, map keys) through a set of hooks. This crate provides
//! those hooks for site rendering and, while a live server is watching for
//! changes, records which content identities each render scope read. The
//! caching layer uses that record to re-render exactly the output affected by
//! an edit.
//!
//! # Architecture Overview
//!
//! - Content types plug in as [`value::Object`]s. Instead of reflection they
//!   answer capability queries: "do you have an identity", "do you stand for a
//!   group of identities", "can you tell me the identities behind member X".
//! - [`helper::TemplateExecHelper`] implements [`helper::ExecHelper`]:
//!   function lookup, case-insensitive params lookup, method lookup with a
//!   redirect for deprecated site-params members, and post-call scanning of
//!   arguments to functions that consume raw structured input.
//! - Dependencies are recorded into the [`identity::DependencyManager`] carried
//!   by the [`context::ExecContext`] of the current render scope.
//! - [`exec::Executor`] is a small evaluator over pre-built node trees that
//!   drives the hooks in the order a full template engine would.
//!
//! # Core Modules
//!
//! - [`identity`] - identities, capability traits, the shallow walk and
//!   per-scope dependency sets
//! - [`value`] - dynamic values, case-insensitive params, the [`value::Object`] trait
//! - [`funcs`] - signatures, callables, the function registry and builtins
//! - [`context`] - the execution context threaded through every hook
//! - [`helper`] - the execution hooks and dependency tracking
//! - [`exec`] - the reference evaluator and its errors
//! - [`config`] - session configuration (`exec.toml`)
//! - [`constants`] - shared limits and defaults
//!
//! # Configuration
//!
//! ```toml
//! watching = true
//! post_call_scan = ["Unmarshal"]
//!
//! [[method_aliases]]
//! alias = "mainsections"
//! canonical = "MainSections"
//! ```
//!
//! # Logging
//!
//! All diagnostics go through `tracing`. Resolution and tracking events are
//! logged at `trace`, per-render summaries at `debug`:
//!
//! ```bash
//! RUST_LOG=tplexec=trace cargo test
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod exec;
pub mod funcs;
pub mod helper;
pub mod identity;
pub mod value;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use context::ExecContext;
pub use helper::{ExecHelper, TemplateDescriptor, TemplateExecHelper};
pub use identity::{DependencyManager, Identity, IdentitySet};
pub use value::{Object, Params, Value};
