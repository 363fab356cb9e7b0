//! Integration test suite for tplexec
//!
//! End-to-end tests that render templates through [`tplexec::exec::Executor`]
//! and check both the output and the dependencies recorded per render scope.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=tplexec=trace cargo test --test integration -- --nocapture
//! ```
//!
//! # Test Organization
//!
//! - **common**: Shared site fixture and executor setup
//! - **config**: Loading `exec.toml` session configuration
//! - **concurrency**: Parallel renders into shared and separate scopes
//! - **invalidation**: Which edits invalidate which render scopes
//! - **redirect**: Deprecated site-params aliases

mod common;

mod concurrency;
mod config;
mod invalidation;
mod redirect;
