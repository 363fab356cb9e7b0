//! Configuration for the template execution hooks.
//!
//! The hooks are configured once per render session. The watching flag turns
//! dependency tracking on (typically only for live-reload sessions); the
//! post-call scan list and method aliases are data so new entries do not
//! require code changes.
//!
//! # File Format
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
//! Every field is optional; missing fields take their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    DEFAULT_POST_CALL_SCAN, DEPRECATED_MAIN_SECTIONS_ALIAS, MAIN_SECTIONS_METHOD,
};

/// A deprecated member name on the site params that now lives on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodAlias {
    /// Deprecated name, matched case-insensitively.
    pub alias: String,
    /// Method to call on the site object instead.
    pub canonical: String,
}

impl MethodAlias {
    pub fn new(alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            canonical: canonical.into(),
        }
    }

    /// Unicode case-insensitive comparison with `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.alias.to_lowercase() == name.to_lowercase()
    }
}

/// Session configuration for [`TemplateExecHelper`](crate::helper::TemplateExecHelper).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecConfig {
    /// Record dependencies while rendering.
    pub watching: bool,
    /// Function and method names whose arguments are scanned after the call.
    pub post_call_scan: Vec<String>,
    /// Deprecated site-params members redirected to site methods.
    pub method_aliases: Vec<MethodAlias>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            watching: false,
            post_call_scan: DEFAULT_POST_CALL_SCAN.iter().map(|s| s.to_string()).collect(),
            method_aliases: vec![MethodAlias::new(
                DEPRECATED_MAIN_SECTIONS_ALIAS,
                MAIN_SECTIONS_METHOD,
            )],
        }
    }
}

impl ExecConfig {
    /// Default configuration with tracking enabled.
    pub fn watching() -> Self {
        Self {
            watching: true,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse exec config")
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read exec config: {}", path.display()))?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid exec config: {}", path.display()))?;

        tracing::debug!(
            "Loaded exec config from {} (watching={}, {} post-call name(s))",
            path.display(),
            config.watching,
            config.post_call_scan.len()
        );
        Ok(config)
    }
}
