//! Constants shared across the crate.

/// Maximum nesting depth of template invocations.
///
/// Templates that include themselves (directly or through a chain) would
/// otherwise recurse until the stack overflows.
pub const MAX_TEMPLATE_DEPTH: usize = 50;

/// Functions whose arguments are scanned for identities after they are called.
///
/// These consume raw structured input that never passes through method
/// resolution, so the tracker would not see it otherwise.
pub const DEFAULT_POST_CALL_SCAN: &[&str] = &["Unmarshal"];

/// Deprecated site-params member that moved to the site object.
pub const DEPRECATED_MAIN_SECTIONS_ALIAS: &str = "mainsections";

/// Canonical site method replacing [`DEPRECATED_MAIN_SECTIONS_ALIAS`].
pub const MAIN_SECTIONS_METHOD: &str = "MainSections";

/// Maximum Levenshtein distance, as a percentage of the target length, for
/// "did you mean" suggestions.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Maximum number of suggestions shown for an undefined identifier.
pub const MAX_SUGGESTIONS: usize = 3;
