//! Template execution errors.
//!
//! Resolution misses inside the hooks are soft: they come back as `None`. The
//! executor decides when a miss is fatal for the render and reports it here,
//! with "did you mean" suggestions where there are candidates.

use strsim::levenshtein;
use thiserror::Error;

use crate::constants::{MAX_SUGGESTIONS, SIMILARITY_THRESHOLD_PERCENT};
use crate::funcs::CallError;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("template '{template}': function \"{name}\" not defined")]
    UndefinedFunction {
        name: String,
        template: String,
        suggestions: Vec<String>,
    },

    #[error("template '{template}': can't evaluate field {name} in type {type_name}")]
    UndefinedField {
        name: String,
        type_name: String,
        template: String,
        suggestions: Vec<String>,
    },

    #[error("template '{template}': {name} is not a method but has arguments")]
    NotAMethod {
        name: String,
        template: String,
    },

    #[error("template '{template}': nil pointer evaluating {name}")]
    NilReceiver {
        name: String,
        template: String,
    },

    #[error("template '{template}': error calling {name}: {source}")]
    Call {
        name: String,
        template: String,
        #[source]
        source: CallError,
    },

    #[error("template '{template}': no such template \"{name}\"")]
    TemplateNotFound {
        name: String,
        template: String,
    },

    #[error("template '{template}': exceeded maximum template depth ({max})")]
    MaxDepthExceeded {
        template: String,
        max: usize,
    },
}

impl ExecError {
    /// Name of the template in which the error occurred.
    pub fn template(&self) -> &str {
        match self {
            ExecError::UndefinedFunction {
                template,
                ..
            }
            | ExecError::UndefinedField {
                template,
                ..
            }
            | ExecError::NotAMethod {
                template,
                ..
            }
            | ExecError::NilReceiver {
                template,
                ..
            }
            | ExecError::Call {
                template,
                ..
            }
            | ExecError::TemplateNotFound {
                template,
                ..
            }
            | ExecError::MaxDepthExceeded {
                template,
                ..
            } => template,
        }
    }

    /// Generate user-friendly error message with context and suggestions
    pub fn format_with_context(&self) -> String {
        let mut msg = String::new();

        match self {
            ExecError::UndefinedFunction {
                name,
                suggestions,
                ..
            } => {
                msg.push_str("ERROR: Undefined Function\n\n");
                msg.push_str(&format!("Function: {}\n", name));
                msg.push_str(&format!("Template: {}\n\n", self.template()));
                push_suggestions(&mut msg, suggestions);
            }
            ExecError::UndefinedField {
                name,
                type_name,
                suggestions,
                ..
            } => {
                msg.push_str("ERROR: Undefined Field\n\n");
                msg.push_str(&format!("Field: {}\n", name));
                msg.push_str(&format!("Receiver type: {}\n", type_name));
                msg.push_str(&format!("Template: {}\n\n", self.template()));
                push_suggestions(&mut msg, suggestions);
            }
            ExecError::Call {
                name,
                source,
                ..
            } => {
                msg.push_str("ERROR: Call Failed\n\n");
                msg.push_str(&format!("Callable: {}\n", name));
                msg.push_str(&format!("Error: {}\n", source));
                msg.push_str(&format!("Template: {}\n\n", self.template()));
            }
            ExecError::MaxDepthExceeded {
                max,
                ..
            } => {
                msg.push_str("ERROR: Template Nesting Too Deep\n\n");
                msg.push_str(&format!("Template: {}\n", self.template()));
                msg.push_str(&format!("Limit: {}\n\n", max));
                msg.push_str("SUGGESTION: Check for a template that includes itself.\n\n");
            }
            other => {
                msg.push_str("ERROR: Template Execution Failed\n\n");
                msg.push_str(&format!("Error: {}\n\n", other));
            }
        }

        msg
    }
}

fn push_suggestions(msg: &mut String, suggestions: &[String]) {
    if suggestions.is_empty() {
        return;
    }
    msg.push_str("Did you mean one of these?\n");
    for suggestion in suggestions {
        msg.push_str(&format!("  - {}\n", suggestion));
    }
    msg.push('\n');
}

/// Find names similar to `target` using Levenshtein distance.
pub(crate) fn find_similar<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let max_distance = (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);

    let mut scored: Vec<_> = candidates
        .into_iter()
        .map(|candidate| (candidate, levenshtein(&target.to_lowercase(), &candidate.to_lowercase())))
        .filter(|(_, distance)| *distance <= max_distance)
        .collect();

    // Closest first, then alphabetical for stable output.
    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    scored.into_iter().take(MAX_SUGGESTIONS).map(|(candidate, _)| candidate.to_string()).collect()
}
