//! Errors raised while invoking template functions and methods.

use thiserror::Error;

/// A resolved function or method failed when called.
///
/// Resolution misses are not errors; they surface as `None` from the hooks.
/// `CallError` only covers calls that were resolved and then went wrong.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("wrong number of args for {name}: want {expected} got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("{name} requires an execution context but none was supplied")]
    MissingContext {
        name: String,
    },

    #[error("invalid argument for {name}: {message}")]
    InvalidArgument {
        name: String,
        message: String,
    },

    #[error("{type_name} has no method {name}")]
    UnknownMethod {
        type_name: String,
        name: String,
    },

    #[error("failed to unmarshal {format}: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },
}

impl CallError {
    pub fn invalid_argument(name: &str, message: impl Into<String>) -> Self {
        CallError::InvalidArgument {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
