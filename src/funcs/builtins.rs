//! Built-in template functions.
//!
//! These cover the common string helpers plus the `transform` namespace, whose
//! `Unmarshal` method is the canonical example of a function that consumes raw
//! structured input and therefore needs post-call identity scanning.

use crate::context::ExecContext;
use crate::value::{Object, Value};

use super::{CallError, Callable, Func, FuncRegistry, Signature};

/// Ambient context key holding the current site object.
pub const SITE_CONTEXT_KEY: &str = "site";

/// Registry with the built-in functions.
pub fn builtins() -> FuncRegistry {
    FuncRegistry::builder()
        .register(Func::new("lower", 1, |args| {
            Ok(Value::from(string_arg("lower", &args[0])?.to_lowercase()))
        }))
        .register(Func::new("upper", 1, |args| {
            Ok(Value::from(string_arg("upper", &args[0])?.to_uppercase()))
        }))
        .register(Func::new("default", 2, |args| {
            // {{ default "fallback" .Given }}
            if args[1].is_truthy() {
                Ok(args[1].clone())
            } else {
                Ok(args[0].clone())
            }
        }))
        .register(
            Func::new("print", 1, |args| {
                Ok(Value::from(args.iter().map(ToString::to_string).collect::<String>()))
            })
            .variadic(),
        )
        .register(Func::with_context("site", 0, |cx, _| {
            Ok(cx.value(SITE_CONTEXT_KEY).cloned().unwrap_or_default())
        }))
        .register(Func::new("transform", 0, |_| Ok(Value::object(Transform))))
        .build()
}

fn string_arg<'a>(func: &str, value: &'a Value) -> Result<&'a str, CallError> {
    value
        .as_str()
        .ok_or_else(|| CallError::invalid_argument(func, format!("expected string, got {}", value.type_name())))
}

/// The `transform` namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transform;

impl Transform {
    /// Decode JSON or TOML from a string, or from an object's `Content` method.
    fn unmarshal(&self, input: &Value) -> Result<Value, CallError> {
        let text = match input {
            Value::String(s) => s.to_string(),
            Value::Object(object) => {
                let Some(signature) = object.method("Content") else {
                    return Err(CallError::invalid_argument(
                        "Unmarshal",
                        format!("{} has no Content", object.type_name()),
                    ));
                };
                // Checked like any template call: no arguments, no context.
                let content = Callable::Method {
                    receiver: object.clone(),
                    signature,
                };
                content.call(None, &[])?.to_string()
            }
            other => {
                return Err(CallError::invalid_argument(
                    "Unmarshal",
                    format!("cannot unmarshal {}", other.type_name()),
                ));
            }
        };

        decode(&text)
    }
}

fn decode(text: &str) -> Result<Value, CallError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| CallError::Decode {
                format: "json",
                message: e.to_string(),
            })?;
        return Ok(Value::from(json));
    }

    let json: serde_json::Value = toml::from_str(text).map_err(|e| CallError::Decode {
        format: "toml",
        message: e.to_string(),
    })?;
    Ok(Value::from(json))
}

impl Object for Transform {
    fn type_name(&self) -> &'static str {
        "transform"
    }

    fn method(&self, name: &str) -> Option<Signature> {
        match name {
            "Unmarshal" => Some(Signature::fixed(name, 1)),
            _ => None,
        }
    }

    fn call_method(
        &self,
        name: &str,
        _cx: Option<&ExecContext>,
        args: &[Value],
    ) -> Result<Value, CallError> {
        match name {
            "Unmarshal" => self.unmarshal(&args[0]),
            _ => Err(CallError::UnknownMethod {
                type_name: self.type_name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn method_names(&self) -> Vec<&'static str> {
        vec!["Unmarshal"]
    }
}
