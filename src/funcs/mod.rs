//! Callable descriptors and the function registry.
//!
//! Functions and methods are described by a [`Signature`]. A signature whose
//! first parameter is [`Param::Context`] asks for the current
//! [`ExecContext`] as an implicit argument. Template authors never pass it:
//! the resolvers hand it back next to the callable and [`Resolved::invoke`]
//! injects it, so user-visible arity counts [`Param::Value`] parameters only.

mod builtins;
mod error;

pub use builtins::{SITE_CONTEXT_KEY, Transform, builtins};
pub use error::CallError;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::ExecContext;
use crate::value::{Object, Value};

/// A declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Implicit execution-context marker. Only valid in first position.
    Context,
    /// A user-supplied argument.
    Value,
}

/// Name and parameter list of a function or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
    variadic: bool,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        debug_assert!(
            !params.iter().skip(1).any(|p| *p == Param::Context),
            "the context marker may only be the first parameter"
        );
        Self {
            name: name.into(),
            params,
            variadic: false,
        }
    }

    /// `arity` user arguments, no context.
    pub fn fixed(name: impl Into<String>, arity: usize) -> Self {
        Self::new(name, vec![Param::Value; arity])
    }

    /// Context marker followed by `arity` user arguments.
    pub fn with_context(name: impl Into<String>, arity: usize) -> Self {
        let mut params = vec![Param::Context];
        params.extend(std::iter::repeat_n(Param::Value, arity));
        Self::new(name, params)
    }

    /// Let the last user parameter take any number of arguments, including none.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Whether the first declared parameter is the context marker.
    pub fn takes_context(&self) -> bool {
        self.params.first() == Some(&Param::Context)
    }

    /// Number of user-visible parameters.
    pub fn arity(&self) -> usize {
        self.params.iter().filter(|p| **p == Param::Value).count()
    }

    pub fn check_arity(&self, got: usize) -> Result<(), CallError> {
        let arity = self.arity();
        let (ok, expected) = if self.variadic {
            let min = arity.saturating_sub(1);
            (got >= min, format!("at least {min}"))
        } else {
            (got == arity, arity.to_string())
        };

        if ok {
            Ok(())
        } else {
            Err(CallError::Arity {
                name: self.name.clone(),
                expected,
                got,
            })
        }
    }
}

type PlainBody = dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync;
type ContextBody = dyn Fn(&ExecContext, &[Value]) -> Result<Value, CallError> + Send + Sync;

#[derive(Clone)]
enum FuncBody {
    Plain(Arc<PlainBody>),
    WithContext(Arc<ContextBody>),
}

/// A registered template function.
#[derive(Clone)]
pub struct Func {
    signature: Signature,
    body: FuncBody,
}

impl Func {
    /// A function taking `arity` user arguments.
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        body: impl Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature: Signature::fixed(name, arity),
            body: FuncBody::Plain(Arc::new(body)),
        }
    }

    /// A function whose first parameter is the implicit execution context.
    pub fn with_context(
        name: impl Into<String>,
        arity: usize,
        body: impl Fn(&ExecContext, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature: Signature::with_context(name, arity),
            body: FuncBody::WithContext(Arc::new(body)),
        }
    }

    pub fn variadic(mut self) -> Self {
        self.signature = self.signature.variadic();
        self
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, cx: Option<&ExecContext>, args: &[Value]) -> Result<Value, CallError> {
        match (&self.body, cx) {
            (FuncBody::Plain(body), _) => body(args),
            (FuncBody::WithContext(body), Some(cx)) => body(cx, args),
            (FuncBody::WithContext(_), None) => Err(CallError::MissingContext {
                name: self.name().to_string(),
            }),
        }
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func").field("signature", &self.signature).finish_non_exhaustive()
    }
}

/// Something the evaluator can call: a registered function or a method bound
/// to its receiver.
#[derive(Debug, Clone)]
pub enum Callable {
    Func(Func),
    Method {
        receiver: Arc<dyn Object>,
        signature: Signature,
    },
}

impl Callable {
    pub fn name(&self) -> &str {
        self.signature().name()
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Callable::Func(func) => func.signature(),
            Callable::Method {
                signature,
                ..
            } => signature,
        }
    }

    /// Call with user `args`, injecting `implicit` when the signature asks for it.
    pub fn call(&self, implicit: Option<&ExecContext>, args: &[Value]) -> Result<Value, CallError> {
        let signature = self.signature();
        signature.check_arity(args.len())?;

        let cx = if signature.takes_context() {
            Some(implicit.ok_or_else(|| CallError::MissingContext {
                name: signature.name().to_string(),
            })?)
        } else {
            None
        };

        match self {
            Callable::Func(func) => func.call(cx, args),
            Callable::Method {
                receiver,
                signature,
            } => receiver.call_method(signature.name(), cx, args),
        }
    }
}

/// Result of a successful function or method resolution.
///
/// `implicit` carries the execution context for callables whose first parameter
/// is the context marker and is `None` for every other callable.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub callable: Callable,
    pub implicit: Option<ExecContext>,
}

impl Resolved {
    /// Resolve `callable`, capturing `cx` only if its signature takes a context.
    pub fn new(callable: Callable, cx: &ExecContext) -> Self {
        let implicit = callable.signature().takes_context().then(|| cx.clone());
        Self {
            callable,
            implicit,
        }
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, CallError> {
        self.callable.call(self.implicit.as_ref(), args)
    }
}

/// Name to function mapping, immutable once built.
///
/// Cloning shares the underlying map, so one registry can back any number of
/// concurrent renders without locking.
#[derive(Debug, Clone, Default)]
pub struct FuncRegistry {
    funcs: Arc<HashMap<String, Func>>,
}

impl FuncRegistry {
    pub fn builder() -> FuncRegistryBuilder {
        FuncRegistryBuilder::default()
    }

    /// Case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Func> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Default)]
pub struct FuncRegistryBuilder {
    funcs: HashMap<String, Func>,
}

impl FuncRegistryBuilder {
    /// Add `func`, replacing any function registered under the same name.
    pub fn register(mut self, func: Func) -> Self {
        let name = func.name().to_string();
        if self.funcs.insert(name.clone(), func).is_some() {
            tracing::warn!("Template function '{}' registered twice; keeping the last one", name);
        }
        self
    }

    /// Add every function of `other`, replacing duplicates.
    pub fn extend(mut self, other: &FuncRegistry) -> Self {
        for func in other.funcs.values() {
            self = self.register(func.clone());
        }
        self
    }

    pub fn build(self) -> FuncRegistry {
        tracing::debug!("Built function registry with {} function(s)", self.funcs.len());
        FuncRegistry {
            funcs: Arc::new(self.funcs),
        }
    }
}
