//! A small reference evaluator driving the [`ExecHelper`] hooks.
//!
//! Parsing is out of scope: templates are built as node trees directly. The
//! evaluator exists so the hooks can be exercised the way a real template
//! engine calls them:
//!
//! - `init` once per template frame, before the body runs
//! - `get_method` first for every `.Name` access, then `get_map_value` for
//!   map-like receivers
//! - `get_func` for free function calls
//! - `on_called` after every successful call
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tplexec::config::ExecConfig;
//! use tplexec::exec::{Executor, Expr, Node, Template};
//! use tplexec::funcs::builtins;
//! use tplexec::helper::TemplateExecHelper;
//! use tplexec::value::Value;
//! use tplexec::context::ExecContext;
//!
//! let helper = TemplateExecHelper::new(&ExecConfig::watching(), builtins());
//! let mut executor = Executor::new(Arc::new(helper));
//! executor.add_template(Template::new(
//!     "title.html",
//!     vec![Node::action(Expr::call("upper", vec![Expr::dot().field("Title")]))],
//! ));
//! let out = executor.execute(&ExecContext::new(), "title.html", &Value::Nil);
//! ```

mod error;

pub use error::ExecError;

use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::MAX_TEMPLATE_DEPTH;
use crate::context::ExecContext;
use crate::funcs::Resolved;
use crate::helper::{ExecHelper, TemplateDescriptor};
use crate::identity::Identity;
use crate::value::Value;

use error::find_similar;

/// An expression inside an action.
#[derive(Debug, Clone)]
pub enum Expr {
    /// The current dot.
    Dot,
    Literal(Value),
    /// `.Name` on a receiver, optionally called with arguments.
    Field {
        receiver: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    /// A free function call.
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn dot() -> Self {
        Expr::Dot
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// `self.name`
    pub fn field(self, name: impl Into<String>) -> Self {
        self.method(name, Vec::new())
    }

    /// `self.name arg...`
    pub fn method(self, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Field {
            receiver: Box::new(self),
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Text(String),
    /// `{{ expr }}`, printed.
    Action(Expr),
    /// `{{ template "name" expr }}`
    Template {
        name: String,
        dot: Expr,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn action(expr: Expr) -> Self {
        Node::Action(expr)
    }

    pub fn template(name: impl Into<String>, dot: Expr) -> Self {
        Node::Template {
            name: name.into(),
            dot,
        }
    }
}

/// A named template body.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    identity: Option<Identity>,
    nodes: Vec<Node>,
}

impl Template {
    /// An inline template with no source identity.
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            identity: None,
            nodes,
        }
    }

    /// Set the identity of the source the template was loaded from.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl TemplateDescriptor for Template {
    fn name(&self) -> &str {
        &self.name
    }

    fn identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

/// State of one template frame.
struct Frame<'a> {
    cx: &'a ExecContext,
    tmpl: &'a Template,
    dot: &'a Value,
}

impl Frame<'_> {
    fn descriptor(&self) -> Option<&dyn TemplateDescriptor> {
        Some(self.tmpl)
    }
}

/// Executes templates against a dot value, resolving names through an
/// [`ExecHelper`].
///
/// The executor is `Sync`; one instance can render any number of scopes
/// concurrently, each with its own [`ExecContext`].
pub struct Executor {
    helper: Arc<dyn ExecHelper>,
    templates: HashMap<String, Arc<Template>>,
}

impl Executor {
    pub fn new(helper: Arc<dyn ExecHelper>) -> Self {
        Self {
            helper,
            templates: HashMap::new(),
        }
    }

    /// Register `template`, replacing any template with the same name.
    pub fn add_template(&mut self, template: Template) -> Arc<Template> {
        let template = Arc::new(template);
        if self.templates.insert(template.name.clone(), template.clone()).is_some() {
            tracing::debug!("Replaced template '{}'", template.name);
        }
        template
    }

    pub fn template(&self, name: &str) -> Option<&Arc<Template>> {
        self.templates.get(name)
    }

    /// Render template `name` with `dot` in scope `cx`.
    pub fn execute(&self, cx: &ExecContext, name: &str, dot: &Value) -> Result<String, ExecError> {
        let tmpl = self.templates.get(name).ok_or_else(|| ExecError::TemplateNotFound {
            name: name.to_string(),
            template: name.to_string(),
        })?;

        let mut out = String::new();
        self.execute_frame(cx, tmpl, dot, 0, &mut out)?;
        tracing::debug!("Rendered '{}' ({} bytes)", name, out.len());
        Ok(out)
    }

    fn execute_frame(
        &self,
        cx: &ExecContext,
        tmpl: &Template,
        dot: &Value,
        depth: usize,
        out: &mut String,
    ) -> Result<(), ExecError> {
        if depth >= MAX_TEMPLATE_DEPTH {
            return Err(ExecError::MaxDepthExceeded {
                template: tmpl.name.clone(),
                max: MAX_TEMPLATE_DEPTH,
            });
        }

        tracing::trace!("Entering template '{}' at depth {}", tmpl.name, depth);
        let frame = Frame {
            cx,
            tmpl,
            dot,
        };
        self.helper.init(cx, frame.descriptor());

        for node in &tmpl.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(expr) => {
                    let value = self.eval(&frame, expr)?;
                    out.push_str(&value.to_string());
                }
                Node::Template {
                    name,
                    dot,
                } => {
                    let nested =
                        self.templates.get(name).ok_or_else(|| ExecError::TemplateNotFound {
                            name: name.clone(),
                            template: tmpl.name.clone(),
                        })?;
                    let nested_dot = self.eval(&frame, dot)?;
                    self.execute_frame(cx, nested, &nested_dot, depth + 1, out)?;
                }
            }
        }

        Ok(())
    }

    fn eval(&self, frame: &Frame<'_>, expr: &Expr) -> Result<Value, ExecError> {
        match expr {
            Expr::Dot => Ok(frame.dot.clone()),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Field {
                receiver,
                name,
                args,
            } => {
                let receiver = self.eval(frame, receiver)?;
                self.eval_field(frame, &receiver, name, args)
            }
            Expr::Call {
                name,
                args,
            } => {
                let Some(resolved) = self.helper.get_func(frame.cx, frame.descriptor(), name)
                else {
                    let suggestions = find_similar(name, self.helper.func_names());
                    return Err(ExecError::UndefinedFunction {
                        name: name.clone(),
                        template: frame.tmpl.name.clone(),
                        suggestions,
                    });
                };
                let args = self.eval_args(frame, args)?;
                self.invoke(frame, name, &resolved, &args)
            }
        }
    }

    fn eval_args(&self, frame: &Frame<'_>, args: &[Expr]) -> Result<Vec<Value>, ExecError> {
        args.iter().map(|arg| self.eval(frame, arg)).collect()
    }

    fn eval_field(
        &self,
        frame: &Frame<'_>,
        receiver: &Value,
        name: &str,
        args: &[Expr],
    ) -> Result<Value, ExecError> {
        if let Some(resolved) = self.helper.get_method(frame.cx, frame.descriptor(), receiver, name)
        {
            let args = self.eval_args(frame, args)?;
            return self.invoke(frame, name, &resolved, &args);
        }

        if receiver.is_map_like() {
            if !args.is_empty() {
                return Err(ExecError::NotAMethod {
                    name: name.to_string(),
                    template: frame.tmpl.name.clone(),
                });
            }
            let key = Value::from(name);
            // A missing key renders as nil.
            return Ok(self
                .helper
                .get_map_value(frame.cx, frame.descriptor(), receiver, &key)
                .unwrap_or_default());
        }

        if receiver.is_nil() {
            return Err(ExecError::NilReceiver {
                name: name.to_string(),
                template: frame.tmpl.name.clone(),
            });
        }

        let suggestions = receiver
            .as_object()
            .map(|object| find_similar(name, object.method_names()))
            .unwrap_or_default();
        Err(ExecError::UndefinedField {
            name: name.to_string(),
            type_name: receiver.type_name().to_string(),
            template: frame.tmpl.name.clone(),
            suggestions,
        })
    }

    fn invoke(
        &self,
        frame: &Frame<'_>,
        name: &str,
        resolved: &Resolved,
        args: &[Value],
    ) -> Result<Value, ExecError> {
        let result = resolved.invoke(args).map_err(|source| ExecError::Call {
            name: name.to_string(),
            template: frame.tmpl.name.clone(),
            source,
        })?;
        self.helper.on_called(frame.cx, frame.descriptor(), name, args, &result);
        Ok(result)
    }
}
