//! A minimal content model for tests.

use std::sync::Arc;

use crate::context::ExecContext;
use crate::funcs::{CallError, Signature};
use crate::identity::{
    IdentitiesByNameProvider, IdentitiesProvider, Identity, IdentityProvider,
};
use crate::value::{Object, Params, Value};

/// Build case-insensitive params from a JSON object literal.
///
/// # Panics
///
/// Panics if `json` is not an object.
pub fn params_from_json(json: serde_json::Value) -> Params {
    match Value::from(json) {
        Value::Map(map) => Params::new(Arc::unwrap_or_clone(map)),
        other => panic!("params must be a JSON object, got {other:?}"),
    }
}

fn unknown_method(type_name: &str, name: &str) -> CallError {
    CallError::UnknownMethod {
        type_name: type_name.to_string(),
        name: name.to_string(),
    }
}

/// A content page. Its identity is its source path.
///
/// Pages cannot enumerate identities per member, so reading any member of a
/// page records the page itself.
#[derive(Debug, Clone)]
pub struct TestPage {
    path: String,
    title: String,
    params: Params,
}

impl TestPage {
    pub fn new(path: &str, title: &str) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            params: Params::default(),
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params_from_json(params);
        self
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.path.as_str())
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }

    fn rel_permalink(&self) -> String {
        let slug = self
            .path
            .trim_start_matches("content/")
            .trim_end_matches(".md")
            .trim_end_matches("_index")
            .trim_end_matches('/');
        if slug.is_empty() {
            "/".to_string()
        } else {
            format!("/{slug}/")
        }
    }
}

impl Object for TestPage {
    fn type_name(&self) -> &'static str {
        "page"
    }

    fn method(&self, name: &str) -> Option<Signature> {
        match name {
            "Title" | "Params" | "RelPermalink" => Some(Signature::fixed(name, 0)),
            "Param" => Some(Signature::fixed(name, 1)),
            "RenderString" => Some(Signature::with_context(name, 1)),
            _ => None,
        }
    }

    fn call_method(
        &self,
        name: &str,
        cx: Option<&ExecContext>,
        args: &[Value],
    ) -> Result<Value, CallError> {
        match name {
            "Title" => Ok(Value::from(self.title.as_str())),
            "Params" => Ok(Value::Params(self.params.clone())),
            "RelPermalink" => Ok(Value::from(self.rel_permalink())),
            "Param" => {
                let key = args[0]
                    .as_str()
                    .ok_or_else(|| CallError::invalid_argument(name, "key must be a string"))?;
                Ok(self.params.get(key).cloned().unwrap_or_default())
            }
            "RenderString" => {
                let lang = cx
                    .and_then(|cx| cx.value("lang"))
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "en".to_string());
                Ok(Value::from(format!("<p lang=\"{lang}\">{}</p>", args[0])))
            }
            _ => Err(unknown_method(self.type_name(), name)),
        }
    }

    fn method_names(&self) -> Vec<&'static str> {
        vec!["Param", "Params", "RelPermalink", "RenderString", "Title"]
    }

    fn to_text(&self) -> Option<String> {
        Some(self.title.clone())
    }

    fn as_identity_provider(&self) -> Option<&dyn IdentityProvider> {
        Some(self)
    }
}

impl IdentityProvider for TestPage {
    fn identity(&self) -> Identity {
        TestPage::identity(self)
    }
}

/// A file resource (stylesheet, image, data file).
///
/// Resources report identities per member: reading `RelPermalink` or
/// `Permalink` of a resource that is not fingerprinted depends on nothing,
/// because the link does not change when the content does.
#[derive(Debug, Clone)]
pub struct TestResource {
    path: String,
    content: String,
    fingerprinted: bool,
}

impl TestResource {
    pub fn new(path: &str, content: &str) -> Self {
        Self {
            path: path.to_string(),
            content: content.to_string(),
            fingerprinted: false,
        }
    }

    /// Make the permalink depend on the content.
    pub fn fingerprinted(mut self) -> Self {
        self.fingerprinted = true;
        self
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.path.as_str())
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }

    fn rel_permalink(&self) -> String {
        if self.fingerprinted {
            // Stand-in for a content hash.
            format!("/{}?v={}", self.path, self.content.len())
        } else {
            format!("/{}", self.path)
        }
    }
}

impl Object for TestResource {
    fn type_name(&self) -> &'static str {
        "resource"
    }

    fn method(&self, name: &str) -> Option<Signature> {
        match name {
            "Content" | "RelPermalink" | "Permalink" | "Name" => Some(Signature::fixed(name, 0)),
            _ => None,
        }
    }

    fn call_method(
        &self,
        name: &str,
        _cx: Option<&ExecContext>,
        _args: &[Value],
    ) -> Result<Value, CallError> {
        match name {
            "Content" => Ok(Value::from(self.content.as_str())),
            "RelPermalink" => Ok(Value::from(self.rel_permalink())),
            "Permalink" => Ok(Value::from(format!("https://example.org{}", self.rel_permalink()))),
            "Name" => Ok(Value::from(self.path.rsplit('/').next().unwrap_or(&self.path))),
            _ => Err(unknown_method(self.type_name(), name)),
        }
    }

    fn method_names(&self) -> Vec<&'static str> {
        vec!["Content", "Name", "Permalink", "RelPermalink"]
    }

    fn as_identity_provider(&self) -> Option<&dyn IdentityProvider> {
        Some(self)
    }

    fn as_identities_by_name(&self) -> Option<&dyn IdentitiesByNameProvider> {
        Some(self)
    }
}

impl IdentityProvider for TestResource {
    fn identity(&self) -> Identity {
        TestResource::identity(self)
    }
}

impl IdentitiesByNameProvider for TestResource {
    fn for_each_identity_by_name(&self, name: &str, f: &mut dyn FnMut(&Identity) -> bool) {
        match name {
            "RelPermalink" | "Permalink" if !self.fingerprinted => {}
            _ => {
                f(&self.identity());
            }
        }
    }
}

/// The global site object. It has no identity of its own.
#[derive(Debug, Clone)]
pub struct TestSite {
    title: String,
    params: Params,
    main_sections: Vec<String>,
}

impl TestSite {
    pub fn new(title: &str, params: serde_json::Value, main_sections: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            params: params_from_json(params),
            main_sections: main_sections.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A handle to the site params sharing the site's underlying map.
    pub fn params(&self) -> Params {
        self.params.clone()
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl Object for TestSite {
    fn type_name(&self) -> &'static str {
        "site"
    }

    fn method(&self, name: &str) -> Option<Signature> {
        match name {
            "Title" | "Params" | "MainSections" => Some(Signature::fixed(name, 0)),
            _ => None,
        }
    }

    fn call_method(
        &self,
        name: &str,
        _cx: Option<&ExecContext>,
        _args: &[Value],
    ) -> Result<Value, CallError> {
        match name {
            "Title" => Ok(Value::from(self.title.as_str())),
            "Params" => Ok(Value::Params(self.params.clone())),
            "MainSections" => Ok(Value::list(
                self.main_sections.iter().map(|s| Value::from(s.as_str())).collect(),
            )),
            _ => Err(unknown_method(self.type_name(), name)),
        }
    }

    fn method_names(&self) -> Vec<&'static str> {
        vec!["MainSections", "Params", "Title"]
    }
}

/// A taxonomy term standing for the group of pages tagged with it.
#[derive(Debug, Clone)]
pub struct TestTaxonomy {
    name: String,
    pages: Vec<Identity>,
}

impl TestTaxonomy {
    pub fn new(name: &str, pages: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            pages: pages.iter().map(|p| Identity::new(*p)).collect(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl Object for TestTaxonomy {
    fn type_name(&self) -> &'static str {
        "taxonomy"
    }

    fn method(&self, name: &str) -> Option<Signature> {
        match name {
            "Name" | "Count" => Some(Signature::fixed(name, 0)),
            _ => None,
        }
    }

    fn call_method(
        &self,
        name: &str,
        _cx: Option<&ExecContext>,
        _args: &[Value],
    ) -> Result<Value, CallError> {
        match name {
            "Name" => Ok(Value::from(self.name.as_str())),
            "Count" => Ok(Value::Int(self.pages.len() as i64)),
            _ => Err(unknown_method(self.type_name(), name)),
        }
    }

    fn method_names(&self) -> Vec<&'static str> {
        vec!["Count", "Name"]
    }

    fn as_identities_provider(&self) -> Option<&dyn IdentitiesProvider> {
        Some(self)
    }
}

impl IdentitiesProvider for TestTaxonomy {
    fn identities(&self) -> Vec<Identity> {
        self.pages.clone()
    }
}
