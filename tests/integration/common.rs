//! Shared site fixture for integration tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use tplexec::config::ExecConfig;
use tplexec::exec::{Executor, Expr, Node, Template};
use tplexec::funcs::builtins;
use tplexec::test_utils::{TestPage, TestResource, TestSite, TestTaxonomy, init_test_logging};
use tplexec::{ExecContext, Identity, IdentitySet, TemplateExecHelper, Value};

pub const BASEOF: &str = "layouts/_default/baseof.html";
pub const HEAD: &str = "layouts/partials/head.html";
pub const TERM: &str = "layouts/_default/term.html";
pub const AUTHORS: &str = "layouts/partials/authors.html";

/// Content of a small site plus an executor with its layouts.
pub struct SiteFixture {
    pub executor: Executor,
    pub site: Value,
    pub pages: BTreeMap<&'static str, Value>,
    pub term: Value,
    pub authors: Value,
}

impl SiteFixture {
    pub fn new(config: &ExecConfig) -> Self {
        Self::build(config, TestResource::new("css/main.css", "body { color: red }"))
    }

    /// Same site, but the stylesheet link carries a content hash.
    pub fn with_fingerprinted_css(config: &ExecConfig) -> Self {
        Self::build(config, TestResource::new("css/main.css", "body { color: red }").fingerprinted())
    }

    fn build(config: &ExecConfig, css: TestResource) -> Self {
        init_test_logging(None);

        let site = TestSite::new("Example", json!({"mainSections": ["legacy"]}), &["posts"]);
        let site_params = site.params();
        let site = site.into_value();

        let helper = TemplateExecHelper::new(config, builtins()).with_site(site.clone(), site_params);
        let mut executor = Executor::new(Arc::new(helper));

        executor.add_template(
            Template::new(
                "single.html",
                vec![
                    Node::text("<html>"),
                    Node::template("head.html", Expr::dot()),
                    Node::text("<h1>"),
                    Node::action(Expr::dot().field("Title")),
                    Node::text("</h1><p>"),
                    Node::action(Expr::dot().field("Params").field("summary")),
                    Node::text("</p></html>"),
                ],
            )
            .with_identity(Identity::new(BASEOF)),
        );
        executor.add_template(
            Template::new(
                "head.html",
                vec![
                    Node::text("<link href=\""),
                    Node::action(Expr::lit(css.into_value()).field("RelPermalink")),
                    Node::text("\">"),
                ],
            )
            .with_identity(Identity::new(HEAD)),
        );
        executor.add_template(
            Template::new(
                "term.html",
                vec![
                    Node::action(Expr::dot().field("Name")),
                    Node::text(": "),
                    Node::action(Expr::dot().field("Count")),
                ],
            )
            .with_identity(Identity::new(TERM)),
        );
        executor.add_template(
            Template::new(
                "authors.html",
                vec![Node::action(
                    Expr::call("transform", vec![])
                        .method("Unmarshal", vec![Expr::dot()])
                        .field("name"),
                )],
            )
            .with_identity(Identity::new(AUTHORS)),
        );

        let mut pages = BTreeMap::new();
        pages.insert(
            "content/posts/first.md",
            TestPage::new("content/posts/first.md", "First")
                .with_params(json!({"Summary": "one"}))
                .into_value(),
        );
        pages.insert(
            "content/posts/second.md",
            TestPage::new("content/posts/second.md", "Second")
                .with_params(json!({"summary": "two"}))
                .into_value(),
        );

        Self {
            executor,
            site,
            pages,
            term: TestTaxonomy::new("rust", &["content/posts/first.md", "content/posts/second.md"])
                .into_value(),
            authors: TestResource::new("data/authors.json", r#"{"name": "Jo"}"#).into_value(),
        }
    }

    pub fn page(&self, path: &str) -> &Value {
        &self.pages[path]
    }
}

/// Output of one tracked render.
pub struct Rendered {
    pub output: String,
    pub deps: Arc<IdentitySet>,
}

impl Rendered {
    pub fn keys(&self) -> Vec<String> {
        self.deps.snapshot().iter().map(|id| id.key().to_string()).collect()
    }

    pub fn depends_on(&self, key: &str) -> bool {
        self.deps.contains(&Identity::new(key))
    }
}

/// Render `template` with `dot` into a fresh dependency scope.
pub fn render(executor: &Executor, scope: &str, template: &str, dot: &Value) -> Result<Rendered> {
    let deps = Arc::new(IdentitySet::new(scope));
    let cx = ExecContext::new().with_dependency_scope(deps.clone());
    let output = executor.execute(&cx, template, dot)?;
    Ok(Rendered {
        output,
        deps,
    })
}
