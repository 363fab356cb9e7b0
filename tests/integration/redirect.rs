//! Integration tests for the deprecated site-params alias redirect.

use anyhow::Result;
use serde_json::json;

use tplexec::config::{ExecConfig, MethodAlias};
use tplexec::exec::{Executor, Expr, Node, Template};
use tplexec::test_utils::{TestPage, TestSite};
use tplexec::{ExecContext, TemplateExecHelper};

use crate::common::{SiteFixture, render};

fn site_params_field(name: &str) -> Template {
    Template::new("t", vec![Node::action(Expr::dot().field("Params").field(name))])
}

#[test]
fn test_site_params_alias_reads_site_method() -> Result<()> {
    let mut fixture = SiteFixture::new(&ExecConfig::watching());
    for name in ["mainSections", "mainsections", "MainSections"] {
        fixture.executor.add_template(site_params_field(name));
        let rendered = render(&fixture.executor, "home", "t", &fixture.site)?;
        assert_eq!(rendered.output, "[posts]", "alias spelled {name}");
    }
    Ok(())
}

#[test]
fn test_page_params_alias_is_a_plain_lookup() -> Result<()> {
    let mut fixture = SiteFixture::new(&ExecConfig::watching());
    fixture.executor.add_template(site_params_field("mainSections"));

    let page = TestPage::new("content/posts/third.md", "Third")
        .with_params(json!({"mainSections": ["own"]}))
        .into_value();
    let rendered = render(&fixture.executor, "posts/third", "t", &page)?;

    assert_eq!(rendered.output, "[own]");
    assert!(rendered.depends_on("content/posts/third.md"));
    Ok(())
}

#[test]
fn test_other_site_params_keys_are_untouched() -> Result<()> {
    let site = TestSite::new("Example", json!({"author": "Jo", "mainSections": ["x"]}), &["posts"]);
    let params = site.params();
    let site = site.into_value();

    let helper =
        TemplateExecHelper::new(&ExecConfig::default(), tplexec::funcs::builtins()).with_site(site.clone(), params);
    let mut executor = Executor::new(std::sync::Arc::new(helper));
    executor.add_template(site_params_field("author"));

    assert_eq!(executor.execute(&ExecContext::new(), "t", &site)?, "Jo");
    Ok(())
}

#[test]
fn test_custom_alias_from_config() -> Result<()> {
    let config = ExecConfig {
        method_aliases: vec![MethodAlias::new("sitetitle", "Title")],
        ..ExecConfig::default()
    };
    let site = TestSite::new("Example", json!({"siteTitle": "stale"}), &[]);
    let params = site.params();
    let site = site.into_value();

    let helper = TemplateExecHelper::new(&config, tplexec::funcs::builtins()).with_site(site.clone(), params);
    let mut executor = Executor::new(std::sync::Arc::new(helper));
    executor.add_template(site_params_field("siteTitle"));
    assert_eq!(executor.execute(&ExecContext::new(), "t", &site)?, "Example");

    // The built-in alias is replaced, not extended.
    executor.add_template(site_params_field("mainSections"));
    assert_eq!(executor.execute(&ExecContext::new(), "t", &site)?, "");
    Ok(())
}
