//! Integration tests for render-scope invalidation.
//!
//! These tests verify that:
//! - A content edit invalidates the scopes that read it and no others
//! - A layout edit invalidates every scope rendered with it
//! - Stable resource links do not tie pages to the resource content
//! - Group receivers and unmarshalled data files are tracked

use anyhow::Result;

use tplexec::config::ExecConfig;

use crate::common::{AUTHORS, BASEOF, HEAD, Rendered, SiteFixture, TERM, render};

fn invalidated<'a>(scopes: &'a [(&'a str, Rendered)], edited: &str) -> Vec<&'a str> {
    scopes.iter().filter(|(_, r)| r.depends_on(edited)).map(|(scope, _)| *scope).collect()
}

fn render_posts(fixture: &SiteFixture) -> Result<Vec<(&'static str, Rendered)>> {
    let mut scopes = Vec::new();
    for (path, page) in &fixture.pages {
        scopes.push((*path, render(&fixture.executor, path, "single.html", page)?));
    }
    Ok(scopes)
}

#[test]
fn test_page_output_and_dependencies() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());
    let first = render(
        &fixture.executor,
        "posts/first",
        "single.html",
        fixture.page("content/posts/first.md"),
    )?;

    assert_eq!(first.output, "<html><link href=\"/css/main.css\"><h1>First</h1><p>one</p></html>");
    assert_eq!(first.keys(), vec!["content/posts/first.md", BASEOF, HEAD]);
    Ok(())
}

#[test]
fn test_content_edit_invalidates_only_its_page() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());
    let scopes = render_posts(&fixture)?;

    assert_eq!(invalidated(&scopes, "content/posts/first.md"), vec!["content/posts/first.md"]);
    assert_eq!(invalidated(&scopes, "content/posts/second.md"), vec!["content/posts/second.md"]);
    Ok(())
}

#[test]
fn test_layout_edit_invalidates_every_page() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());
    let scopes = render_posts(&fixture)?;

    assert_eq!(invalidated(&scopes, BASEOF).len(), 2);
    assert_eq!(invalidated(&scopes, HEAD).len(), 2);
    Ok(())
}

#[test]
fn test_stylesheet_edit_keeps_pages_with_stable_links() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());
    let scopes = render_posts(&fixture)?;
    assert!(invalidated(&scopes, "css/main.css").is_empty());

    let fixture = SiteFixture::with_fingerprinted_css(&ExecConfig::watching());
    let scopes = render_posts(&fixture)?;
    assert_eq!(invalidated(&scopes, "css/main.css").len(), 2);
    Ok(())
}

#[test]
fn test_term_page_depends_on_member_pages() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());
    let term = render(&fixture.executor, "tags/rust", "term.html", &fixture.term)?;

    assert_eq!(term.output, "rust: 2");
    assert_eq!(term.keys(), vec!["content/posts/first.md", "content/posts/second.md", TERM]);
    Ok(())
}

#[test]
fn test_unmarshalled_data_file_is_tracked() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());
    let authors = render(&fixture.executor, "about", "authors.html", &fixture.authors)?;

    assert_eq!(authors.output, "Jo");
    assert_eq!(authors.keys(), vec!["data/authors.json", AUTHORS]);
    Ok(())
}

#[test]
fn test_unmarshal_without_post_call_scan_misses_data_file() -> Result<()> {
    let config = ExecConfig {
        post_call_scan: Vec::new(),
        ..ExecConfig::watching()
    };
    let fixture = SiteFixture::new(&config);
    let authors = render(&fixture.executor, "about", "authors.html", &fixture.authors)?;

    assert_eq!(authors.output, "Jo");
    assert!(!authors.depends_on("data/authors.json"));
    Ok(())
}

#[test]
fn test_build_mode_records_nothing() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::default());
    let scopes = render_posts(&fixture)?;

    for (_, rendered) in &scopes {
        assert!(rendered.deps.is_empty());
    }
    assert!(scopes[0].1.output.contains("<h1>First</h1>"));
    Ok(())
}
