//! Integration tests for parallel rendering.
//!
//! One executor and helper serve many renders at once. Each render scope gets
//! its own dependency set; sibling renders sharing a scope must merge into it
//! without losing or duplicating identities.

use std::sync::Arc;
use std::thread;

use anyhow::Result;

use tplexec::config::ExecConfig;
use tplexec::{ExecContext, IdentitySet};

use crate::common::{BASEOF, HEAD, SiteFixture, render};

#[test]
fn test_parallel_renders_keep_scopes_apart() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = fixture
            .pages
            .iter()
            .map(|(path, page)| {
                let executor = &fixture.executor;
                s.spawn(move || render(executor, path, "single.html", page).map(|r| (*path, r)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("render thread panicked")).collect()
    });

    for result in results {
        let (path, rendered) = result?;
        assert_eq!(rendered.keys(), vec![path.to_string(), BASEOF.to_string(), HEAD.to_string()]);
    }
    Ok(())
}

#[test]
fn test_sibling_renders_merge_into_one_scope() -> Result<()> {
    let fixture = SiteFixture::new(&ExecConfig::watching());
    let deps = Arc::new(IdentitySet::new("list"));
    let cx = ExecContext::new().with_dependency_scope(deps.clone());

    thread::scope(|s| {
        for _ in 0..4 {
            for page in fixture.pages.values() {
                let cx = cx.clone();
                let executor = &fixture.executor;
                s.spawn(move || {
                    executor.execute(&cx, "single.html", page).expect("render should succeed");
                });
            }
        }
    });

    let keys: Vec<String> = deps.snapshot().iter().map(|id| id.key().to_string()).collect();
    assert_eq!(keys, vec!["content/posts/first.md", "content/posts/second.md", BASEOF, HEAD]);
    Ok(())
}
