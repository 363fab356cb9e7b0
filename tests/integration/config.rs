//! Integration tests for loading session configuration from disk.

use anyhow::Result;
use tempfile::TempDir;

use tplexec::config::{ExecConfig, MethodAlias};

use crate::common::{SiteFixture, render};

#[test]
fn test_load_and_render_with_file_config() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("exec.toml");
    std::fs::write(
        &path,
        r#"
watching = true
post_call_scan = ["Unmarshal"]

[[method_aliases]]
alias = "mainsections"
canonical = "MainSections"
"#,
    )?;

    let config = ExecConfig::load(&path)?;
    assert!(config.watching);
    assert_eq!(config.method_aliases, vec![MethodAlias::new("mainsections", "MainSections")]);

    let fixture = SiteFixture::new(&config);
    let rendered = render(&fixture.executor, "about", "authors.html", &fixture.authors)?;
    assert!(rendered.depends_on("data/authors.json"));
    Ok(())
}

#[test]
fn test_partial_file_keeps_defaults() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("exec.toml");
    std::fs::write(&path, "watching = true\n")?;

    let config = ExecConfig::load(&path)?;
    assert_eq!(config, ExecConfig::watching());
    Ok(())
}

#[test]
fn test_load_errors_name_the_file() -> Result<()> {
    let temp = TempDir::new()?;

    let missing = temp.path().join("missing.toml");
    let err = ExecConfig::load(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("missing.toml"));

    let invalid = temp.path().join("invalid.toml");
    std::fs::write(&invalid, "watching = \"sometimes\"\n")?;
    let err = ExecConfig::load(&invalid).unwrap_err();
    assert!(format!("{err:#}").contains("invalid.toml"));

    let unknown = temp.path().join("unknown.toml");
    std::fs::write(&unknown, "watch = true\n")?;
    assert!(ExecConfig::load(&unknown).is_err());
    Ok(())
}
