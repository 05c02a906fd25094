//! Tests for config file discovery and loading

use pressline_config::{ConfigDiscovery, ConfigError, WatchTask};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn discovers_pressline_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pressline.toml"),
        r#"
[generator]
program = "bundle"
args = ["exec", "jekyll", "build", "--incremental"]
site_dir = "public"
"#,
    )
    .unwrap();

    let discovery = ConfigDiscovery::new(dir.path());
    let found = discovery.find().unwrap();
    assert_eq!(found.file_name().unwrap(), "pressline.toml");

    let config = discovery.load().unwrap();
    assert_eq!(config.generator.program, "bundle");
    assert_eq!(config.generator.args.len(), 4);
    assert_eq!(config.generator.site_dir, PathBuf::from("public"));
    // untouched sections keep their defaults
    assert_eq!(config.rewrite.to, "default.aspx");
}

#[test]
fn explicit_file_replaces_search() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("config")).unwrap();
    fs::write(
        dir.path().join("config/site.toml"),
        r#"
[[watch.registrations]]
patterns = ["content/**/*.md"]
task = "generate"
"#,
    )
    .unwrap();

    let config = ConfigDiscovery::new(dir.path())
        .with_file("config/site.toml")
        .load()
        .unwrap();
    assert_eq!(config.watch.registrations.len(), 1);
    assert_eq!(config.watch.registrations[0].task, WatchTask::Generate);
}

#[test]
fn invalid_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pressline.toml"),
        r#"
[rewrite]
to = "index.html"
"#,
    )
    .unwrap();

    let result = ConfigDiscovery::new(dir.path()).load();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn unknown_watch_task_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pressline.toml"),
        r#"
[[watch.registrations]]
patterns = ["a/*"]
task = "deploy"
"#,
    )
    .unwrap();

    assert!(ConfigDiscovery::new(dir.path()).load().is_err());
}
