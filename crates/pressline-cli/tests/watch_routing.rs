use notify::RecursiveMode;
use pressline_cli::tasks::TaskName;
use pressline_cli::watch::WatchRouter;
use pressline_config::{WatchRegistration, WatchSettings, WatchTask};
use std::path::Path;
use tempfile::TempDir;

fn default_router(root: &Path) -> WatchRouter {
    WatchRouter::new(root, &WatchSettings::default().registrations).unwrap()
}

#[test]
fn test_stylesheet_routes_only_to_css() {
    let temp = TempDir::new().unwrap();
    let router = default_router(temp.path());

    assert_eq!(router.route(Path::new("css/main.css")), vec![TaskName::Css]);
}

#[test]
fn test_default_routes() {
    let temp = TempDir::new().unwrap();
    let router = default_router(temp.path());

    assert_eq!(router.route(Path::new("js/bundle.js")), vec![TaskName::CopyJs]);
    assert_eq!(
        router.route(Path::new("pages/about.html")),
        vec![TaskName::Generate]
    );
    assert_eq!(
        router.route(Path::new("pages/blog/2017/post.html")),
        vec![TaskName::Generate]
    );
    assert_eq!(
        router.route(Path::new("_layouts/default.html")),
        vec![TaskName::Generate]
    );
    assert_eq!(router.route(Path::new("_posts/2017-01-01-hello.md")), vec![TaskName::Generate]);
}

#[test]
fn test_unregistered_paths_route_nowhere() {
    let temp = TempDir::new().unwrap();
    let router = default_router(temp.path());

    assert!(router.route(Path::new("_site/index.html")).is_empty());
    assert!(router.route(Path::new("_layouts/nested/page.html")).is_empty());
    assert!(router.route(Path::new("pages/notes.txt")).is_empty());
    assert!(router.route(Path::new("css/other.css")).is_empty());
}

#[test]
fn test_absolute_paths_inside_root() {
    let temp = TempDir::new().unwrap();
    let router = default_router(temp.path());

    let absolute = router.root().join("css/main.css");
    assert_eq!(router.route(&absolute), vec![TaskName::Css]);

    let outside = Path::new("/definitely/not/the/project/css/main.css");
    assert!(router.route(outside).is_empty());
}

#[test]
fn test_overlapping_registrations_run_each_task_once() {
    let temp = TempDir::new().unwrap();
    let registrations = vec![
        WatchRegistration::new(["_data/*", "_data/*.yml"], WatchTask::Generate),
        WatchRegistration::new(["_data/*.yml"], WatchTask::Css),
    ];
    let router = WatchRouter::new(temp.path(), &registrations).unwrap();

    assert_eq!(
        router.route(Path::new("_data/nav.yml")),
        vec![TaskName::Generate, TaskName::Css]
    );
}

#[test]
fn test_watch_targets_cover_literal_prefixes() {
    let temp = TempDir::new().unwrap();
    let router = default_router(temp.path());
    let root = router.root().to_path_buf();

    let targets = router.watch_targets();

    assert!(targets.contains(&(root.join("js"), RecursiveMode::NonRecursive)));
    assert!(targets.contains(&(root.join("css"), RecursiveMode::NonRecursive)));
    assert!(targets.contains(&(root.join("pages"), RecursiveMode::Recursive)));
    assert!(targets.contains(&(root.join("_layouts"), RecursiveMode::NonRecursive)));
    assert!(targets.iter().all(|(dir, _)| !dir.ends_with("_site")));
    assert_eq!(targets.len(), 9);
}

#[test]
fn test_invalid_pattern_is_rejected() {
    let temp = TempDir::new().unwrap();
    let registrations = vec![WatchRegistration::new(["pages/[.html"], WatchTask::Generate)];
    assert!(WatchRouter::new(temp.path(), &registrations).is_err());
}
