//! File watching for the development loop.
//!
//! [`WatchRouter`] maps a changed path to the tasks registered for it, and
//! [`FileWatcher`] feeds changes from `notify` into a channel. Only the
//! literal directory prefix of each registered glob is watched, so build
//! output elsewhere in the project never produces events.

use glob::{MatchOptions, Pattern};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pressline_config::WatchRegistration;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};
use crate::tasks::TaskName;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// How a watched file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Changed,
    Added,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Changed => "changed",
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

struct Route {
    patterns: Vec<Pattern>,
    task: TaskName,
}

/// Maps changed paths to the tasks registered for them.
pub struct WatchRouter {
    root: PathBuf,
    sources: Vec<String>,
    routes: Vec<Route>,
}

impl WatchRouter {
    /// Compile the registrations. Patterns are relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns error if a pattern is not a valid glob
    pub fn new(root: &Path, registrations: &[WatchRegistration]) -> Result<Self> {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let mut sources = Vec::new();
        let mut routes = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let mut patterns = Vec::with_capacity(registration.patterns.len());
            for source in &registration.patterns {
                let pattern = Pattern::new(source).map_err(|err| {
                    CliError::InvalidArgument(format!("Invalid watch pattern '{source}': {err}"))
                })?;
                patterns.push(pattern);
                sources.push(source.clone());
            }
            routes.push(Route {
                patterns,
                task: registration.task.into(),
            });
        }

        Ok(Self {
            root,
            sources,
            routes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tasks registered for `path`, in registration order, without repeats.
    ///
    /// `path` may be absolute (inside the root) or relative to the root.
    pub fn route(&self, path: &Path) -> Vec<TaskName> {
        let Some(relative) = self.relative(path) else {
            return Vec::new();
        };

        let mut tasks = Vec::new();
        for route in &self.routes {
            let matched = route
                .patterns
                .iter()
                .any(|pattern| pattern.matches_with(&relative, MATCH_OPTIONS));
            if matched && !tasks.contains(&route.task) {
                tasks.push(route.task);
            }
        }
        tasks
    }

    /// Path relative to the root with `/` separators.
    fn relative(&self, path: &Path) -> Option<String> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root).ok()?
        } else {
            path
        };

        let parts: Vec<_> = relative
            .components()
            .map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    /// Directories to watch: the literal prefix of every pattern.
    ///
    /// A directory is watched recursively when any pattern below it can
    /// match more than one level down.
    pub fn watch_targets(&self) -> Vec<(PathBuf, RecursiveMode)> {
        let mut targets: Vec<(PathBuf, RecursiveMode)> = Vec::new();

        for source in &self.sources {
            let (dir, mode) = literal_prefix(source);
            let dir = self.root.join(dir);
            match targets.iter_mut().find(|(existing, _)| *existing == dir) {
                Some((_, existing_mode)) => {
                    if mode == RecursiveMode::Recursive {
                        *existing_mode = RecursiveMode::Recursive;
                    }
                }
                None => targets.push((dir, mode)),
            }
        }

        targets
    }
}

fn is_glob(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Split a pattern into the directory before its first wildcard segment and
/// the depth needed below it.
fn literal_prefix(pattern: &str) -> (PathBuf, RecursiveMode) {
    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let literal = segments.iter().take_while(|s| !is_glob(s)).count();

    if literal == segments.len() {
        // a plain file: watch its directory
        let dir: PathBuf = segments[..literal.saturating_sub(1)].iter().collect();
        return (dir, RecursiveMode::NonRecursive);
    }

    let dir: PathBuf = segments[..literal].iter().collect();
    let rest = &segments[literal..];
    let mode = if rest.len() > 1 || rest.iter().any(|s| s.contains("**")) {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    (dir, mode)
}

/// `notify` watcher feeding [`FileChange`]s into a channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching `targets`. Directories that do not exist are skipped
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the watcher cannot be created or a directory cannot
    /// be watched
    pub fn new(targets: &[(PathBuf, RecursiveMode)]) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let (tx, rx) = mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::debug!("Watcher error: {err}");
                    return;
                }
            };

            let kind = match event.kind {
                EventKind::Create(_) => ChangeKind::Added,
                EventKind::Modify(_) => ChangeKind::Changed,
                EventKind::Remove(_) => ChangeKind::Deleted,
                _ => return,
            };

            for path in event.paths {
                if tx.blocking_send(FileChange { path, kind }).is_err() {
                    return;
                }
            }
        })?;

        let mut watched = Vec::new();
        for (dir, mode) in targets {
            if !dir.is_dir() {
                crate::ui::warning(&format!(
                    "Watcher: {} does not exist, not watching it",
                    dir.display()
                ));
                continue;
            }
            watcher.watch(dir, *mode)?;
            tracing::debug!("Watching {} ({mode:?})", dir.display());
            watched.push(dir.clone());
        }

        Ok((
            Self {
                _watcher: watcher,
                watched,
            },
            rx,
        ))
    }

    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_prefix() {
        assert_eq!(
            literal_prefix("js/bundle.js"),
            (PathBuf::from("js"), RecursiveMode::NonRecursive)
        );
        assert_eq!(
            literal_prefix("pages/**/*.html"),
            (PathBuf::from("pages"), RecursiveMode::Recursive)
        );
        assert_eq!(
            literal_prefix("_layouts/*"),
            (PathBuf::from("_layouts"), RecursiveMode::NonRecursive)
        );
        assert_eq!(
            literal_prefix("*.md"),
            (PathBuf::new(), RecursiveMode::NonRecursive)
        );
        assert_eq!(
            literal_prefix("src/*/style.scss"),
            (PathBuf::from("src"), RecursiveMode::Recursive)
        );
    }

    #[test]
    fn test_change_kind_display() {
        assert_eq!(ChangeKind::Changed.to_string(), "changed");
        assert_eq!(ChangeKind::Added.to_string(), "added");
        assert_eq!(ChangeKind::Deleted.to_string(), "deleted");
    }
}
