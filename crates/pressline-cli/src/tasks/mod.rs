//! Named pipeline tasks and their composition into sequences.
//!
//! A task is one unit of work (`bundle`, `generate`, `rename`, `serve`,
//! `copy-js`, `css`). A [`Sequence`] is an ordered list of steps; each step
//! is a group of tasks that run concurrently, and the next step starts only
//! after every task of the group has returned.
//!
//! Tasks report problems as [`TaskError`]. A `Warning` is logged and the
//! step's [`FailurePolicy`] decides whether the sequence continues; a `Fatal`
//! error always stops it.

mod context;
mod pipeline;
mod sequence;

pub use context::{DevSession, ReloadGate, TaskContext};
pub use pipeline::PipelineTasks;
pub use sequence::{run_logged, FailurePolicy, Sequence, SequenceReport, Step};

use async_trait::async_trait;
use pressline_config::WatchTask;
use std::fmt;

use crate::error::CliError;

/// Every task the pipeline knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    /// Run the bundler
    Bundle,
    /// Run the static-site generator
    Generate,
    /// Rename generated index pages for SharePoint
    Rename,
    /// Start the dev server and the file watcher
    Serve,
    /// Copy the bundle into the site and reload
    CopyJs,
    /// Copy the stylesheet into the site and refresh styles
    Css,
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskName::Bundle => "bundle",
            TaskName::Generate => "generate",
            TaskName::Rename => "rename",
            TaskName::Serve => "serve",
            TaskName::CopyJs => "copy-js",
            TaskName::Css => "css",
        })
    }
}

impl From<WatchTask> for TaskName {
    fn from(task: WatchTask) -> Self {
        match task {
            WatchTask::CopyJs => TaskName::CopyJs,
            WatchTask::Css => TaskName::Css,
            WatchTask::Generate => TaskName::Generate,
        }
    }
}

/// Why a task did not complete cleanly.
#[derive(Debug)]
pub enum TaskError {
    /// Logged; the step's failure policy decides what happens next
    Warning(String),
    /// Stops the sequence
    Fatal(CliError),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Warning(message) => f.write_str(message),
            TaskError::Fatal(err) => write!(f, "{err}"),
        }
    }
}

impl From<CliError> for TaskError {
    fn from(err: CliError) -> Self {
        TaskError::Fatal(err)
    }
}

pub type TaskResult = Result<(), TaskError>;

/// Runs a named task to completion.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run_task(&self, task: TaskName) -> TaskResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_tasks_map_to_task_names() {
        assert_eq!(TaskName::from(WatchTask::CopyJs), TaskName::CopyJs);
        assert_eq!(TaskName::from(WatchTask::Css), TaskName::Css);
        assert_eq!(TaskName::from(WatchTask::Generate), TaskName::Generate);
    }

    #[test]
    fn test_task_names_match_watch_task_names() {
        for task in [WatchTask::CopyJs, WatchTask::Css, WatchTask::Generate] {
            assert_eq!(TaskName::from(task).to_string(), task.to_string());
        }
    }

    #[test]
    fn test_cli_errors_are_fatal() {
        let err: TaskError = CliError::Custom("boom".to_string()).into();
        assert!(matches!(err, TaskError::Fatal(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
