//! The default command: bundle, generate, serve and rebuild on change.

use pressline_config::RunConfig;
use std::sync::Arc;
use tokio::signal;

use super::Project;
use crate::dev::DevServerState;
use crate::error::{CliError, Result};
use crate::tasks::{
    run_logged, DevSession, PipelineTasks, Sequence, TaskContext, TaskError, TaskName, TaskRunner,
};
use crate::ui;
use crate::watch::{FileChange, WatchRouter};

/// Execute the development loop.
///
/// # Process Flow
///
/// 1. Run the `default` sequence: bundle (watch mode), generate, serve
/// 2. Route every file change to its registered tasks and run them in order
/// 3. Stop the bundler and return on Ctrl+C or when the server stops
///
/// # Errors
///
/// Returns errors for fatal task failures during startup and for a server
/// that stops on its own with an error
pub async fn execute(project: Project) -> Result<()> {
    let run = RunConfig::development();
    let state = Arc::new(DevServerState::new(
        project.root.join(&project.config.generator.site_dir),
    ));
    let context = Arc::new(
        TaskContext::new(run, project.root, project.config).with_live(Arc::clone(&state)),
    );
    let tasks = PipelineTasks::new(Arc::clone(&context));

    if let Err(err) = Sequence::development().run(&tasks).await {
        context.shutdown().await;
        return Err(err);
    }

    let Some(session) = context.take_session() else {
        context.shutdown().await;
        return Err(CliError::Server("dev server did not start".to_string()));
    };

    ui::info("Press Ctrl+C to stop");
    let result = watch_loop(session, &tasks).await;

    context.shutdown().await;
    ui::success("Development server stopped");
    result
}

async fn watch_loop(session: DevSession, tasks: &PipelineTasks) -> Result<()> {
    let DevSession {
        mut server,
        watcher: _watcher,
        mut changes,
        router,
    } = session;

    loop {
        tokio::select! {
            Some(change) = changes.recv() => {
                dispatch_change(&change, &router, tasks).await;
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down development server...");
                server.abort();
                return Ok(());
            }

            joined = &mut server => {
                ui::warning("Server task completed unexpectedly");
                return match joined {
                    Ok(result) => result,
                    Err(err) => Err(CliError::Server(format!("Server task failed: {err}"))),
                };
            }
        }
    }
}

/// Run every task registered for the changed path, one at a time, and
/// return the tasks that ran.
pub async fn dispatch_change<R: TaskRunner + ?Sized>(
    change: &FileChange,
    router: &WatchRouter,
    runner: &R,
) -> Vec<TaskName> {
    let routed = router.route(&change.path);
    if routed.is_empty() {
        return routed;
    }

    let shown = change
        .path
        .strip_prefix(router.root())
        .unwrap_or(&change.path)
        .display()
        .to_string();

    for &task in &routed {
        tracing::info!("Watcher: File {shown} was {}, running {task}", change.kind);
        // warnings are already reported by run_logged
        if let Err(TaskError::Fatal(err)) = run_logged(runner, task).await {
            ui::error(&format!("'{task}' failed: {err}"));
        }
    }
    routed
}
