//! `build` and `build-sp`.

use pressline_config::RunConfig;
use std::sync::Arc;
use std::time::Instant;

use super::Project;
use crate::cli::BuildArgs;
use crate::error::Result;
use crate::tasks::{PipelineTasks, Sequence, TaskContext};
use crate::ui;

/// Run the production sequence for `run` and report the outcome.
///
/// # Errors
///
/// Returns the first fatal task error, or the first failure when `--strict`
/// is set
pub async fn execute(project: Project, run: RunConfig, args: &BuildArgs) -> Result<()> {
    let sequence = Sequence::for_run(run, args.strict);
    ui::info(&format!(
        "Running '{}' in {}",
        sequence.name(),
        project.root.display()
    ));

    let started = Instant::now();
    let context = Arc::new(TaskContext::new(run, project.root, project.config));
    let tasks = PipelineTasks::new(Arc::clone(&context));

    let result = sequence.run(&tasks).await;
    context.shutdown().await;
    let report = result?;

    let elapsed = ui::format_duration(started.elapsed());
    if report.warnings.is_empty() {
        ui::success(&format!("'{}' finished in {elapsed}", sequence.name()));
    } else {
        ui::warning(&format!(
            "'{}' finished in {elapsed} with {} failed task(s)",
            sequence.name(),
            report.warnings.len()
        ));
    }
    Ok(())
}
