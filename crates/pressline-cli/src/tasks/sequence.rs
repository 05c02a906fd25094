use futures::future::join_all;
use pressline_config::RunConfig;
use std::time::Instant;

use super::{TaskError, TaskName, TaskResult, TaskRunner};
use crate::error::{CliError, Result};
use crate::ui;

/// What a step does when one of its tasks returns a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log and move on to the next step
    #[default]
    Continue,
    /// Stop the sequence with [`CliError::TaskHalted`]
    Halt,
}

/// Tasks that run concurrently; the sequence waits for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    tasks: Vec<TaskName>,
    policy: FailurePolicy,
}

impl Step {
    pub fn single(task: TaskName) -> Self {
        Self::parallel([task])
    }

    pub fn parallel(tasks: impl IntoIterator<Item = TaskName>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
            policy: FailurePolicy::Continue,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }
}

/// Tasks that completed and warnings collected while running a sequence.
#[derive(Debug, Default)]
pub struct SequenceReport {
    pub completed: Vec<TaskName>,
    pub warnings: Vec<(TaskName, String)>,
}

/// An ordered list of steps behind one top-level command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: &'static str,
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new(name: &'static str, steps: Vec<Step>) -> Self {
        Self { name, steps }
    }

    /// `default`: bundle in watch mode, generate, then serve and watch.
    pub fn development() -> Self {
        Self::new(
            "default",
            vec![
                Step::parallel([TaskName::Bundle]),
                Step::single(TaskName::Generate),
                Step::single(TaskName::Serve),
            ],
        )
    }

    /// `build`: production bundle, then production site.
    pub fn build(strict: bool) -> Self {
        Self::new("build", Self::production_steps(strict))
    }

    /// `build-sp`: `build` followed by the SharePoint rename pass.
    pub fn build_sp(strict: bool) -> Self {
        let mut steps = Self::production_steps(strict);
        steps.push(Step::single(TaskName::Rename));
        Self::new("build-sp", steps)
    }

    /// The sequence behind a run configuration.
    pub fn for_run(run: RunConfig, strict: bool) -> Self {
        if run.mode().is_development() {
            Self::development()
        } else if run.target().is_sharepoint() {
            Self::build_sp(strict)
        } else {
            Self::build(strict)
        }
    }

    fn production_steps(strict: bool) -> Vec<Step> {
        let policy = if strict {
            FailurePolicy::Halt
        } else {
            FailurePolicy::Continue
        };
        vec![
            Step::parallel([TaskName::Bundle]).with_policy(policy),
            Step::single(TaskName::Generate).with_policy(policy),
        ]
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn contains(&self, task: TaskName) -> bool {
        self.steps.iter().any(|step| step.tasks.contains(&task))
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// Returns the first `Fatal` error of a step, or [`CliError::TaskHalted`]
    /// when a warning occurs in a step with [`FailurePolicy::Halt`]. Tasks of
    /// the failing step that were already running are still awaited.
    pub async fn run<R: TaskRunner + ?Sized>(&self, runner: &R) -> Result<SequenceReport> {
        tracing::debug!(sequence = self.name, steps = self.steps.len(), "running sequence");
        let mut report = SequenceReport::default();

        for step in &self.steps {
            let results = join_all(step.tasks.iter().map(|&task| run_logged(runner, task))).await;

            let mut fatal: Option<CliError> = None;
            let mut halted: Option<CliError> = None;

            for (&task, result) in step.tasks.iter().zip(results) {
                match result {
                    Ok(()) => report.completed.push(task),
                    Err(TaskError::Warning(message)) => {
                        if step.policy == FailurePolicy::Halt && halted.is_none() {
                            halted = Some(CliError::TaskHalted {
                                task: task.to_string(),
                                reason: message.clone(),
                            });
                        }
                        report.warnings.push((task, message));
                    }
                    Err(TaskError::Fatal(err)) => {
                        if fatal.is_none() {
                            fatal = Some(err);
                        } else {
                            ui::error(&format!("'{task}' failed: {err}"));
                        }
                    }
                }
            }

            if let Some(err) = fatal.or(halted) {
                return Err(err);
            }
        }

        Ok(report)
    }
}

/// Run one task with the `Starting`/`Finished` log lines around it.
///
/// Warnings are reported here so watch-triggered runs and sequence runs log
/// them the same way.
pub async fn run_logged<R: TaskRunner + ?Sized>(runner: &R, task: TaskName) -> TaskResult {
    tracing::info!("Starting '{task}'...");
    let started = Instant::now();

    let result = runner.run_task(task).await;
    let elapsed = ui::format_duration(started.elapsed());

    match &result {
        Ok(()) => tracing::info!("Finished '{task}' after {elapsed}"),
        Err(TaskError::Warning(message)) => {
            ui::warning(&format!("'{task}': {message}"));
            tracing::info!("Finished '{task}' with warnings after {elapsed}");
        }
        Err(TaskError::Fatal(_)) => tracing::error!("'{task}' errored after {elapsed}"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Mark {
        Start(TaskName),
        End(TaskName),
    }

    #[derive(Default)]
    struct FakeRunner {
        log: Mutex<Vec<Mark>>,
        delays: HashMap<TaskName, u64>,
        warn: Vec<TaskName>,
        fail: Vec<TaskName>,
    }

    #[async_trait]
    impl TaskRunner for FakeRunner {
        async fn run_task(&self, task: TaskName) -> TaskResult {
            self.log.lock().push(Mark::Start(task));
            if let Some(ms) = self.delays.get(&task) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.log.lock().push(Mark::End(task));

            if self.fail.contains(&task) {
                Err(TaskError::Fatal(CliError::Custom(format!("{task} broke"))))
            } else if self.warn.contains(&task) {
                Err(TaskError::Warning(format!("{task} complained")))
            } else {
                Ok(())
            }
        }
    }

    impl FakeRunner {
        fn marks(&self) -> Vec<Mark> {
            self.log.lock().clone()
        }

        fn ran(&self, task: TaskName) -> bool {
            self.marks().contains(&Mark::Start(task))
        }
    }

    #[tokio::test]
    async fn test_next_step_waits_for_whole_group() {
        let runner = FakeRunner {
            delays: HashMap::from([(TaskName::CopyJs, 40), (TaskName::Css, 5)]),
            ..FakeRunner::default()
        };
        let sequence = Sequence::new(
            "test",
            vec![
                Step::parallel([TaskName::CopyJs, TaskName::Css]),
                Step::single(TaskName::Generate),
            ],
        );

        sequence.run(&runner).await.unwrap();

        let marks = runner.marks();
        let generate_start = marks
            .iter()
            .position(|m| *m == Mark::Start(TaskName::Generate))
            .unwrap();
        let slow_end = marks
            .iter()
            .position(|m| *m == Mark::End(TaskName::CopyJs))
            .unwrap();
        assert!(slow_end < generate_start);

        // both group members started before either finished
        assert!(matches!(marks[0], Mark::Start(_)));
        assert!(matches!(marks[1], Mark::Start(_)));
    }

    #[tokio::test]
    async fn test_warning_with_continue_proceeds() {
        let runner = FakeRunner {
            warn: vec![TaskName::Bundle],
            ..FakeRunner::default()
        };

        let report = Sequence::build(false).run(&runner).await.unwrap();

        assert!(runner.ran(TaskName::Generate));
        assert_eq!(report.completed, vec![TaskName::Generate]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].0, TaskName::Bundle);
    }

    #[tokio::test]
    async fn test_warning_with_halt_stops() {
        let runner = FakeRunner {
            warn: vec![TaskName::Bundle],
            ..FakeRunner::default()
        };

        let err = Sequence::build(true).run(&runner).await.unwrap_err();

        assert!(matches!(err, CliError::TaskHalted { ref task, .. } if task == "bundle"));
        assert!(!runner.ran(TaskName::Generate));
    }

    #[tokio::test]
    async fn test_fatal_stops_regardless_of_policy() {
        let runner = FakeRunner {
            fail: vec![TaskName::Generate],
            ..FakeRunner::default()
        };

        let err = Sequence::build_sp(false).run(&runner).await.unwrap_err();

        assert!(err.to_string().contains("generate broke"));
        assert!(!runner.ran(TaskName::Rename));
    }

    #[test]
    fn test_build_has_no_rename() {
        assert!(!Sequence::build(false).contains(TaskName::Rename));
        assert!(!Sequence::build(true).contains(TaskName::Rename));
        assert!(!Sequence::development().contains(TaskName::Rename));
    }

    #[test]
    fn test_build_sp_renames_last() {
        let sequence = Sequence::build_sp(false);
        let last = sequence.steps().last().unwrap();
        assert_eq!(last.tasks(), &[TaskName::Rename]);
        assert_eq!(sequence.steps()[0].tasks(), &[TaskName::Bundle]);
        assert_eq!(sequence.steps()[1].tasks(), &[TaskName::Generate]);
    }

    #[test]
    fn test_strict_only_changes_policies() {
        let lenient = Sequence::build(false);
        let strict = Sequence::build(true);
        assert!(lenient.steps().iter().all(|s| s.policy() == FailurePolicy::Continue));
        assert!(strict.steps().iter().all(|s| s.policy() == FailurePolicy::Halt));
        assert_eq!(
            lenient.steps().iter().map(Step::tasks).collect::<Vec<_>>(),
            strict.steps().iter().map(Step::tasks).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_for_run_picks_sequence() {
        assert_eq!(Sequence::for_run(RunConfig::development(), false).name(), "default");
        assert_eq!(Sequence::for_run(RunConfig::production(), false).name(), "build");
        assert_eq!(Sequence::for_run(RunConfig::sharepoint(), false).name(), "build-sp");
        assert!(Sequence::development().contains(TaskName::Serve));
    }
}
