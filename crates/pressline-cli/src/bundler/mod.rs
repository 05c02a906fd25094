//! Bundler invocation.
//!
//! The pipeline configuration for the active mode is rendered to a CommonJS
//! module and handed to the bundler with `--config`. The module's reporter
//! plugin prints one marker line per finished build; those lines are parsed
//! into [`BuildStats`] and summarised, everything else on stdout is logged
//! under the `Bundler:` tag.
//!
//! In development the bundler keeps running in its own watch mode and
//! [`Bundler::run`] returns after the first report with a [`BundlerHandle`].
//! In production it returns once the process has exited.

mod stats;

pub use stats::{AssetStats, BuildStats, StatsMessage};

use pressline_config::{render_module, BuildMode, BundlerSettings};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{CliError, Result, ResultExt};
use crate::output::OutputLines;

/// What the stdout reader saw over the lifetime of the process.
#[derive(Debug, Default)]
pub struct ReportLog {
    /// Number of builds reported
    pub builds: usize,
    /// Number of reported builds that had errors
    pub failed: usize,
    pub last: Option<BuildStats>,
}

/// Result of one bundler invocation.
#[derive(Debug)]
pub enum BundleOutcome {
    /// First build reported; the process keeps watching.
    Resident {
        first: BuildStats,
        handle: BundlerHandle,
    },
    /// The process exited.
    Finished {
        reports: ReportLog,
        status: ExitStatus,
    },
}

impl BundleOutcome {
    /// Describe why this outcome counts as a failed bundle, if it does.
    pub fn problem(&self) -> Option<String> {
        match self {
            BundleOutcome::Resident { first, .. } if first.has_errors() => {
                Some(first.headline())
            }
            BundleOutcome::Resident { .. } => None,
            BundleOutcome::Finished { reports, status } => {
                if reports.builds == 0 {
                    Some(format!("bundler exited ({status}) without reporting a build"))
                } else if reports.failed > 0 {
                    Some(
                        reports
                            .last
                            .as_ref()
                            .filter(|last| last.has_errors())
                            .map(BuildStats::headline)
                            .unwrap_or_else(|| format!("{} build(s) failed", reports.failed)),
                    )
                } else {
                    None
                }
            }
        }
    }
}

/// A bundler process left running in watch mode.
#[derive(Debug)]
pub struct BundlerHandle {
    child: Child,
    stdout: JoinHandle<ReportLog>,
    stderr: JoinHandle<()>,
}

impl BundlerHandle {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the process and stop reading its output.
    ///
    /// Grandchildren of the bundler may keep the pipes open, so the readers
    /// are aborted rather than drained.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.child.kill().await {
            tracing::debug!("Bundler already stopped: {err}");
        }
        self.stdout.abort();
        self.stderr.abort();
    }
}

/// Launches the bundler for a project.
#[derive(Debug, Clone)]
pub struct Bundler {
    settings: BundlerSettings,
    root: PathBuf,
}

impl Bundler {
    pub fn new(settings: BundlerSettings, root: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            root: root.into(),
        }
    }

    /// Absolute path of the rendered configuration module.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(&self.settings.config_file)
    }

    /// Render the configuration for `mode` and write it to disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file or its directory cannot be written
    pub async fn write_config(&self, mode: BuildMode) -> Result<PathBuf> {
        let config = self
            .settings
            .pipeline
            .for_mode(mode, &self.settings.production);
        let source = render_module(&config, &self.settings.stats, &self.root);

        let path = self.config_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.with_path(parent)?;
        }
        tokio::fs::write(&path, source)
            .await
            .context(format!("Failed to write {}", path.display()))?;

        tracing::debug!("Wrote bundler config to {}", path.display());
        Ok(path)
    }

    /// The process command line for a config file.
    ///
    /// # Errors
    ///
    /// Returns error if the configured command has no program
    pub fn command(&self, config_path: &Path) -> Result<Command> {
        let mut parts = self
            .settings
            .command
            .iter()
            .filter(|part| !part.trim().is_empty());
        let program = parts
            .next()
            .ok_or_else(|| CliError::InvalidArgument("bundler.command is empty".to_string()))?;

        let mut command = Command::new(program_name(program));
        command
            .args(parts)
            .arg("--config")
            .arg(config_path)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(command)
    }

    /// Write the config, start the bundler and wait for the first build
    /// (development) or for the process to exit (production).
    ///
    /// # Errors
    ///
    /// Returns error if the config cannot be written or the process cannot
    /// be started.
    pub async fn run(&self, mode: BuildMode) -> Result<BundleOutcome> {
        let config_path = self.write_config(mode).await?;
        let mut command = self.command(&config_path)?;
        let program = command
            .as_std()
            .get_program()
            .to_string_lossy()
            .into_owned();

        tracing::debug!("Running {program} for a {mode} bundle");
        let mut child = command
            .spawn()
            .map_err(|err| CliError::spawn(program, err))?;

        let (first_tx, mut first_rx) = oneshot::channel();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = tokio::spawn(read_reports(stdout, first_tx));
        let stderr_reader = tokio::spawn(read_stderr(stderr));

        if mode.is_development() {
            let first = tokio::select! {
                report = &mut first_rx => report.ok(),
                _ = child.wait() => None,
            };

            if let Some(first) = first {
                return Ok(BundleOutcome::Resident {
                    first,
                    handle: BundlerHandle {
                        child,
                        stdout: stdout_reader,
                        stderr: stderr_reader,
                    },
                });
            }
        }

        let reports = stdout_reader
            .await
            .map_err(|err| CliError::Custom(format!("Bundler output reader failed: {err}")))?;
        let _ = stderr_reader.await;
        let status = child.wait().await?;
        tracing::debug!("Bundler exited with {status}");

        Ok(BundleOutcome::Finished { reports, status })
    }
}

/// `npx` is a batch script on Windows.
fn program_name(program: &str) -> String {
    if cfg!(windows) && program == "npx" {
        "npx.cmd".to_string()
    } else {
        program.to_string()
    }
}

async fn read_reports<R>(stream: Option<R>, first_tx: oneshot::Sender<BuildStats>) -> ReportLog
where
    R: AsyncRead + Unpin,
{
    let mut log = ReportLog::default();
    let Some(stream) = stream else {
        return log;
    };

    let mut first_tx = Some(first_tx);
    let mut lines = OutputLines::new(stream);
    while let Some(line) = lines.next_line().await {
        match BuildStats::parse_line(&line) {
            Some(stats) => {
                stats.log();
                log.builds += 1;
                if stats.has_errors() {
                    log.failed += 1;
                }
                if let Some(tx) = first_tx.take() {
                    let _ = tx.send(stats.clone());
                }
                log.last = Some(stats);
            }
            None if line.trim().is_empty() => {}
            None => tracing::info!("Bundler: {line}"),
        }
    }
    log
}

async fn read_stderr<R>(stream: Option<R>)
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };
    let mut lines = OutputLines::new(stream);
    while let Some(line) = lines.next_line().await {
        if !line.trim().is_empty() {
            tracing::warn!("Bundler: {line}");
        }
    }
}
