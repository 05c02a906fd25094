//! Static-site generator invocation.

use pressline_config::{GeneratorSettings, RunConfig};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncRead;
use tokio::process::Command;

use crate::error::{CliError, Result};
use crate::output::OutputLines;

/// Executable name for the current platform.
///
/// Ruby gems install batch wrappers on Windows, so a bare name gets `.bat`.
pub fn program(settings: &GeneratorSettings) -> String {
    platform_program(&settings.program, cfg!(windows))
}

fn platform_program(program: &str, windows: bool) -> String {
    if windows && Path::new(program).extension().is_none() {
        format!("{program}.bat")
    } else {
        program.to_string()
    }
}

/// Argument list for one run.
///
/// Production appends the drafts flag; the SharePoint target appends exactly
/// one `--config=<a>,<b>` argument. The two are independent.
pub fn arguments(settings: &GeneratorSettings, run: RunConfig) -> Vec<String> {
    let mut args = settings.args.clone();

    if run.mode().is_production() && !settings.drafts_flag.is_empty() {
        args.push(settings.drafts_flag.clone());
    }

    if run.target().is_sharepoint() && !settings.sharepoint_configs.is_empty() {
        args.push(format!("--config={}", settings.sharepoint_configs.join(",")));
    }

    args
}

/// The command line as shown to users, e.g. `jekyll build`.
pub fn display_command(settings: &GeneratorSettings) -> String {
    match settings.args.first() {
        Some(first) => format!("{} {}", settings.program, first),
        None => settings.program.clone(),
    }
}

/// Run the generator in `root` and stream its output through the logger.
///
/// Returns after the process has exited and both output streams are
/// drained. The exit status is returned but not judged.
///
/// # Errors
///
/// Returns [`CliError::Spawn`] if the process cannot be started
pub async fn run(settings: &GeneratorSettings, run: RunConfig, root: &Path) -> Result<ExitStatus> {
    let program = program(settings);
    let args = arguments(settings, run);
    tracing::debug!("Running {program} {}", args.join(" "));

    let mut child = Command::new(&program)
        .args(&args)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| CliError::spawn(program.clone(), err))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    tokio::join!(log_lines(stdout), log_lines(stderr));

    let status = child.wait().await?;
    if !status.success() {
        tracing::debug!("{program} exited with {status}");
    }
    Ok(status)
}

async fn log_lines<R: AsyncRead + Unpin>(stream: Option<R>) {
    let Some(stream) = stream else {
        return;
    };
    let mut lines = OutputLines::new(stream);
    while let Some(line) = lines.next_line().await {
        let line = line.trim_end();
        if !line.trim().is_empty() {
            tracing::info!("Jekyll: {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn defaults() -> GeneratorSettings {
        GeneratorSettings::default()
    }

    #[test]
    fn test_development_args() {
        assert_eq!(
            arguments(&defaults(), RunConfig::development()),
            vec!["build", "--incremental"]
        );
    }

    #[test]
    fn test_production_args_add_drafts() {
        assert_eq!(
            arguments(&defaults(), RunConfig::production()),
            vec!["build", "--incremental", "--drafts"]
        );
    }

    #[test]
    fn test_sharepoint_adds_one_config_argument() {
        let args = arguments(&defaults(), RunConfig::sharepoint());
        assert_eq!(
            args,
            vec![
                "build",
                "--incremental",
                "--drafts",
                "--config=_config.yml,_config_prod.yml"
            ]
        );
    }

    #[test]
    fn test_config_argument_only_with_sharepoint() {
        for run in [RunConfig::development(), RunConfig::production()] {
            let args = arguments(&defaults(), run);
            assert!(args.iter().all(|a| !a.starts_with("--config")));
        }

        let standard = arguments(&defaults(), RunConfig::production());
        let sharepoint = arguments(&defaults(), RunConfig::sharepoint());
        assert_eq!(sharepoint.len(), standard.len() + 1);
        assert_eq!(&sharepoint[..standard.len()], &standard[..]);
    }

    #[test]
    fn test_platform_program() {
        assert_eq!(platform_program("jekyll", false), "jekyll");
        assert_eq!(platform_program("jekyll", true), "jekyll.bat");
        assert_eq!(platform_program("jekyll.cmd", true), "jekyll.cmd");
    }

    #[test]
    fn test_display_command() {
        assert_eq!(display_command(&defaults()), "jekyll build");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let temp = TempDir::new().unwrap();
        let settings = GeneratorSettings {
            program: "pressline-no-such-generator".to_string(),
            ..defaults()
        };

        let err = run(&settings, RunConfig::development(), temp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_root_and_waits_for_exit() {
        let temp = TempDir::new().unwrap();
        let settings = GeneratorSettings {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo built > out.txt; echo done; echo oops >&2; exit 3".to_string(),
            ],
            ..defaults()
        };

        let status = run(&settings, RunConfig::development(), temp.path())
            .await
            .unwrap();

        assert_eq!(status.code(), Some(3));
        let written = std::fs::read_to_string(temp.path().join("out.txt")).unwrap();
        assert_eq!(written.trim(), "built");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_output_keeps_the_generator_alive() {
        let temp = TempDir::new().unwrap();
        let settings = GeneratorSettings {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                r"printf 'Generating caf\351\n'; sleep 0.5; echo 'more output'; echo ok > done.txt"
                    .to_string(),
            ],
            ..defaults()
        };

        let status = run(&settings, RunConfig::development(), temp.path())
            .await
            .unwrap();

        assert!(status.success(), "generator died: {status}");
        assert!(temp.path().join("done.txt").is_file());
    }
}
