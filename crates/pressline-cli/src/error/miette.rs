//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Spawn { program, source } => miette::miette!(
            help = format!("Check that `{program}` is installed and on your PATH"),
            "Failed to start '{}': {}",
            program,
            source
        ),
        CliError::Rename { from, to, source } => miette::miette!(
            help = "Files renamed before the failure keep their new name; rerun `pressline build-sp` after fixing the cause",
            "Failed to rename {} to {}: {}",
            from.display(),
            to.display(),
            source
        ),
        CliError::TaskHalted { task, reason } => miette::miette!(
            help = "Drop --strict to log task failures and keep going",
            "Task '{}' failed: {}",
            task,
            reason
        ),
        CliError::Config(e) => miette::miette!(
            help = "Check pressline.toml and PRESSLINE_* environment variables",
            "Configuration error: {}",
            e
        ),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_report_has_help() {
        let err = CliError::spawn(
            "jekyll",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        let report = cli_error_to_miette(err);
        let help = report.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("jekyll"));
        assert!(report.to_string().contains("Failed to start 'jekyll'"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let report = cli_error_to_miette(CliError::Custom("boom".to_string()));
        assert_eq!(report.to_string(), "boom");
    }
}
