//! Logging setup for the pressline CLI.
//!
//! Output of the external tools is logged line by line under a fixed tag
//! (`Jekyll:`, `Bundler:`, `Watcher:`), so everything the pipeline does ends
//! up in one stream on stderr.
//!
//! # Example
//!
//! ```rust,no_run
//! use pressline_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Jekyll: Generating...");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "pressline=debug,pressline_cli=debug,pressline_config=debug";
const QUIET_FILTER: &str = "pressline=error,pressline_cli=error,pressline_config=error";
const DEFAULT_FILTER: &str = "pressline=info,pressline_cli=info,pressline_config=info";

/// Initialize the tracing subscriber.
///
/// The level is chosen in this order:
/// 1. `--verbose`: DEBUG for pressline crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`
/// 4. INFO for pressline crates
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal capabilities of stderr decide.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

/// Serialises tests that touch the color environment or the global color
/// switch.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    // tracing can only be initialised once per process, so these only
    // exercise filter construction and color detection.

    #[test]
    fn test_verbose_filter_enables_debug() {
        let filter = filter_for(true, false);
        assert!(filter.to_string().to_lowercase().contains("pressline_cli=debug"));
    }

    #[test]
    fn test_quiet_filter_is_errors_only() {
        let filter = filter_for(false, true);
        assert!(filter.to_string().to_lowercase().contains("pressline=error"));
    }

    #[test]
    fn test_color_env_overrides() {
        let _guard = test_lock();
        std::env::set_var("NO_COLOR", "1");
        std::env::set_var("FORCE_COLOR", "1");
        assert!(!should_use_colors());

        std::env::remove_var("NO_COLOR");
        assert!(should_use_colors());
        std::env::remove_var("FORCE_COLOR");
    }

    #[test]
    fn test_no_color_env_disables_colors() {
        let _guard = test_lock();
        std::env::remove_var("FORCE_COLOR");
        std::env::set_var("NO_COLOR", "1");
        assert!(!should_use_colors());

        crate::ui::init_colors(false);
        assert!(!crate::ui::colors_enabled());
        std::env::remove_var("NO_COLOR");
    }
}
