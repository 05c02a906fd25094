//! Formatting utilities for sizes, durations, and build summaries.

use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format file size in human-readable format.
///
/// Converts bytes to the most appropriate unit (B, KB, MB, GB).
///
/// # Arguments
///
/// * `bytes` - Size in bytes
///
/// # Returns
///
/// Formatted string (e.g., "1.50 MB")
///
/// # Examples
///
/// ```
/// use pressline_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// Converts to the most appropriate unit (ms, s, m:s).
///
/// # Arguments
///
/// * `duration` - Duration to format
///
/// # Returns
///
/// Formatted string (e.g., "1.50s", "2m 30s")
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pressline_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

/// Print the assets of one bundler build to stderr.
///
/// # Arguments
///
/// * `assets` - Slice of (name, size_bytes) pairs
/// * `duration` - Build time reported by the bundler, if any
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use pressline_cli::ui::print_asset_summary;
///
/// print_asset_summary(
///     &[
///         ("bundle.js".to_string(), 234_567),
///         ("../css/main.css".to_string(), 15_234),
///     ],
///     Some(Duration::from_millis(1200)),
/// );
/// ```
pub fn print_asset_summary(assets: &[(String, u64)], duration: Option<Duration>) {
    let term = Term::stderr();
    let width = (term.size().1 as usize).min(80);
    let colors = super::colors_enabled();

    let title = "Bundle Summary";
    if colors {
        eprintln!("\n{}", title.bold().underline());
    } else {
        eprintln!("\n{}", title);
    }
    eprintln!("{}", "─".repeat(width));

    for (name, size) in assets {
        let size_str = format_size(*size);
        if colors {
            eprintln!("  {} {} {}", "▸".blue(), name.bright_white().bold(), size_str.dimmed());
        } else {
            eprintln!("  ▸ {} {}", name, size_str);
        }
    }

    eprintln!("{}", "─".repeat(width));

    eprintln!("  {}", format_asset_total(assets, duration));
}

/// The closing line of an asset summary, e.g. `Total: 20.50 KB in 1.53s`.
pub fn format_asset_total(assets: &[(String, u64)], duration: Option<Duration>) -> String {
    let total = format_size(assets.iter().map(|(_, size)| size).sum());
    match duration {
        Some(duration) => format!("Total: {} in {}", total, format_duration(duration)),
        None => format!("Total: {}", total),
    }
}
