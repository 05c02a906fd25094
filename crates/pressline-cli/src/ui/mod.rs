//! Terminal output for humans: status lines and formatted numbers.
//!
//! Everything goes to stderr so stdout stays free for tool output.
//!
//! # Examples
//!
//! ```no_run
//! use pressline_cli::ui;
//!
//! ui::init_colors(false);
//! ui::info("Starting development pipeline...");
//! ui::success("Build completed in 1.20s");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_asset_total, format_duration, format_size, print_asset_summary};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Decide once whether status lines are colored.
///
/// `--no-color` always wins; otherwise `NO_COLOR`, `FORCE_COLOR` and the
/// terminal capabilities decide.
pub fn init_colors(no_color: bool) {
    COLORS.store(
        !no_color && crate::logger::should_use_colors(),
        Ordering::Relaxed,
    );
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
