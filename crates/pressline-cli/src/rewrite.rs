//! Output rewrite for SharePoint hosting.
//!
//! SharePoint document libraries serve `default.aspx` as a folder's default
//! document, so every generated `index.html` is renamed in place.

use pressline_config::RewriteSettings;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CliError, Result};

/// Every file under `site_dir` whose name is exactly `name`, sorted.
///
/// A missing directory yields no matches.
pub fn find_files(site_dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut matches: Vec<PathBuf> = WalkDir::new(site_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == name)
        .map(|entry| entry.into_path())
        .collect();
    matches.sort();
    matches
}

/// Rename every matching file in the same directory.
///
/// Returns the new paths. Stops at the first failure; files already renamed
/// stay renamed.
///
/// # Errors
///
/// Returns [`CliError::Rename`] naming the file that could not be renamed
pub fn rename_all(site_dir: &Path, settings: &RewriteSettings) -> Result<Vec<PathBuf>> {
    if !site_dir.is_dir() {
        crate::ui::warning(&format!(
            "Rename: {} does not exist, nothing to rename",
            site_dir.display()
        ));
        return Ok(Vec::new());
    }

    let found = find_files(site_dir, &settings.from);
    for path in &found {
        tracing::info!("Rename: {}", path.display());
    }

    let mut renamed = Vec::with_capacity(found.len());
    for from in found {
        let to = from.with_file_name(&settings.to);
        std::fs::rename(&from, &to).map_err(|source| {
            tracing::error!("Rename: failed on {}: {source}", from.display());
            CliError::Rename {
                from: from.clone(),
                to: to.clone(),
                source,
            }
        })?;
        renamed.push(to);
    }

    tracing::info!("Rename: All {} renamed.", settings.from);
    Ok(renamed)
}
