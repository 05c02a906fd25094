use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};

/// Copy a build artifact into the generated site, keeping its relative path.
///
/// `js/bundle.js` lands at `<site_dir>/js/bundle.js`. Returns the target.
pub async fn copy_into_site(root: &Path, artifact: &Path, site_dir: &Path) -> Result<PathBuf> {
    let source = root.join(artifact);
    let target = site_dir.join(artifact);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await.with_path(parent)?;
    }
    tokio::fs::copy(&source, &target).await.with_path(&source)?;

    tracing::debug!("Copied {} to {}", source.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_creates_target_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("css/main.css"), "body{}").unwrap();

        let target = copy_into_site(root, Path::new("css/main.css"), &root.join("_site"))
            .await
            .unwrap();

        assert_eq!(target, root.join("_site/css/main.css"));
        assert_eq!(fs::read_to_string(target).unwrap(), "body{}");
    }

    #[tokio::test]
    async fn test_missing_artifact() {
        let temp = TempDir::new().unwrap();
        let err = copy_into_site(temp.path(), Path::new("js/bundle.js"), &temp.path().join("_site"))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p.ends_with("js/bundle.js")));
    }
}
