//! File-based config discovery
//!
//! Layers the optional `pressline.toml` and environment overrides on top of the
//! built-in defaults.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use crate::config::SiteConfig;
use crate::error::{ConfigError, Result};

/// Conventional config file name in the project root.
pub const CONFIG_FILE: &str = "pressline.toml";

/// Prefix for nested overrides, e.g. `PRESSLINE_SERVER__PORT=3000`.
pub const ENV_PREFIX: &str = "PRESSLINE_";

/// Finds and loads the site configuration.
///
/// Priority, highest first: `PORT`, `PRESSLINE_*` variables, the config file,
/// the defaults.
///
/// # Example
///
/// ```no_run
/// use pressline_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// assert_eq!(config.generator.program, "jekyll");
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Use `path` instead of searching the root. Relative paths are resolved
    /// against the root, and the file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit = Some(self.root.join(path));
        self
    }

    /// The config file that will be read, if any.
    pub fn find(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return path.is_file().then(|| path.clone());
        }
        let path = self.root.join(CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Build the layered provider without extracting it.
    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(SiteConfig::default()));

        match (&self.explicit, self.find()) {
            (Some(path), None) => return Err(ConfigError::NotFound(path.clone())),
            (_, Some(path)) => {
                tracing::debug!(path = %path.display(), "loading config file");
                figment = figment.merge(Toml::file(path));
            }
            (None, None) => tracing::debug!("no {CONFIG_FILE} found, using defaults"),
        }

        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into())))
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` when an explicit file is missing,
    /// `ConfigError::Load` for malformed TOML or mistyped values, and the
    /// validation errors of [`SiteConfig::validate`].
    pub fn load(&self) -> Result<SiteConfig> {
        let config: SiteConfig = self.figment()?.extract()?;
        config.validate()?;
        Ok(config)
    }
}

/// Load the configuration for the project at `root`.
pub fn discover(root: impl AsRef<Path>) -> Result<SiteConfig> {
    ConfigDiscovery::new(root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_without_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn find_discovers_toml_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "[generator]\nprogram = \"bundle-exec-jekyll\"\n").unwrap();

        assert_eq!(ConfigDiscovery::new(dir.path()).find().unwrap(), config_path);
    }

    #[test]
    fn missing_explicit_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::new(dir.path())
            .with_file("custom.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::NotFound(path)) if path.ends_with("custom.toml")));
    }

    #[test]
    fn malformed_toml_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[server\nport = 1").unwrap();
        assert!(matches!(
            ConfigDiscovery::new(dir.path()).load(),
            Err(ConfigError::Load(_))
        ));
    }
}
