//! Command implementations for the pressline CLI.
//!
//! - [`build`] - `build` and `build-sp`, one-shot production output
//! - [`dev`] - the default development loop with live reload
//!
//! Every command resolves the project first: the root directory and the
//! loaded [`SiteConfig`].

pub mod build;
pub mod dev;

use pressline_config::{ConfigDiscovery, RunConfig, SiteConfig};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Command};
use crate::error::{CliError, Result};

/// A site project: its root and its configuration.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Project {
    /// Resolve the root and load `pressline.toml` (or `config`) from it.
    ///
    /// # Errors
    ///
    /// Returns error if the root is not a directory or the configuration is
    /// invalid
    pub fn load(cwd: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let root = match cwd {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        if !root.is_dir() {
            return Err(CliError::FileNotFound(root));
        }
        let root = root.canonicalize()?;

        let mut discovery = ConfigDiscovery::new(&root);
        if let Some(file) = config {
            discovery = discovery.with_file(file);
        }

        match discovery.find() {
            Some(file) => tracing::debug!("Using config {}", file.display()),
            None => tracing::debug!("No pressline.toml in {}, using defaults", root.display()),
        }

        let config = discovery.load()?;
        Ok(Self { root, config })
    }
}

/// Run the command selected on the command line.
pub async fn execute(cli: Cli) -> Result<()> {
    let project = Project::load(cli.cwd.as_deref(), cli.config.as_deref())?;

    match cli.command() {
        Command::Dev => dev::execute(project).await,
        Command::Build(args) => build::execute(project, RunConfig::production(), &args).await,
        Command::BuildSp(args) => build::execute(project, RunConfig::sharepoint(), &args).await,
    }
}
