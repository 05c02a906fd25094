//! Run mode selection.
//!
//! A [`RunConfig`] is built once by a top-level command and handed to every
//! task by value. It is `Copy` and has no setters, so no task can switch the
//! active mode halfway through a sequence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which configuration variant the bundler and generator use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }

    pub fn is_development(self) -> bool {
        matches!(self, BuildMode::Development)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => f.write_str("development"),
            BuildMode::Production => f.write_str("production"),
        }
    }
}

/// Hosting target of the generated site.
///
/// SharePoint document libraries serve `default.aspx` as the folder default
/// document, so that target needs the output rewrite pass and the extra
/// generator configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployTarget {
    #[default]
    Standard,
    SharePoint,
}

impl DeployTarget {
    pub fn is_sharepoint(self) -> bool {
        matches!(self, DeployTarget::SharePoint)
    }
}

/// Mode and target of one command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunConfig {
    mode: BuildMode,
    target: DeployTarget,
}

impl RunConfig {
    pub const fn new(mode: BuildMode, target: DeployTarget) -> Self {
        Self { mode, target }
    }

    /// Watch-mode development loop.
    pub const fn development() -> Self {
        Self::new(BuildMode::Development, DeployTarget::Standard)
    }

    /// One-shot production build.
    pub const fn production() -> Self {
        Self::new(BuildMode::Production, DeployTarget::Standard)
    }

    /// Production build for SharePoint hosting.
    pub const fn sharepoint() -> Self {
        Self::new(BuildMode::Production, DeployTarget::SharePoint)
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn target(&self) -> DeployTarget {
        self.target
    }
}
