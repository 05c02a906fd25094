//! Bundler pipeline configuration.
//!
//! The development configuration is the base record. The production variant
//! is derived from it by [`PipelineConfig::for_mode`], which clones the base
//! and applies [`ProductionOverrides`] on the clone: extra plugins are
//! appended, the devtool is swapped and watch mode is turned off. Entries and
//! loader rules are carried over untouched.

mod defaults;
pub mod render;
mod stats;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::mode::BuildMode;

pub use render::{render_module, STATS_MARKER};
pub use stats::StatsProfile;

/// Bundler configuration for one build mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory entry paths are resolved against (relative to the project root)
    #[serde(default = "defaults::context")]
    pub context: PathBuf,

    /// Named entry chunks, each a list of modules relative to `context`
    #[serde(default = "defaults::entry")]
    pub entry: BTreeMap<String, Vec<String>>,

    /// Keep the bundler resident and rebuild on source changes
    #[serde(default = "defaults::watch")]
    pub watch: bool,

    /// Source map style
    #[serde(default = "defaults::devtool")]
    pub devtool: String,

    #[serde(default)]
    pub output: OutputConfig,

    /// Loader rules, one per file type
    #[serde(default = "defaults::rules")]
    pub rules: Vec<RuleConfig>,

    #[serde(default = "defaults::plugins")]
    pub plugins: Vec<PluginConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context: defaults::context(),
            entry: defaults::entry(),
            watch: defaults::watch(),
            devtool: defaults::devtool(),
            output: OutputConfig::default(),
            rules: defaults::rules(),
            plugins: defaults::plugins(),
        }
    }
}

impl PipelineConfig {
    /// Configuration to hand the bundler for `mode`.
    ///
    /// Never mutates `self`; the development variant is a plain clone.
    pub fn for_mode(&self, mode: BuildMode, overrides: &ProductionOverrides) -> PipelineConfig {
        let mut config = self.clone();
        if mode.is_production() {
            config.plugins.extend(overrides.plugins.iter().cloned());
            config.devtool = overrides.devtool.clone();
            config.watch = false;
        }
        config
    }

    /// Path of the bundle artifact relative to the project root.
    pub fn bundle_path(&self) -> PathBuf {
        self.output.path.join(&self.output.filename)
    }
}

/// Where the bundle is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory relative to the project root
    #[serde(default = "defaults::output_path")]
    pub path: PathBuf,

    #[serde(default = "defaults::output_filename")]
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
            filename: defaults::output_filename(),
        }
    }
}

/// A loader rule for one family of source files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Regular expression source matched against module paths
    pub test: String,

    /// Regular expression source for paths to skip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// Loader chain, applied last to first
    pub loaders: Vec<LoaderConfig>,

    /// Module exposing a static `extract()` that wraps the loader chain
    /// (used to pull stylesheets out of the bundle into their own file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub loader: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl LoaderConfig {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// A bundler plugin, instantiated as `new (require(module).export)(options)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub module: String,

    /// Dotted property path below the module export, e.g. `optimize.UglifyJsPlugin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl PluginConfig {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            export: None,
            options: None,
        }
    }

    pub fn export(mut self, export: impl Into<String>) -> Self {
        self.export = Some(export.into());
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// Additive changes applied on top of the base config for production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOverrides {
    #[serde(default = "defaults::production_devtool")]
    pub devtool: String,

    /// Appended after the base plugins
    #[serde(default = "defaults::production_plugins")]
    pub plugins: Vec<PluginConfig>,
}

impl Default for ProductionOverrides {
    fn default() -> Self {
        Self {
            devtool: defaults::production_devtool(),
            plugins: defaults::production_plugins(),
        }
    }
}
