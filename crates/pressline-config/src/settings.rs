//! Settings for the external tools and the dev loop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::pipeline::{PipelineConfig, ProductionOverrides, StatsProfile};

/// How the bundler is launched and configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundlerSettings {
    /// Program and leading arguments; `--config <config_file>` is appended
    #[serde(default = "default_bundler_command")]
    pub command: Vec<String>,

    /// Where the rendered config module is written, relative to the project root
    #[serde(default = "default_bundler_config_file")]
    pub config_file: PathBuf,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub production: ProductionOverrides,

    #[serde(default)]
    pub stats: StatsProfile,
}

impl Default for BundlerSettings {
    fn default() -> Self {
        Self {
            command: default_bundler_command(),
            config_file: default_bundler_config_file(),
            pipeline: PipelineConfig::default(),
            production: ProductionOverrides::default(),
            stats: StatsProfile::default(),
        }
    }
}

/// Static-site generator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Executable name; `.bat` is appended on Windows when it has no extension
    #[serde(default = "default_generator_program")]
    pub program: String,

    /// Arguments used in every mode
    #[serde(default = "default_generator_args")]
    pub args: Vec<String>,

    /// Flag that includes draft content, added in production
    #[serde(default = "default_drafts_flag")]
    pub drafts_flag: String,

    /// Configuration files layered for the SharePoint target
    #[serde(default = "default_sharepoint_configs")]
    pub sharepoint_configs: Vec<String>,

    /// Directory the generator writes the site to
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            program: default_generator_program(),
            args: default_generator_args(),
            drafts_flag: default_drafts_flag(),
            sharepoint_configs: default_sharepoint_configs(),
            site_dir: default_site_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    /// Overridden by the `PORT` environment variable
    #[serde(default = "default_port")]
    pub port: u16,

    /// Launch a browser once the server is up
    #[serde(default)]
    pub open: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open: false,
        }
    }
}

/// Task re-run when a watched path changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatchTask {
    /// Copy the bundle into the generated site
    CopyJs,
    /// Copy the stylesheet into the generated site
    Css,
    /// Rebuild the site with the generator
    Generate,
}

impl fmt::Display for WatchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchTask::CopyJs => f.write_str("copy-js"),
            WatchTask::Css => f.write_str("css"),
            WatchTask::Generate => f.write_str("generate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRegistration {
    /// Globs relative to the project root
    pub patterns: Vec<String>,
    pub task: WatchTask,
}

impl WatchRegistration {
    pub fn new<I, S>(patterns: I, task: WatchTask) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            task,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSettings {
    #[serde(default = "default_registrations")]
    pub registrations: Vec<WatchRegistration>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            registrations: default_registrations(),
        }
    }
}

/// Build artifacts copied into the generated site during development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSettings {
    #[serde(default = "default_script_artifact")]
    pub script: PathBuf,

    #[serde(default = "default_stylesheet_artifact")]
    pub stylesheet: PathBuf,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            script: default_script_artifact(),
            stylesheet: default_stylesheet_artifact(),
        }
    }
}

/// File rename applied for the SharePoint target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSettings {
    #[serde(default = "default_rewrite_from")]
    pub from: String,

    #[serde(default = "default_rewrite_to")]
    pub to: String,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            from: default_rewrite_from(),
            to: default_rewrite_to(),
        }
    }
}

fn default_bundler_command() -> Vec<String> {
    vec!["npx".to_string(), "webpack".to_string()]
}

fn default_bundler_config_file() -> PathBuf {
    PathBuf::from(".pressline/webpack.config.js")
}

fn default_generator_program() -> String {
    "jekyll".to_string()
}

fn default_generator_args() -> Vec<String> {
    vec!["build".to_string(), "--incremental".to_string()]
}

fn default_drafts_flag() -> String {
    "--drafts".to_string()
}

fn default_sharepoint_configs() -> Vec<String> {
    vec!["_config.yml".to_string(), "_config_prod.yml".to_string()]
}

fn default_site_dir() -> PathBuf {
    PathBuf::from("_site")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_registrations() -> Vec<WatchRegistration> {
    vec![
        WatchRegistration::new(["js/bundle.js"], WatchTask::CopyJs),
        WatchRegistration::new(["css/main.css"], WatchTask::Css),
        WatchRegistration::new(
            [
                "pages/**/*.html",
                "_layouts/*",
                "_includes/*",
                "_posts/*",
                "_data/*",
                "_sets/*",
                "_drafts/*",
            ],
            WatchTask::Generate,
        ),
    ]
}

fn default_script_artifact() -> PathBuf {
    PathBuf::from("js/bundle.js")
}

fn default_stylesheet_artifact() -> PathBuf {
    PathBuf::from("css/main.css")
}

fn default_rewrite_from() -> String {
    "index.html".to_string()
}

fn default_rewrite_to() -> String {
    "default.aspx".to_string()
}
