//! Configuration model for pressline.
//!
//! [`SiteConfig`] describes the external tools (bundler, site generator), the
//! dev server, the watch registrations and the SharePoint rewrite. It is
//! loaded through [`ConfigDiscovery`] and never changes after startup.

pub mod config;
pub mod discovery;
pub mod error;
pub mod mode;
pub mod pipeline;
pub mod settings;

pub use config::SiteConfig;
pub use discovery::{discover, ConfigDiscovery, CONFIG_FILE, ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use mode::{BuildMode, DeployTarget, RunConfig};
pub use pipeline::{
    render_module, LoaderConfig, OutputConfig, PipelineConfig, PluginConfig, ProductionOverrides,
    RuleConfig, StatsProfile, STATS_MARKER,
};
pub use settings::*;
