//! Top-level configuration structure.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::settings::{
    ArtifactSettings, BundlerSettings, GeneratorSettings, RewriteSettings, ServerSettings,
    WatchSettings,
};

/// Everything pressline needs to know about a site project.
///
/// Every section has defaults matching the conventional Jekyll + webpack
/// layout, so a project without `pressline.toml` still builds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub bundler: BundlerSettings,

    #[serde(default)]
    pub generator: GeneratorSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub artifacts: ArtifactSettings,

    #[serde(default)]
    pub rewrite: RewriteSettings,
}

impl SiteConfig {
    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.bundler.command.iter().all(|part| part.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "bundler.command",
                "provide the bundler program, e.g. [\"npx\", \"webpack\"]",
            ));
        }

        let pipeline = &self.bundler.pipeline;
        if pipeline.entry.is_empty() || pipeline.entry.values().any(Vec::is_empty) {
            return Err(ConfigError::invalid(
                "bundler.pipeline.entry",
                "every entry chunk needs at least one module",
            ));
        }

        if self.generator.program.trim().is_empty() {
            return Err(ConfigError::invalid(
                "generator.program",
                "provide the generator executable, e.g. \"jekyll\"",
            ));
        }

        for (field, name) in [("rewrite.from", &self.rewrite.from), ("rewrite.to", &self.rewrite.to)] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::invalid(field, "must be a bare file name"));
            }
        }
        if self.rewrite.from == self.rewrite.to {
            return Err(ConfigError::invalid(
                "rewrite.to",
                "must differ from rewrite.from",
            ));
        }

        for registration in &self.watch.registrations {
            if registration.patterns.is_empty() {
                return Err(ConfigError::invalid(
                    "watch.registrations",
                    format!("registration for '{}' has no patterns", registration.task),
                ));
            }
            for pattern in &registration.patterns {
                glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            }
        }

        Ok(())
    }
}
