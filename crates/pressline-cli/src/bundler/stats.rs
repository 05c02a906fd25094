//! Build reports printed by the bundler reporter plugin.

use pressline_config::STATS_MARKER;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::ui;

/// One completed build, as emitted by `stats.toJson()`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildStats {
    pub version: Option<String>,
    /// Build time in milliseconds
    pub time: Option<u64>,
    pub assets: Vec<AssetStats>,
    pub errors: Vec<StatsMessage>,
    pub warnings: Vec<StatsMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetStats {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// Older bundlers report plain strings, newer ones objects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatsMessage {
    Text(String),
    Detailed {
        message: String,
        #[serde(rename = "moduleName", default)]
        module_name: Option<String>,
    },
}

impl fmt::Display for StatsMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsMessage::Text(text) => f.write_str(text),
            StatsMessage::Detailed {
                message,
                module_name: Some(module),
            } => write!(f, "{module}: {message}"),
            StatsMessage::Detailed { message, .. } => f.write_str(message),
        }
    }
}

impl BuildStats {
    /// Parse a marker line. Returns `None` for ordinary output, and for marker
    /// lines whose payload is not a stats object (logged at debug).
    pub fn parse_line(line: &str) -> Option<Self> {
        let payload = line.trim().strip_prefix(STATS_MARKER)?;
        match serde_json::from_str(payload.trim()) {
            Ok(stats) => Some(stats),
            Err(err) => {
                tracing::debug!("Unreadable bundler report: {err}");
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.time.map(Duration::from_millis)
    }

    /// One-line description of the build outcome.
    pub fn headline(&self) -> String {
        let version = self
            .version
            .as_deref()
            .map(|v| format!("webpack {v}"))
            .unwrap_or_else(|| "bundler".to_string());
        let time = self
            .duration()
            .map(|d| format!(" in {}", ui::format_duration(d)))
            .unwrap_or_default();

        match (self.errors.len(), self.warnings.len()) {
            (0, 0) => format!("{version} built{time}"),
            (0, w) => format!("{version} built{time} with {w} warning(s)"),
            (e, _) => format!("{version} failed{time} with {e} error(s)"),
        }
    }

    /// `(name, size)` of every emitted asset.
    pub fn asset_sizes(&self) -> Vec<(String, u64)> {
        self.assets
            .iter()
            .map(|asset| (asset.name.clone(), asset.size))
            .collect()
    }

    /// Log the summary: headline, asset table and every message.
    pub fn log(&self) {
        if self.has_errors() {
            ui::error(&self.headline());
        } else {
            ui::success(&self.headline());
        }

        let assets = self.asset_sizes();
        if !assets.is_empty() {
            ui::print_asset_summary(&assets, self.duration());
        }

        for error in &self.errors {
            tracing::error!("Bundler: {error}");
        }
        for warning in &self.warnings {
            tracing::warn!("Bundler: {warning}");
        }
    }
}
