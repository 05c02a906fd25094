use serde::{Deserialize, Serialize};

/// Options passed to the bundler's `stats.toJson()` for every build report.
///
/// Assets, errors, version and timing are kept; chunk, module, reason and
/// source detail is dropped so a report stays one short summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsProfile {
    pub hash: bool,
    pub version: bool,
    pub timings: bool,
    pub assets: bool,
    pub chunks: bool,
    pub chunk_modules: bool,
    pub modules: bool,
    pub children: bool,
    pub cached: bool,
    pub reasons: bool,
    pub source: bool,
    pub error_details: bool,
    pub chunk_origins: bool,
}

impl Default for StatsProfile {
    fn default() -> Self {
        Self {
            hash: false,
            version: true,
            timings: true,
            assets: true,
            chunks: false,
            chunk_modules: false,
            modules: false,
            children: false,
            cached: false,
            reasons: false,
            source: false,
            error_details: true,
            chunk_origins: false,
        }
    }
}
