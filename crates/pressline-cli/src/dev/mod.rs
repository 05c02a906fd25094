//! Development server module.
//!
//! Serves the generated site and pushes live-reload events to browsers:
//! - full page reload
//! - a status notice shown without reloading
//! - stylesheet refresh

pub mod config;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use server::DevServer;
pub use state::{DevServerState, SharedState};

use serde::{Deserialize, Serialize};

/// Events pushed to connected browsers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DevEvent {
    /// Reload the page
    Reload,

    /// Show a status message without reloading
    Notify { message: String },

    /// A stylesheet changed; swap it in place
    CssUpdated { path: String },

    /// Client connected
    ClientConnected { id: usize },
}
