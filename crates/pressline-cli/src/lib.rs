//! pressline CLI - one pipeline for a Jekyll + webpack site.
//!
//! The binary drives two external tools: webpack bundles scripts and
//! stylesheets, Jekyll generates the site. In development both are wired to a
//! file watcher and a live-reload server; `build` and `build-sp` produce
//! production output, the latter renamed for SharePoint hosting.
//!
//! # Architecture
//!
//! - [`cli`] - clap definitions
//! - [`commands`] - `default`/`dev`, `build`, `build-sp`
//! - [`tasks`] - named tasks, sequences and failure policies
//! - [`bundler`] - webpack invocation and build reports
//! - [`generator`] - Jekyll invocation
//! - [`rewrite`] - `index.html` to `default.aspx` for SharePoint
//! - [`watch`] - watch registrations and the `notify` watcher
//! - [`dev`] - HTTP server with live reload over SSE
//! - [`output`] - lossy line reader for child process pipes
//! - [`error`], [`logger`], [`ui`] - errors, tracing setup, terminal output
//!
//! # Example
//!
//! ```rust,no_run
//! use pressline_cli::{commands::Project, error::Result};
//!
//! fn main() -> Result<()> {
//!     let project = Project::load(None, None)?;
//!     println!("serving {}", project.config.generator.site_dir.display());
//!     Ok(())
//! }
//! ```

pub mod bundler;
pub mod cli;
pub mod commands;
pub mod copy;
pub mod dev;
pub mod error;
pub mod generator;
pub mod logger;
pub mod output;
pub mod rewrite;
pub mod tasks;
pub mod ui;
pub mod watch;

pub use error::{CliError, Result, ResultExt};
