//! Command-line interface definition for pressline.
//!
//! # Command Structure
//!
//! - `pressline` / `pressline dev` - bundle, generate, then serve and watch
//! - `pressline build` - one-shot production build
//! - `pressline build-sp` - production build for SharePoint hosting

mod commands;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{BuildArgs, Command};

/// pressline - build and live-reload a Jekyll + webpack site
#[derive(Parser, Debug)]
#[command(
    name = "pressline",
    version,
    about = "Build and live-reload a Jekyll + webpack site",
    long_about = "pressline drives webpack and Jekyll through one pipeline.\n\
                  Without a subcommand it bundles, generates the site, serves it with live\n\
                  reload and rebuilds whatever changed. `build` and `build-sp` produce\n\
                  production output, the latter ready for SharePoint hosting."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Config file to use instead of pressline.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute (defaults to the development loop)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The subcommand, falling back to the development loop.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}
