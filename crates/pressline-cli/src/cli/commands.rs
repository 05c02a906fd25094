use clap::{Args, Subcommand};

/// Available pressline subcommands
#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Bundle, generate and serve with live reload (the default)
    ///
    /// Keeps webpack running in watch mode, builds the site once, then serves
    /// the generated output and re-runs the matching task whenever a watched
    /// file changes. Stops on Ctrl+C.
    #[default]
    #[command(name = "default", alias = "dev")]
    Dev,

    /// Production build
    ///
    /// Runs webpack once with the production plugins, then Jekyll with drafts.
    Build(BuildArgs),

    /// Production build for SharePoint
    ///
    /// Like `build`, plus the SharePoint Jekyll config and renaming every
    /// generated index.html to default.aspx.
    #[command(name = "build-sp")]
    BuildSp(BuildArgs),
}

/// Arguments shared by the production builds
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    /// Stop the build when webpack or Jekyll reports a failure
    ///
    /// By default failures are logged and the remaining steps still run.
    #[arg(long)]
    pub strict: bool,
}
