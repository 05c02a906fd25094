//! pressline - build and live-reload a Jekyll + webpack site.
//!
//! Parses the command line, sets up logging and colours, then hands over to
//! the selected command.

use clap::Parser;
use miette::Result;
use pressline_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    commands::execute(args)
        .await
        .map_err(error::cli_error_to_miette)
}
