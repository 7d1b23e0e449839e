//! CLI front-end for the `snaptile` configuration manifest.
//!
//! The engine itself is embedded by a window-management host; this module
//! only manages the on-disk manifest file and exposes its JSON Schema.

mod commands;

use clap::Parser;
pub use commands::Cli;

use crate::error::LayoutError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), LayoutError> {
    let cli = Cli::parse();
    cli.execute()
}
