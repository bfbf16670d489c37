//! # Solution Build CLI
//!
//! This is the binary entry point for the `solution-build` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging from the global `--log-level` flag.
//! - Executing the selected command and reporting its errors.
//!
//! The ordering and checking logic lives in the `solution_build` library
//! crate; the binary only loads inputs and renders results.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
