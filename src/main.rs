//! # up2 CLI
//!
//! This is the binary entry point for the `up2` command-line tool.
//!
//! Its responsibilities are parsing arguments with `clap`, setting up
//! logging, and running the selected command. Errors are reported by
//! `anyhow` on stderr with exit code 1; a run the operator declines is not an
//! error and exits with 0.
//!
//! The pipeline itself lives in the library crate; the binary only adds the
//! terminal: prompts, progress bars and grouped result listings.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
