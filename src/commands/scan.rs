//! # Scan Command Implementation
//!
//! Runs discovery only and prints what a migration would pick up. Nothing
//! is created remotely and no repository is modified.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use up2::config::DEFAULT_SIZE_LIMIT_BYTES;
use up2::phases::discovery;
use up2::pool::WorkerPool;
use up2::repository::SystemGit;

use super::console::{print_repositories, ConsoleReporter};
use super::Globals;

/// List the git repositories found in a directory or list file
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// A directory whose subdirectories are repositories, or a file with one path per line
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `scan` command.
pub fn execute(args: ScanArgs, globals: &Globals) -> Result<()> {
    let reporter = ConsoleReporter::new(globals.output, args.quiet, "remote");
    let repos = discovery::discover(
        &args.source,
        &SystemGit,
        &WorkerPool::new(globals.workers),
        DEFAULT_SIZE_LIMIT_BYTES,
        &reporter,
    )?;

    if repos.is_empty() {
        println!(
            "{}",
            globals.output.error(format!(
                "No git repositories detected in {}",
                args.source.display()
            ))
        );
        return Ok(());
    }

    print_repositories(&repos, &globals.output);
    Ok(())
}
