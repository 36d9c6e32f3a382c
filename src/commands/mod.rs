//! # CLI Command Implementations
//!
//! Each subcommand of `up2` lives in its own file with an `Args` struct
//! derived with `clap` and an `execute` function that drives the `up2`
//! library. Terminal-only pieces shared by the commands (progress bars,
//! grouped result listings, interactive decisions) are in [`console`].

pub mod completions;
pub mod console;
pub mod gitee;
pub mod scan;

use up2::output::OutputConfig;

/// Settings from global flags, shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Globals {
    pub output: OutputConfig,
    pub workers: usize,
}
