//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use up2::output::{ColorChoice, OutputConfig};
use up2::pool::DEFAULT_WORKERS;

use crate::commands::{self, Globals};

/// up2 - Upload many local git repositories to a hosting service at once
#[derive(Parser, Debug)]
#[command(name = "up2")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output
    #[arg(long, global = true, value_name = "WHEN", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Number of repositories processed concurrently in each stage
    #[arg(long, global = true, value_name = "N", env = "UP2_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create projects on Gitee and push all branches and tags of each repository
    Gitee(commands::gitee::GiteeArgs),

    /// List the git repositories found in a directory or list file
    Scan(commands::scan::ScanArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let globals = Globals {
            output: OutputConfig::from_env_and_flag(self.color),
            workers: self.workers,
        };

        match self.command {
            Commands::Gitee(args) => commands::gitee::execute(args, &globals),
            Commands::Scan(args) => commands::scan::execute(args, &globals),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when the CLI is embedded.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "up2", "scan", "/tmp/repos", "--workers", "3", "--color", "never",
        ])
        .unwrap();
        assert_eq!(cli.workers, 3);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_gitee_policy_flags() {
        let cli = Cli::try_parse_from([
            "up2",
            "gitee",
            "/tmp/repos",
            "--on-error",
            "skip",
            "--on-exists",
            "force",
            "--visibility",
            "private",
        ])
        .unwrap();
        let Commands::Gitee(args) = cli.command else {
            panic!("expected gitee command");
        };
        assert_eq!(args.on_error, Some(up2::policy::PolicyDecision::SkipNonSuccess));
        assert_eq!(args.on_exists, Some(up2::policy::PolicyDecision::ForceOverwrite));
        assert_eq!(args.visibility, Some(up2::config::Visibility::Private));
    }
}
