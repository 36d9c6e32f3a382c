//! Terminal rendering shared by the commands.
//!
//! [`ConsoleReporter`] draws one progress bar per running stage and prints
//! each finished batch grouped by outcome kind, with every detail verbatim.
//! [`TerminalDecisions`] asks the policy questions with `dialoguer`.

use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};

use up2::error::{Error, Result};
use up2::outcome::{Batch, Outcome, OutcomeKind, StageCounts};
use up2::output::OutputConfig;
use up2::phases::discovery::LocalRepo;
use up2::phases::Stage;
use up2::policy::{AbortReason, Checkpoint, DecisionSource, PolicyDecision};
use up2::report::Reporter;

const SEPARATOR: &str = "--------------------------------------------------";

/// Prints stage results to the terminal.
pub struct ConsoleReporter {
    output: OutputConfig,
    quiet: bool,
    provider: String,
}

impl ConsoleReporter {
    /// `provider` names the remote in the synchronization listing.
    pub fn new(output: OutputConfig, quiet: bool, provider: impl Into<String>) -> Self {
        Self {
            output,
            quiet,
            provider: provider.into(),
        }
    }

    /// The lines printed for one provisioning outcome. Collisions show both
    /// the existing project and the provider's message.
    fn provisioning_entry(&self, outcome: &Outcome) -> String {
        let kind = outcome.kind();
        let header = self.output.outcome(
            kind,
            format!(
                "Dir: ({})\n  Status: {}",
                outcome.item(),
                Self::provisioning_label(kind)
            ),
        );
        let result = match kind {
            OutcomeKind::Failed => outcome.detail(),
            _ => outcome.remote_location(),
        }
        .unwrap_or_default();
        let mut entry = format!("{}\n  Result: {}", header, self.output.outcome(kind, result));
        if kind == OutcomeKind::Exists {
            if let Some(detail) = outcome.detail() {
                entry.push_str(&format!("\n  Detail: {}", self.output.outcome(kind, detail)));
            }
        }
        entry
    }

    fn provisioning_label(kind: OutcomeKind) -> &'static str {
        match kind {
            OutcomeKind::Success => "Created",
            OutcomeKind::Exists => "Exists",
            OutcomeKind::Failed => "Error",
        }
    }
}

impl Reporter for ConsoleReporter {
    fn progress(&self, stage: Stage, len: u64) -> ProgressBar {
        if self.quiet || len == 0 {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|e| {
                log::warn!("invalid progress template: {}", e);
                ProgressStyle::default_bar()
            })
            .progress_chars("=>-");
        bar.set_style(style);
        bar.set_message(stage.to_string());
        bar
    }

    fn provisioned(&self, batch: &Batch) {
        println!();
        for kind in OutcomeKind::ALL {
            for outcome in batch.of_kind(kind) {
                println!("{}", self.provisioning_entry(outcome));
                println!("{}", SEPARATOR);
            }
        }
        println!("{}", summary_line(&batch.counts(), "created"));
    }

    fn synchronized(&self, batch: &Batch) {
        println!();
        for kind in [OutcomeKind::Success, OutcomeKind::Failed] {
            for outcome in batch.of_kind(kind) {
                let result = match kind {
                    OutcomeKind::Success => format!("Sync to {} SUCCESS!", self.provider),
                    _ => outcome.detail().unwrap_or_default().to_string(),
                };
                println!(
                    "{}",
                    self.output.outcome(
                        OutcomeKind::Exists,
                        format!(
                            "Dir: ({})\n  {}: {}",
                            outcome.item(),
                            self.provider,
                            outcome.remote_location().unwrap_or_default()
                        )
                    )
                );
                println!("  Result: {}", self.output.outcome(kind, result));
                println!("{}", SEPARATOR);
            }
        }
        println!("{}", summary_line(&batch.counts(), "synced"));
    }

    fn aborted(&self, reason: &AbortReason) {
        match reason {
            AbortReason::Declined(_) => println!("{}", reason),
            _ => println!("{}", self.output.error(reason)),
        }
    }
}

fn summary_line(counts: &StageCounts, verb: &str) -> String {
    match counts.exists {
        0 => format!("{} {}, {} failed", counts.success, verb, counts.failed),
        exists => format!(
            "{} {}, {} already exist, {} failed",
            counts.success, verb, exists, counts.failed
        ),
    }
}

/// Asks policy questions on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDecisions;

impl DecisionSource for TerminalDecisions {
    fn decide(&self, checkpoint: Checkpoint, counts: &StageCounts) -> Result<PolicyDecision> {
        let options = checkpoint.options();
        let labels: Vec<&str> = options.iter().map(|o| checkpoint.label(*o)).collect();
        let affected = match checkpoint {
            Checkpoint::Errors => counts.failed,
            Checkpoint::Collisions => counts.exists,
        };

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} ({} affected)", checkpoint.question(), affected))
            .items(&labels)
            .default(0)
            .interact()?;

        options.get(selection).copied().ok_or_else(|| Error::Prompt {
            message: format!("no option {} at the {} checkpoint", selection, checkpoint),
        })
    }
}

/// Print discovered repositories, numbered, with their size.
pub fn print_repositories(repos: &[LocalRepo], output: &OutputConfig) {
    println!(
        "{}\n",
        output.warning(format!(
            "{} repositories detected, please check below:",
            repos.len()
        ))
    );
    for (i, repo) in repos.iter().enumerate() {
        let size = format!("{:.2}M", repo.size_mib());
        let size = if repo.oversized {
            output.error(size)
        } else {
            output.outcome(OutcomeKind::Success, size)
        };
        println!("{}. {} {}", i + 1, repo.item, size);
    }
    if repos.iter().any(|r| r.oversized) {
        println!(
            "{}",
            output.warning(
                "Warning: some of your local repositories are larger than 1G, please make sure \
                 your account has permission to sync repositories of that size"
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use up2::outcome::WorkItem;

    #[test]
    fn test_summary_line() {
        let counts = StageCounts {
            success: 3,
            exists: 1,
            failed: 1,
        };
        assert_eq!(
            summary_line(&counts, "created"),
            "3 created, 1 already exist, 1 failed"
        );
        let counts = StageCounts {
            success: 4,
            exists: 0,
            failed: 0,
        };
        assert_eq!(summary_line(&counts, "synced"), "4 synced, 0 failed");
    }

    #[test]
    fn test_quiet_reporter_hides_progress() {
        let reporter = ConsoleReporter::new(OutputConfig { use_color: false }, true, "Gitee");
        assert!(reporter.progress(Stage::Provisioning, 10).is_hidden());
    }

    fn plain_reporter() -> ConsoleReporter {
        ConsoleReporter::new(OutputConfig { use_color: false }, true, "Gitee")
    }

    #[test]
    fn test_collision_entry_shows_location_and_detail() {
        let outcome = Outcome::exists(
            WorkItem::new("/srv/repos/taskover"),
            "https://gitee.com/zoker/taskover.git",
            "Repository name already exists",
        );
        let entry = plain_reporter().provisioning_entry(&outcome);
        assert!(entry.contains("Status: Exists"));
        assert!(entry.contains("Result: https://gitee.com/zoker/taskover.git"));
        assert!(entry.contains("Detail: Repository name already exists"));
    }

    #[test]
    fn test_failed_entry_shows_detail_as_result() {
        let outcome = Outcome::failed(
            WorkItem::new("/srv/repos/weekly"),
            None,
            "path: Path is reserved",
        );
        let entry = plain_reporter().provisioning_entry(&outcome);
        assert!(entry.contains("Status: Error"));
        assert!(entry.contains("Result: path: Path is reserved"));
        assert!(!entry.contains("Detail:"));
    }

    #[test]
    fn test_provisioning_labels() {
        assert_eq!(ConsoleReporter::provisioning_label(OutcomeKind::Success), "Created");
        assert_eq!(ConsoleReporter::provisioning_label(OutcomeKind::Exists), "Exists");
        assert_eq!(ConsoleReporter::provisioning_label(OutcomeKind::Failed), "Error");
    }
}
