//! Orchestrator for a complete migration run
//!
//! This module wires the stages together: provisioning, policy resolution
//! and synchronization, each completing fully before the next begins.
//! Discovery is exposed separately because the operator confirms the
//! discovered list (and logs in) before anything is created remotely.

use std::path::Path;

use log::info;

use super::discovery::{self, LocalRepo};
use super::provisioning::Provisioning;
use super::synchronization::Synchronization;
use crate::config::RunConfig;
use crate::error::Result;
use crate::outcome::{StageCounts, WorkItem};
use crate::policy::{self, AbortReason, DecisionSource, Decisions, Resolution};
use crate::pool::WorkerPool;
use crate::provider::{AccessToken, Account, HostingProvider, Namespace};
use crate::report::Reporter;
use crate::repository::GitOperations;

/// Where the repositories go.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub namespace: &'a Namespace,
    pub token: &'a AccessToken,
    /// HTTP credentials for pushing; `None` relies on the operator's git
    /// credential setup.
    pub account: Option<&'a Account>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Aborted(AbortReason),
}

/// Per-stage counts of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub provisioning: StageCounts,
    pub decisions: Decisions,
    /// `None` when the run stopped before synchronization.
    pub synchronization: Option<StageCounts>,
    pub outcome: RunOutcome,
}

/// The collaborators of a run, borrowed for its duration.
pub struct Pipeline<'a> {
    pub config: &'a RunConfig,
    pub provider: &'a dyn HostingProvider,
    pub git: &'a dyn GitOperations,
    pub decisions: &'a dyn DecisionSource,
    pub reporter: &'a dyn Reporter,
}

impl Pipeline<'_> {
    fn pool(&self) -> WorkerPool {
        WorkerPool::new(self.config.workers)
    }

    /// Stage 1: find and size the repositories in `source`.
    pub fn discover(&self, source: &Path) -> Result<Vec<LocalRepo>> {
        discovery::discover(
            source,
            self.git,
            &self.pool(),
            self.config.size_limit_bytes,
            self.reporter,
        )
    }

    fn provisioning<'b>(&'b self, target: &Target<'b>) -> Provisioning<'b> {
        Provisioning {
            provider: self.provider,
            namespace: target.namespace,
            token: target.token,
            visibility: self.config.visibility,
        }
    }

    /// Stages 2 and 3 over the confirmed `items`.
    pub fn run(&self, items: Vec<WorkItem>, target: &Target<'_>) -> Result<RunSummary> {
        self.config.validate_for(target.namespace.kind)?;
        let pool = self.pool();

        info!("provisioning {} projects in {}", items.len(), target.namespace.path);
        let provisioned = self.provisioning(target).run(items, &pool, self.reporter);
        self.reporter.provisioned(&provisioned);
        let provisioning = provisioned.counts();

        let (sync_items, decisions) = match policy::resolve(&provisioned, self.decisions)? {
            Resolution::Proceed { items, decisions } => (items, decisions),
            Resolution::Abort { reason, decisions } => {
                info!("run stopped before synchronization: {:?}", reason);
                self.reporter.aborted(&reason);
                return Ok(RunSummary {
                    provisioning,
                    decisions,
                    synchronization: None,
                    outcome: RunOutcome::Aborted(reason),
                });
            }
        };
        drop(provisioned);

        info!("synchronizing {} repositories", sync_items.len());
        let synchronization = Synchronization {
            git: self.git,
            account: target.account,
            remote_prefix: &self.config.remote_prefix,
        };
        let synced = synchronization.run(sync_items, &pool, self.reporter);
        self.reporter.synchronized(&synced);

        Ok(RunSummary {
            provisioning,
            decisions,
            synchronization: Some(synced.counts()),
            outcome: RunOutcome::Completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::outcome::Batch;
    use crate::policy::{Checkpoint, PolicyDecision, ScriptedDecisions};
    use crate::provider::{CreateRepository, NamespaceKind, User};
    use crate::repository::PushOptions;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct NamedProvider;

    impl HostingProvider for NamedProvider {
        fn display_name(&self) -> &str {
            "Mock"
        }
        fn host(&self) -> &str {
            "git.example.com"
        }
        fn authenticate(&self, _account: &Account) -> Result<AccessToken> {
            Ok(AccessToken::new("t"))
        }
        fn current_user(&self, _token: &AccessToken) -> Result<User> {
            Err(Error::Provider {
                provider: "Mock".to_string(),
                message: "unused".to_string(),
            })
        }
        fn namespaces(&self, _token: &AccessToken, _user: &User) -> Result<Vec<Namespace>> {
            Ok(Vec::new())
        }
        fn create_repository(&self, request: &CreateRepository<'_>) -> Result<Value> {
            Ok(match request.name {
                name if name.starts_with("fail") => json!({"error": {"name": "invalid"}}),
                name if name.starts_with("dup") => json!({"error": {"base": "exists"}}),
                name => json!({"html_url": format!("https://git.example.com/z/{}", name)}),
            })
        }
    }

    #[derive(Default)]
    struct CountingGit {
        pushes: Mutex<Vec<String>>,
    }

    impl GitOperations for CountingGit {
        fn is_repository(&self, _path: &Path) -> bool {
            true
        }
        fn list_remotes(&self, _repo: &Path) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn add_remote(&self, _repo: &Path, _name: &str, _url: &str) -> Result<()> {
            Ok(())
        }
        fn push(&self, repo: &Path, _remote: &str, _options: &PushOptions<'_>) -> Result<()> {
            self.pushes.lock().unwrap().push(repo.display().to_string());
            Ok(())
        }
        fn remove_remote(&self, _repo: &Path, _name: &str) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl Reporter for RecordingReporter {
        fn provisioned(&self, batch: &Batch) {
            self.events
                .lock()
                .unwrap()
                .push(format!("provisioned:{}", batch.len()));
        }
        fn synchronized(&self, batch: &Batch) {
            self.events
                .lock()
                .unwrap()
                .push(format!("synchronized:{}", batch.len()));
        }
        fn aborted(&self, _reason: &AbortReason) {
            self.events.lock().unwrap().push("aborted".to_string());
        }
    }

    fn namespace() -> Namespace {
        Namespace {
            name: "Z".to_string(),
            path: "z".to_string(),
            kind: NamespaceKind::Personal,
        }
    }

    fn items(names: &[&str]) -> Vec<WorkItem> {
        names.iter().map(|n| WorkItem::new(format!("/r/{}", n))).collect()
    }

    #[test]
    fn test_clean_run_completes() {
        let config = RunConfig::default();
        let git = CountingGit::default();
        let decisions = ScriptedDecisions::default();
        let reporter = RecordingReporter::default();
        let pipeline = Pipeline {
            config: &config,
            provider: &NamedProvider,
            git: &git,
            decisions: &decisions,
            reporter: &reporter,
        };
        let namespace = namespace();
        let token = AccessToken::new("t");
        let target = Target {
            namespace: &namespace,
            token: &token,
            account: None,
        };

        let summary = pipeline.run(items(&["a", "b"]), &target).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.provisioning.success, 2);
        assert_eq!(summary.synchronization.unwrap().success, 2);
        assert_eq!(git.pushes.lock().unwrap().len(), 2);
        assert_eq!(
            *reporter.events.lock().unwrap(),
            vec!["provisioned:2".to_string(), "synchronized:2".to_string()]
        );
    }

    #[test]
    fn test_abort_at_errors_skips_sync() {
        let config = RunConfig::default();
        let git = CountingGit::default();
        let decisions = ScriptedDecisions::new([PolicyDecision::Abort]);
        let reporter = RecordingReporter::default();
        let pipeline = Pipeline {
            config: &config,
            provider: &NamedProvider,
            git: &git,
            decisions: &decisions,
            reporter: &reporter,
        };
        let namespace = namespace();
        let token = AccessToken::new("t");
        let target = Target {
            namespace: &namespace,
            token: &token,
            account: None,
        };

        let summary = pipeline
            .run(items(&["a", "fail1", "dup1"]), &target)
            .unwrap();
        assert_eq!(
            summary.outcome,
            RunOutcome::Aborted(AbortReason::Declined(Checkpoint::Errors))
        );
        assert!(summary.synchronization.is_none());
        assert_eq!(decisions.asked(), vec![Checkpoint::Errors]);
        assert!(git.pushes.lock().unwrap().is_empty());
        assert_eq!(
            *reporter.events.lock().unwrap(),
            vec!["provisioned:3".to_string(), "aborted".to_string()]
        );
    }

    #[test]
    fn test_everything_failed_is_not_salvageable() {
        let config = RunConfig::default();
        let git = CountingGit::default();
        let decisions = ScriptedDecisions::default();
        let reporter = RecordingReporter::default();
        let pipeline = Pipeline {
            config: &config,
            provider: &NamedProvider,
            git: &git,
            decisions: &decisions,
            reporter: &reporter,
        };
        let namespace = namespace();
        let token = AccessToken::new("t");
        let target = Target {
            namespace: &namespace,
            token: &token,
            account: None,
        };

        let summary = pipeline.run(items(&["fail1", "fail2"]), &target).unwrap();
        assert_eq!(
            summary.outcome,
            RunOutcome::Aborted(AbortReason::NothingSalvageable)
        );
        assert!(decisions.asked().is_empty());
    }

    #[test]
    fn test_invalid_visibility_is_rejected_before_provisioning() {
        let config = RunConfig {
            visibility: crate::config::Visibility::InnerPublic,
            ..RunConfig::default()
        };
        let git = CountingGit::default();
        let decisions = ScriptedDecisions::default();
        let reporter = RecordingReporter::default();
        let pipeline = Pipeline {
            config: &config,
            provider: &NamedProvider,
            git: &git,
            decisions: &decisions,
            reporter: &reporter,
        };
        let namespace = namespace();
        let token = AccessToken::new("t");
        let target = Target {
            namespace: &namespace,
            token: &token,
            account: None,
        };

        assert!(pipeline.run(items(&["a"]), &target).is_err());
        assert!(reporter.events.lock().unwrap().is_empty());
    }
}
