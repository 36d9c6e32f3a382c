//! # Policy Resolution
//!
//! After provisioning, the operator makes at most two decisions for the
//! whole batch: what to do with the repositories that failed, and what to do
//! with the ones whose name already exists remotely. Each decision is asked
//! once and applied to every item of that kind.
//!
//! The error checkpoint is always evaluated first. Aborting there ends the
//! run without the collision question ever being asked.
//!
//! Decisions come from a [`DecisionSource`]. The binary plugs in a terminal
//! prompt; [`PresetDecisions`] answers from command-line flags; tests use
//! [`ScriptedDecisions`].

use std::fmt;
use std::sync::Mutex;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::outcome::{Batch, OutcomeKind, StageCounts, WorkItem};

/// The operator's answer at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyDecision {
    /// Stop the run
    Abort,
    /// Leave these repositories out of the next stage
    #[value(name = "skip")]
    SkipNonSuccess,
    /// Keep existing projects and push to them with force
    #[value(name = "force")]
    ForceOverwrite,
}

/// A point in the run where the operator is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Some repositories failed to provision.
    Errors,
    /// Some project names already exist.
    Collisions,
}

impl Checkpoint {
    /// Decisions that may be given at this checkpoint, in prompt order.
    pub fn options(&self) -> &'static [PolicyDecision] {
        match self {
            Checkpoint::Errors => &[PolicyDecision::Abort, PolicyDecision::SkipNonSuccess],
            Checkpoint::Collisions => &[
                PolicyDecision::Abort,
                PolicyDecision::SkipNonSuccess,
                PolicyDecision::ForceOverwrite,
            ],
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Checkpoint::Errors => "There are errors on some dirs, what would you like to do?",
            Checkpoint::Collisions => {
                "There are some projects whose name already exists, what would you like to do?"
            }
        }
    }

    /// Human-readable label for an option at this checkpoint.
    pub fn label(&self, decision: PolicyDecision) -> &'static str {
        match decision {
            PolicyDecision::Abort => "Exit and fix them",
            PolicyDecision::SkipNonSuccess => "Skip them",
            PolicyDecision::ForceOverwrite => {
                "Overwrite the remote (same as git push --force, make sure you know what you are doing)"
            }
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::Errors => f.write_str("errors"),
            Checkpoint::Collisions => f.write_str("collisions"),
        }
    }
}

/// Something that can answer a checkpoint. Called exactly once per decision.
pub trait DecisionSource: Send + Sync {
    fn decide(&self, checkpoint: Checkpoint, counts: &StageCounts) -> Result<PolicyDecision>;
}

/// Replays a fixed list of answers and records every checkpoint asked.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    answers: Mutex<Vec<PolicyDecision>>,
    asked: Mutex<Vec<Checkpoint>>,
}

impl ScriptedDecisions {
    pub fn new(answers: impl IntoIterator<Item = PolicyDecision>) -> Self {
        let mut answers: Vec<PolicyDecision> = answers.into_iter().collect();
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Checkpoints asked so far, in order.
    pub fn asked(&self) -> Vec<Checkpoint> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(&self, checkpoint: Checkpoint, _counts: &StageCounts) -> Result<PolicyDecision> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(checkpoint);
        }
        let next = self.answers.lock().ok().and_then(|mut a| a.pop());
        next.ok_or_else(|| Error::Prompt {
            message: format!("no scripted answer left for the {} checkpoint", checkpoint),
        })
    }
}

/// Answers from command-line flags, deferring to `fallback` when a flag was
/// not given.
pub struct PresetDecisions<D> {
    on_error: Option<PolicyDecision>,
    on_exists: Option<PolicyDecision>,
    fallback: D,
}

impl<D: DecisionSource> PresetDecisions<D> {
    pub fn new(
        on_error: Option<PolicyDecision>,
        on_exists: Option<PolicyDecision>,
        fallback: D,
    ) -> Self {
        Self {
            on_error,
            on_exists,
            fallback,
        }
    }
}

impl<D: DecisionSource> DecisionSource for PresetDecisions<D> {
    fn decide(&self, checkpoint: Checkpoint, counts: &StageCounts) -> Result<PolicyDecision> {
        let preset = match checkpoint {
            Checkpoint::Errors => self.on_error,
            Checkpoint::Collisions => self.on_exists,
        };
        match preset {
            Some(decision) => {
                info!("using preset decision {:?} for {}", decision, checkpoint);
                Ok(decision)
            }
            None => self.fallback.decide(checkpoint, counts),
        }
    }
}

/// Why a run stopped before synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Every repository failed to provision.
    NothingSalvageable,
    /// The operator chose to abort at a checkpoint.
    Declined(Checkpoint),
    /// After skipping, no repository is left to push.
    NothingLeft,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::NothingSalvageable | AbortReason::NothingLeft => {
                f.write_str("No repositories are available to be uploaded!")
            }
            AbortReason::Declined(_) => f.write_str("Bye, see you next time!"),
        }
    }
}

/// A repository cleared for synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncItem {
    pub item: WorkItem,
    pub remote_location: String,
    /// Push with force. Set only for projects that already existed and the
    /// operator chose to overwrite.
    pub force: bool,
}

/// The decisions taken for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decisions {
    pub on_failed: Option<PolicyDecision>,
    pub on_exists: Option<PolicyDecision>,
}

/// Resolver progress: counts gathered, decisions taken, decisions applied.
#[derive(Debug)]
enum ResolverState<'a> {
    Collecting(&'a Batch),
    Decided(&'a Batch, Decisions),
    Applied(Resolution),
}

/// The result of resolving one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Proceed {
        items: Vec<SyncItem>,
        decisions: Decisions,
    },
    Abort {
        reason: AbortReason,
        decisions: Decisions,
    },
}

/// Decide and apply the policy for a provisioning batch.
pub fn resolve(batch: &Batch, source: &dyn DecisionSource) -> Result<Resolution> {
    let mut state = ResolverState::Collecting(batch);
    loop {
        state = match state {
            ResolverState::Collecting(batch) => match decide(batch, source)? {
                Ok(decisions) => ResolverState::Decided(batch, decisions),
                Err(resolution) => ResolverState::Applied(resolution),
            },
            ResolverState::Decided(batch, decisions) => {
                ResolverState::Applied(apply(batch, decisions))
            }
            ResolverState::Applied(resolution) => return Ok(resolution),
        };
    }
}

/// Ask the checkpoints in order. `Ok(Err(_))` is an early abort.
fn decide(
    batch: &Batch,
    source: &dyn DecisionSource,
) -> Result<std::result::Result<Decisions, Resolution>> {
    let counts = batch.counts();
    let mut decisions = Decisions::default();
    debug!("resolving policy for batch: {}", counts);

    if counts.total() > 0 && counts.failed == counts.total() {
        return Ok(Err(Resolution::Abort {
            reason: AbortReason::NothingSalvageable,
            decisions,
        }));
    }

    if counts.failed > 0 {
        let decision = ask(source, Checkpoint::Errors, &counts)?;
        decisions.on_failed = Some(decision);
        if decision == PolicyDecision::Abort {
            return Ok(Err(Resolution::Abort {
                reason: AbortReason::Declined(Checkpoint::Errors),
                decisions,
            }));
        }
    }

    if counts.exists > 0 {
        let decision = ask(source, Checkpoint::Collisions, &counts)?;
        decisions.on_exists = Some(decision);
        if decision == PolicyDecision::Abort {
            return Ok(Err(Resolution::Abort {
                reason: AbortReason::Declined(Checkpoint::Collisions),
                decisions,
            }));
        }
    }

    Ok(Ok(decisions))
}

fn ask(
    source: &dyn DecisionSource,
    checkpoint: Checkpoint,
    counts: &StageCounts,
) -> Result<PolicyDecision> {
    let decision = source.decide(checkpoint, counts)?;
    if !checkpoint.options().contains(&decision) {
        return Err(Error::InvalidConfig {
            message: format!("{:?} is not a valid answer for {}", decision, checkpoint),
        });
    }
    info!("{} checkpoint resolved as {:?}", checkpoint, decision);
    Ok(decision)
}

/// Derive the synchronization input from the batch and the decisions.
fn apply(batch: &Batch, decisions: Decisions) -> Resolution {
    let force_existing = decisions.on_exists == Some(PolicyDecision::ForceOverwrite);

    let items: Vec<SyncItem> = batch
        .iter()
        .filter_map(|outcome| {
            let force = match outcome.kind() {
                OutcomeKind::Success => false,
                OutcomeKind::Exists if force_existing => true,
                OutcomeKind::Exists | OutcomeKind::Failed => return None,
            };
            outcome.remote_location().map(|location| SyncItem {
                item: outcome.item().clone(),
                remote_location: location.to_string(),
                force,
            })
        })
        .collect();

    if items.is_empty() {
        Resolution::Abort {
            reason: AbortReason::NothingLeft,
            decisions,
        }
    } else {
        Resolution::Proceed { items, decisions }
    }
}
