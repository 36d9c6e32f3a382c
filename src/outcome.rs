//! Work items, per-item outcomes and stage batches.
//!
//! A [`WorkItem`] is one local repository. Every stage of the pipeline turns
//! a list of work items into a [`Batch`] holding exactly one [`Outcome`] per
//! item. Batches are unordered: workers finish in whatever order the network
//! and filesystem allow, so anything that reports results must group them
//! with [`Batch::of_kind`] instead of relying on arrival order.

use std::fmt;
use std::path::{Path, PathBuf};

/// A local repository selected for migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkItem {
    path: PathBuf,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last path component, used as the remote project name.
    ///
    /// Trailing separators are ignored, so `/srv/repos/blogine/` yields
    /// `blogine`. Falls back to the full path when there is no final
    /// component (for example `/`).
    pub fn base_name(&self) -> String {
        self.path
            .components()
            .next_back()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .filter(|name| !name.is_empty() && name != "/" && name != ".")
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// The three ways a single item can end up after a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    /// The remote project name is already taken.
    Exists,
    Failed,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 3] = [OutcomeKind::Success, OutcomeKind::Exists, OutcomeKind::Failed];
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeKind::Success => "Success",
            OutcomeKind::Exists => "Exists",
            OutcomeKind::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// The classified result of one operation on one [`WorkItem`].
///
/// Constructed only through [`Outcome::success`], [`Outcome::exists`] and
/// [`Outcome::failed`], which keeps `detail` empty exactly when the kind is
/// `Success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    item: WorkItem,
    remote_location: Option<String>,
    kind: OutcomeKind,
    detail: Option<String>,
}

impl Outcome {
    pub fn success(item: WorkItem, remote_location: impl Into<String>) -> Self {
        Self {
            item,
            remote_location: Some(remote_location.into()),
            kind: OutcomeKind::Success,
            detail: None,
        }
    }

    pub fn exists(
        item: WorkItem,
        remote_location: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            item,
            remote_location: Some(remote_location.into()),
            kind: OutcomeKind::Exists,
            detail: Some(non_empty(detail.into())),
        }
    }

    /// A failed outcome. `remote_location` is kept when the failure happened
    /// after the remote was known (a push that was rejected).
    pub fn failed(
        item: WorkItem,
        remote_location: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            item,
            remote_location,
            kind: OutcomeKind::Failed,
            detail: Some(non_empty(detail.into())),
        }
    }

    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn remote_location(&self) -> Option<&str> {
        self.remote_location.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

fn non_empty(detail: String) -> String {
    if detail.trim().is_empty() {
        "unknown error".to_string()
    } else {
        detail
    }
}

/// Per-kind tallies of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub success: usize,
    pub exists: usize,
    pub failed: usize,
}

impl StageCounts {
    pub fn total(&self) -> usize {
        self.success + self.exists + self.failed
    }

    pub fn get(&self, kind: OutcomeKind) -> usize {
        match kind {
            OutcomeKind::Success => self.success,
            OutcomeKind::Exists => self.exists,
            OutcomeKind::Failed => self.failed,
        }
    }
}

impl fmt::Display for StageCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} already existed, {} failed",
            self.success, self.exists, self.failed
        )
    }
}

/// All outcomes of one stage, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    outcomes: Vec<Outcome>,
}

impl Batch {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter()
    }

    /// Outcomes of one kind, sorted by item path so reports are stable.
    pub fn of_kind(&self, kind: OutcomeKind) -> Vec<&Outcome> {
        let mut selected: Vec<&Outcome> =
            self.outcomes.iter().filter(|o| o.kind == kind).collect();
        selected.sort_by(|a, b| a.item.cmp(&b.item));
        selected
    }

    pub fn counts(&self) -> StageCounts {
        self.outcomes
            .iter()
            .fold(StageCounts::default(), |mut counts, outcome| {
                match outcome.kind {
                    OutcomeKind::Success => counts.success += 1,
                    OutcomeKind::Exists => counts.exists += 1,
                    OutcomeKind::Failed => counts.failed += 1,
                }
                counts
            })
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }
}

impl FromIterator<Outcome> for Batch {
    fn from_iter<T: IntoIterator<Item = Outcome>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
