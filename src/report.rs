//! Observers of a pipeline run.
//!
//! The orchestrator tells a [`Reporter`] when a stage starts and hands it
//! each finished batch before any decision is taken on it, so the operator
//! sees every failure detail before being asked what to do.

use indicatif::ProgressBar;

use crate::outcome::Batch;
use crate::phases::Stage;
use crate::policy::AbortReason;

pub trait Reporter: Send + Sync {
    /// Progress bar for a stage about to process `len` items.
    fn progress(&self, _stage: Stage, _len: u64) -> ProgressBar {
        ProgressBar::hidden()
    }

    fn provisioned(&self, _batch: &Batch) {}

    fn synchronized(&self, _batch: &Batch) {}

    fn aborted(&self, _reason: &AbortReason) {}
}

/// A reporter that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}
