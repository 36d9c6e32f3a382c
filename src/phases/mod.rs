//! Implementation of the stages of an up2 migration run.
//!
//! ## Overview
//!
//! A run goes through three batch stages, each a pass of the
//! [`WorkerPool`](crate::pool::WorkerPool) over a list of repositories:
//! 1. Discovery - Find git repositories in a directory or list file and
//!    measure their size
//! 2. Provisioning - Create one remote project per repository
//! 3. Synchronization - Push every branch and tag through a transient remote
//!
//! Between provisioning and synchronization the operator's policy decides
//! which repositories go on (see [`crate::policy`]). A stage always runs to
//! completion before the next one starts; stages never overlap.

use std::fmt;

pub mod discovery;
pub mod orchestrator;
pub mod provisioning;
pub mod synchronization;

/// One pass of the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Discovery,
    Provisioning,
    Synchronization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Discovery => "Scanning repositories",
            Stage::Provisioning => "Creating projects",
            Stage::Synchronization => "Syncing projects",
        };
        f.write_str(label)
    }
}
