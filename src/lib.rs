//! # up2
//!
//! This library moves many local git repositories to a remote hosting
//! service in one run: it creates one remote project per repository and then
//! pushes every branch and tag to it. It is designed to be used by the `up2`
//! command-line tool, but the pipeline only talks to its collaborators
//! through traits, so it can be driven from other programs (or tests) too.
//!
//! ## Quick Example
//!
//! ```
//! use serde_json::json;
//! use up2::classify::{classify, ResponseShape};
//! use up2::outcome::{OutcomeKind, WorkItem};
//!
//! let answer = json!({"error": {"base": "already exists"}});
//! let result = classify(
//!     &answer,
//!     ResponseShape::default(),
//!     "https://gitee.com/zoker/blogine.git",
//! );
//! assert_eq!(result.kind, OutcomeKind::Exists);
//!
//! let outcome = result.into_outcome(WorkItem::new("/srv/repos/blogine"));
//! assert_eq!(
//!     outcome.remote_location(),
//!     Some("https://gitee.com/zoker/blogine.git")
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Outcomes (`outcome`)**: Work items, per-item outcomes and the batches
//!   each stage produces.
//! - **Worker Pool (`pool`)**: A bounded pool of threads that runs one
//!   operation over a list of items with per-item failure isolation.
//! - **Classification (`classify`)**: Maps a provider's creation response to
//!   created / already exists / failed.
//! - **Policy (`policy`)**: The operator's batch-wide decisions about failed
//!   and colliding repositories.
//! - **Providers (`provider`)**: The remote hosting service (Gitee).
//! - **Git (`repository`, `git`)**: Local repository checks and pushes
//!   through transient remotes.
//!
//! ## Execution Flow
//!
//! The entry point is [`phases::orchestrator::Pipeline`]:
//!
//! 1.  **Discovery**: Find the git repositories in a directory or list file
//!     and measure their size.
//! 2.  **Provisioning**: Create one remote project per repository.
//! 3.  **Policy**: Ask (at most) two batch-wide questions about failures and
//!     name collisions.
//! 4.  **Synchronization**: Push all branches and tags of the remaining
//!     repositories.

pub mod classify;
pub mod config;
pub mod error;
pub mod git;
pub mod outcome;
pub mod output;
pub mod phases;
pub mod policy;
pub mod pool;
pub mod provider;
pub mod report;
pub mod repository;

#[cfg(test)]
mod pool_proptest;
