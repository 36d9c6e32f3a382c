//! Stage 3: Synchronization
//!
//! Pushes every branch and tag of each repository to its remote project.
//!
//! Each push goes through a transient remote: a new remote with a unique
//! name is added, pushed to, and removed again. The removal happens on every
//! exit path, including a failed or panicking push, through the
//! [`TransientRemote`] guard. Remotes the repository already had are never
//! touched.

use std::path::Path;

use log::{debug, info, warn};

use super::Stage;
use crate::error::Error;
use crate::outcome::{Batch, Outcome};
use crate::policy::SyncItem;
use crate::pool::WorkerPool;
use crate::provider::Account;
use crate::report::Reporter;
use crate::repository::{transient_remote_name, GitOperations, PushOptions};

/// Everything a synchronization worker needs besides the item.
pub struct Synchronization<'a> {
    pub git: &'a dyn GitOperations,
    /// HTTP credentials for the push, if any.
    pub account: Option<&'a Account>,
    pub remote_prefix: &'a str,
}

/// Removes its remote when dropped.
pub struct TransientRemote<'a> {
    git: &'a dyn GitOperations,
    repo: &'a Path,
    name: String,
    armed: bool,
}

impl<'a> TransientRemote<'a> {
    /// Add `name` pointing at `url`.
    ///
    /// Removal is attempted even if adding fails half-way, except when git
    /// refused the name because the repository already had such a remote:
    /// that one belongs to the operator.
    pub fn add(
        git: &'a dyn GitOperations,
        repo: &'a Path,
        name: String,
        url: &str,
    ) -> (Self, crate::error::Result<()>) {
        let added = git.add_remote(repo, &name, url);
        let armed = !matches!(added, Err(Error::RemoteExists { .. }));
        let guard = Self {
            git,
            repo,
            name,
            armed,
        };
        (guard, added)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TransientRemote<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.git.remove_remote(self.repo, &self.name) {
            Ok(()) => debug!("removed remote {} from {}", self.name, self.repo.display()),
            Err(e) => warn!(
                "could not remove remote {} from {}: {}",
                self.name,
                self.repo.display(),
                e
            ),
        }
    }
}

impl Synchronization<'_> {
    /// Push one repository. The outcome is `Success` or `Failed`.
    pub fn sync_one(&self, item: &SyncItem) -> Outcome {
        let repo = item.item.path();

        let existing = self.git.list_remotes(repo).unwrap_or_else(|e| {
            warn!("could not list remotes of {}: {}", repo.display(), e);
            Vec::new()
        });
        let name = transient_remote_name(self.remote_prefix, &existing);

        let (remote, added) = TransientRemote::add(self.git, repo, name, &item.remote_location);
        let pushed = added.and_then(|()| {
            let options = PushOptions {
                force: item.force,
                account: self.account,
                url: &item.remote_location,
            };
            self.git.push(repo, remote.name(), &options)
        });
        drop(remote);

        match pushed {
            Ok(()) => Outcome::success(item.item.clone(), item.remote_location.clone()),
            Err(e) => Outcome::failed(
                item.item.clone(),
                Some(item.remote_location.clone()),
                e.to_string(),
            ),
        }
    }

    /// Push every item. The batch holds one outcome per item.
    pub fn run(&self, items: Vec<SyncItem>, pool: &WorkerPool, reporter: &dyn Reporter) -> Batch {
        let progress = reporter.progress(Stage::Synchronization, items.len() as u64);
        let pool = pool.clone().with_progress(progress.clone());

        let outcomes = pool.run(
            items,
            |item| self.sync_one(item),
            |item, message| {
                Outcome::failed(item.item.clone(), Some(item.remote_location.clone()), message)
            },
        );
        progress.finish_and_clear();

        let batch = Batch::new(outcomes);
        info!("synchronization finished: {}", batch.counts());
        batch
    }
}
