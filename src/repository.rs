//! # Local Repository Access
//!
//! The pipeline touches local repositories through the [`GitOperations`]
//! trait so that tests can replace real `git` invocations with mocks. The
//! default implementation, [`SystemGit`], delegates to the functions in
//! [`crate::git`].
//!
//! Pushing always goes through a *transient remote*: a uniquely named remote
//! added for one push and removed afterwards, so the repository's existing
//! remotes are never modified.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::provider::Account;

/// How a push should be performed.
#[derive(Debug, Clone, Default)]
pub struct PushOptions<'a> {
    /// Overwrite remote history (`+` refspecs).
    pub force: bool,
    /// HTTP credentials; ignored for non-HTTP remotes.
    pub account: Option<&'a Account>,
    /// The URL the remote points at, used to build the authenticated URL.
    pub url: &'a str,
}

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Whether `path` is itself a git repository.
    fn is_repository(&self, path: &Path) -> bool;

    fn list_remotes(&self, repo: &Path) -> Result<Vec<String>>;

    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<()>;

    /// Push every branch and tag to `remote`.
    fn push(&self, repo: &Path, remote: &str, options: &PushOptions<'_>) -> Result<()>;

    fn remove_remote(&self, repo: &Path, name: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl GitOperations for SystemGit {
    fn is_repository(&self, path: &Path) -> bool {
        crate::git::is_repository(path)
    }

    fn list_remotes(&self, repo: &Path) -> Result<Vec<String>> {
        crate::git::list_remotes(repo)
    }

    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<()> {
        crate::git::add_remote(repo, name, url)
    }

    fn push(&self, repo: &Path, remote: &str, options: &PushOptions<'_>) -> Result<()> {
        let push_url = match options.account {
            Some(account) => Some(crate::git::with_credentials(
                options.url,
                &account.username,
                &account.password,
            )?),
            None => None,
        };
        crate::git::push_all(repo, remote, options.force, push_url.as_deref())
    }

    fn remove_remote(&self, repo: &Path, name: &str) -> Result<()> {
        crate::git::remove_remote(repo, name)
    }
}

/// Pick a remote name `<prefix>-<unix-seconds>` not present in `existing`,
/// appending `-1`, `-2`, ... on clashes.
pub fn transient_remote_name(prefix: &str, existing: &[String]) -> String {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    unique_name(&format!("{}-{}", prefix, seconds), existing)
}

fn unique_name(base: &str, existing: &[String]) -> String {
    if !existing.iter().any(|name| name == base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !existing.iter().any(|name| name == candidate))
        .unwrap_or_else(|| base.to_string())
}
