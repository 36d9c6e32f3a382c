//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.
//!
//! The mocks here implement the library's collaborator traits so that a
//! whole pipeline run can be driven without a network or a `git` binary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use assert_fs::prelude::*;
use serde_json::{json, Value};

use up2::error::{Error, Result};
use up2::provider::{
    AccessToken, Account, CreateRepository, HostingProvider, Namespace, NamespaceKind, User,
};
use up2::repository::{GitOperations, PushOptions};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, init_git_repo, SourceFixture};
}

/// Whether a `git` binary can be run.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run `git init` with one commit in `dir`.
#[allow(dead_code)]
pub fn init_git_repo(dir: &Path) {
    let run = |args: &[&str]| {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .env("GIT_AUTHOR_NAME", "up2 tests")
            .env("GIT_AUTHOR_EMAIL", "tests@example.com")
            .env("GIT_COMMITTER_NAME", "up2 tests")
            .env("GIT_COMMITTER_EMAIL", "tests@example.com")
            .status()
            .expect("Failed to run git");
        assert!(status.success(), "git {:?} failed", args);
    };
    run(&["init", "--quiet"]);
    std::fs::write(dir.join("README.md"), "# test\n").expect("Failed to write README");
    run(&["add", "README.md"]);
    run(&["commit", "--quiet", "-m", "initial"]);
}

/// A temporary source directory holding repository-like subdirectories.
///
/// Directories added with [`SourceFixture::with_marked_repo`] contain a
/// `.git` directory and are recognised by [`MarkerGit`]; real repositories
/// need [`init_git_repo`].
pub struct SourceFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl SourceFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a directory with a `.git` marker and a small payload.
    pub fn with_marked_repo(self, name: &str) -> Self {
        self.temp_dir
            .child(name)
            .child(".git")
            .create_dir_all()
            .expect("Failed to create .git marker");
        self.temp_dir
            .child(name)
            .child("README.md")
            .write_str("# repo\n")
            .expect("Failed to write payload");
        self
    }

    /// Add a directory that is not a repository.
    pub fn with_plain_dir(self, name: &str) -> Self {
        self.temp_dir
            .child(name)
            .child("notes.txt")
            .write_str("not a repository\n")
            .expect("Failed to write file");
        self
    }

    /// Add a real git repository with one commit.
    pub fn with_git_repo(self, name: &str) -> Self {
        let child = self.temp_dir.child(name);
        child.create_dir_all().expect("Failed to create repo dir");
        init_git_repo(child.path());
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn child(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }
}

impl Default for SourceFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// One recorded git operation.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Add { repo: PathBuf, remote: String, url: String },
    Push { repo: PathBuf, remote: String, force: bool },
    Remove { repo: PathBuf, remote: String },
}

/// Treats directories with a `.git` entry as repositories and records every
/// remote operation. Pushes fail for the repository names in `failing`.
#[derive(Default, Clone)]
pub struct MarkerGit {
    pub calls: Arc<Mutex<Vec<GitCall>>>,
    pub failing: HashSet<String>,
}

#[allow(dead_code)]
impl MarkerGit {
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<(String, bool)> {
        let mut pushes: Vec<(String, bool)> = self
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GitCall::Push { repo, force, .. } => Some((base_name(&repo), force)),
                _ => None,
            })
            .collect();
        pushes.sort();
        pushes
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl GitOperations for MarkerGit {
    fn is_repository(&self, path: &Path) -> bool {
        path.join(".git").is_dir()
    }

    fn list_remotes(&self, _repo: &Path) -> Result<Vec<String>> {
        Ok(vec!["origin".to_string()])
    }

    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<()> {
        self.calls.lock().unwrap().push(GitCall::Add {
            repo: repo.to_path_buf(),
            remote: name.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    fn push(&self, repo: &Path, remote: &str, options: &PushOptions<'_>) -> Result<()> {
        self.calls.lock().unwrap().push(GitCall::Push {
            repo: repo.to_path_buf(),
            remote: remote.to_string(),
            force: options.force,
        });
        if self.failing.contains(&base_name(repo)) {
            return Err(Error::GitCommand {
                command: "push".to_string(),
                repository: repo.display().to_string(),
                stderr: "remote: Access denied".to_string(),
            });
        }
        Ok(())
    }

    fn remove_remote(&self, repo: &Path, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(GitCall::Remove {
            repo: repo.to_path_buf(),
            remote: name.to_string(),
        });
        Ok(())
    }
}

/// Answers creation requests from a table of canned responses keyed by
/// project name; unknown names are created.
#[derive(Default)]
pub struct ScriptedProvider {
    pub responses: Vec<(&'static str, Value)>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn namespace() -> Namespace {
        Namespace {
            name: "Zoker".to_string(),
            path: "zoker".to_string(),
            kind: NamespaceKind::Personal,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort();
        requests
    }
}

impl HostingProvider for ScriptedProvider {
    fn display_name(&self) -> &str {
        "Scripted"
    }

    fn host(&self) -> &str {
        "git.example.com"
    }

    fn authenticate(&self, _account: &Account) -> Result<AccessToken> {
        Ok(AccessToken::new("token"))
    }

    fn current_user(&self, _token: &AccessToken) -> Result<User> {
        Ok(User {
            name: "Zoker".to_string(),
            login: "zoker".to_string(),
        })
    }

    fn namespaces(&self, _token: &AccessToken, _user: &User) -> Result<Vec<Namespace>> {
        Ok(vec![Self::namespace()])
    }

    fn create_repository(&self, request: &CreateRepository<'_>) -> Result<Value> {
        self.requests.lock().unwrap().push(request.name.to_string());
        let canned = self
            .responses
            .iter()
            .find(|(name, _)| *name == request.name)
            .map(|(_, response)| response.clone());
        Ok(canned.unwrap_or_else(|| {
            json!({
                "html_url": format!("https://git.example.com/{}/{}", request.namespace.path, request.name)
            })
        }))
    }
}
