use std::path::Path;
use std::process::{Command, Output};

use log::debug;
use url::Url;

use crate::error::Error;

/// Run `git` inside `repo` and return its stdout.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Any authentication configured in ~/.gitconfig
fn run(repo: &Path, args: &[&str], label: &str) -> Result<String, Error> {
    let mut command = Command::new("git");
    command.arg("-C").arg(repo).args(args);
    execute(command, repo, label)
}

fn execute(mut command: Command, repo: &Path, label: &str) -> Result<String, Error> {
    debug!("git {} (in {})", label, repo.display());
    let output = command
        .output()
        .map_err(|e| Error::GitCommand {
            command: label.to_string(),
            repository: repo.display().to_string(),
            stderr: e.to_string(),
        })?;
    check(repo, label, output)
}

fn check(repo: &Path, label: &str, output: Output) -> Result<String, Error> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        let stderr = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure your account can push to the remote.\n\
                Error: {}",
                stderr.trim()
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitCommand {
            command: label.to_string(),
            repository: repo.display().to_string(),
            stderr,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `path` itself is a git repository (work tree or bare).
///
/// Parent directories are not searched: a plain folder inside some other
/// checkout is not a repository.
pub fn is_repository(path: &Path) -> bool {
    let Ok(path) = path.canonicalize() else {
        return false;
    };
    if !path.is_dir() {
        return false;
    }
    let mut command = Command::new("git");
    command.arg("-C").arg(&path).args(["rev-parse", "--git-dir"]);
    if let Some(parent) = path.parent() {
        command.env("GIT_CEILING_DIRECTORIES", parent);
    }
    command
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Names of the remotes configured in `repo`.
pub fn list_remotes(repo: &Path) -> Result<Vec<String>, Error> {
    let stdout = run(repo, &["remote"], "remote")?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn add_remote(repo: &Path, name: &str, url: &str) -> Result<(), Error> {
    match run(repo, &["remote", "add", name, url], "remote add") {
        Ok(_) => Ok(()),
        Err(Error::GitCommand { stderr, .. }) if stderr.contains("already exists") => {
            Err(Error::RemoteExists {
                name: name.to_string(),
                repository: repo.display().to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

pub fn remove_remote(repo: &Path, name: &str) -> Result<(), Error> {
    run(repo, &["remote", "remove", name], "remote remove").map(|_| ())
}

/// Refspecs pushing every branch and tag, with a leading `+` when forced.
pub fn mirror_refspecs(force: bool) -> [String; 2] {
    let prefix = if force { "+" } else { "" };
    [
        format!("{}refs/heads/*:refs/heads/*", prefix),
        format!("{}refs/tags/*:refs/tags/*", prefix),
    ]
}

/// Push all branches and tags to `remote`.
///
/// `push_url`, when given, overrides the remote's URL for this invocation
/// only. It travels in `GIT_CONFIG_KEY_0`/`GIT_CONFIG_VALUE_0` rather than a
/// `-c` argument so embedded credentials never show up in the process list,
/// and it is never written to the repository configuration.
pub fn push_all(repo: &Path, remote: &str, force: bool, push_url: Option<&str>) -> Result<(), Error> {
    let label = if force { "push --force" } else { "push" };
    execute(push_command(repo, remote, force, push_url), repo, label).map(|_| ())
}

fn push_command(repo: &Path, remote: &str, force: bool, push_url: Option<&str>) -> Command {
    let mut command = Command::new("git");
    command
        .arg("-C")
        .arg(repo)
        .args(["push", "--porcelain", remote])
        .args(mirror_refspecs(force));
    if let Some(push_url) = push_url {
        command
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", format!("remote.{}.pushurl", remote))
            .env("GIT_CONFIG_VALUE_0", push_url);
    }
    command
}

/// `url` with `username` and `password` embedded, for HTTP(S) pushes.
/// Other schemes (ssh, file) are returned unchanged.
pub fn with_credentials(url: &str, username: &str, password: &str) -> Result<String, Error> {
    let mut parsed = Url::parse(url)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Ok(url.to_string());
    }
    let invalid = |what: &str| Error::InvalidConfig {
        message: format!("cannot set {} on push URL {}", what, url),
    };
    parsed
        .set_username(username)
        .map_err(|_| invalid("username"))?;
    parsed
        .set_password(Some(password))
        .map_err(|_| invalid("password"))?;
    Ok(parsed.to_string())
}
