//! Stage 1: Discovery
//!
//! Turns a repository source into the list of local repositories to migrate.
//!
//! ## Process
//!
//! 1.  **Candidates (`candidates`)**: A source is either a directory, whose
//!     immediate subdirectories are the candidates, or a list file with one
//!     path per line (blank lines and `#` comments are ignored).
//!
//! 2.  **Checking and sizing (`discover`)**: Every candidate is checked in the
//!     worker pool. Those that are git repositories get their on-disk size
//!     summed; those that are not are dropped silently, since a folder that
//!     is not a repository is simply not part of the migration.
//!
//! Repositories above the configured size limit are flagged so the operator
//! can be warned before anything is created remotely.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use super::Stage;
use crate::error::{Error, Result};
use crate::outcome::WorkItem;
use crate::pool::WorkerPool;
use crate::report::Reporter;
use crate::repository::GitOperations;

/// A repository found by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepo {
    pub item: WorkItem,
    pub size_bytes: u64,
    /// Larger than the configured size limit.
    pub oversized: bool,
}

impl LocalRepo {
    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

/// List the candidate paths of a source directory or list file.
pub fn candidates(source: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(source).map_err(|e| Error::Source {
        path: source.display().to_string(),
        message: format!("the path you provided is not a dir or does not exist ({})", e),
    })?;

    let mut paths = if metadata.is_dir() {
        let mut paths = Vec::new();
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                paths.push(entry.path());
            }
        }
        paths
    } else {
        fs::read_to_string(source)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(PathBuf::from)
            .collect()
    };

    paths.sort();
    paths.dedup();
    debug!("{} candidates in {}", paths.len(), source.display());
    Ok(paths)
}

/// Total size in bytes of all files below `path`.
///
/// Unreadable entries are skipped with a warning; the size is a hint for the
/// operator, not a precondition.
pub fn walk_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry while sizing {}: {}", path.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Check and size one candidate. `None` when it is not a repository.
pub fn inspect(path: &Path, git: &dyn GitOperations, size_limit_bytes: u64) -> Option<LocalRepo> {
    if !git.is_repository(path) {
        debug!("not a git repository, skipping: {}", path.display());
        return None;
    }
    let size_bytes = walk_size(path);
    Some(LocalRepo {
        item: WorkItem::new(path),
        size_bytes,
        oversized: size_bytes > size_limit_bytes,
    })
}

/// Run discovery over `source`. The result is sorted by path.
pub fn discover(
    source: &Path,
    git: &dyn GitOperations,
    pool: &WorkerPool,
    size_limit_bytes: u64,
    reporter: &dyn Reporter,
) -> Result<Vec<LocalRepo>> {
    let paths = candidates(source)?;
    let progress = reporter.progress(Stage::Discovery, paths.len() as u64);
    let pool = pool.clone().with_progress(progress.clone());

    let inspected = pool.run(
        paths,
        |path| inspect(path, git, size_limit_bytes),
        |path, message| {
            warn!("could not inspect {}: {}", path.display(), message);
            None
        },
    );
    progress.finish_and_clear();

    let mut repos: Vec<LocalRepo> = inspected.into_iter().flatten().collect();
    repos.sort_by(|a, b| a.item.cmp(&b.item));
    info!("discovered {} git repositories in {}", repos.len(), source.display());
    Ok(repos)
}
