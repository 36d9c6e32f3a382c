//! # Run Configuration
//!
//! All knobs of a migration run live in [`RunConfig`], built once by the CLI
//! from flags and environment variables and handed to the pipeline. Nothing
//! in the library reads process-wide option state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::policy::PolicyDecision;
use crate::pool::DEFAULT_WORKERS;
use crate::provider::NamespaceKind;

/// Repositories larger than this are flagged during discovery (1 GiB).
pub const DEFAULT_SIZE_LIMIT_BYTES: u64 = 1024 * 1024 * 1024;

/// Prefix of the temporary remotes created for pushing.
pub const DEFAULT_REMOTE_PREFIX: &str = "up2";

/// Who can see newly created projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Anyone can see the repository
    Public,
    /// Only members can see the repository
    Private,
    /// Only enterprise members can see the repository
    InnerPublic,
}

impl Visibility {
    /// The choices offered for a namespace, in prompt order.
    pub fn choices_for(kind: NamespaceKind) -> Vec<Visibility> {
        match kind {
            NamespaceKind::Enterprise => {
                vec![Visibility::Public, Visibility::Private, Visibility::InnerPublic]
            }
            _ => vec![Visibility::Public, Visibility::Private],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Visibility::Public => "Public (Anyone can see this repository)",
            Visibility::Private => "Private (Only members can see this repository)",
            Visibility::InnerPublic => {
                "Inner public (Only enterprise members can see this repository)"
            }
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::InnerPublic => "inner-public",
        };
        f.write_str(label)
    }
}

/// Settings for one migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Concurrent workers per stage.
    pub workers: usize,
    /// Discovery flags repositories above this size.
    pub size_limit_bytes: u64,
    pub visibility: Visibility,
    pub remote_prefix: String,
    /// Answer for the error checkpoint, if given up front.
    pub on_error: Option<PolicyDecision>,
    /// Answer for the collision checkpoint, if given up front.
    pub on_exists: Option<PolicyDecision>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            size_limit_bytes: DEFAULT_SIZE_LIMIT_BYTES,
            visibility: Visibility::Private,
            remote_prefix: DEFAULT_REMOTE_PREFIX.to_string(),
            on_error: None,
            on_exists: None,
        }
    }
}

impl RunConfig {
    /// Check the settings that do not depend on the chosen namespace.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig {
                message: "workers must be at least 1".to_string(),
            });
        }
        if self.remote_prefix.trim().is_empty() || self.remote_prefix.contains(char::is_whitespace)
        {
            return Err(Error::InvalidConfig {
                message: format!("invalid remote prefix '{}'", self.remote_prefix),
            });
        }
        if self.on_error == Some(PolicyDecision::ForceOverwrite) {
            return Err(Error::InvalidConfig {
                message: "force-overwrite is not a valid answer for failed repositories"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Check that the visibility can be used in a namespace of `kind`.
    pub fn validate_for(&self, kind: NamespaceKind) -> Result<()> {
        self.validate()?;
        if !Visibility::choices_for(kind).contains(&self.visibility) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "visibility '{}' is only available for enterprise namespaces",
                    self.visibility
                ),
            });
        }
        Ok(())
    }
}
