//! # Error Handling
//!
//! This module defines the centralized error type for the `up2` library. It
//! uses the `thiserror` library to describe every failure that can escape a
//! library call, with enough context (command, repository, URL) to be shown
//! to the operator as-is.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all library failures.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Per-repository failures during a batch stage are *not* reported through
//! this type. Workers capture them as `Failed` outcomes so that one broken
//! repository never stops its siblings; `Error` is reserved for problems
//! that make a whole stage impossible to start, such as an unreadable
//! source path or a rejected login.

use thiserror::Error;

/// Main error type for up2 operations
#[derive(Error, Debug)]
pub enum Error {
    /// The repository source (directory or list file) could not be used.
    #[error("Repository source error: {path} - {message}")]
    Source { path: String, message: String },

    /// A `git` invocation failed.
    #[error("Git command failed for {repository}: {command} - {stderr}")]
    GitCommand {
        command: String,
        repository: String,
        stderr: String,
    },

    /// `git remote add` refused a name the repository already uses.
    #[error("Remote {name} already exists in {repository}")]
    RemoteExists { name: String, repository: String },

    /// An HTTP request to the hosting provider failed before a response
    /// body could be read.
    #[error("HTTP request error: {url} - {message}")]
    Http { url: String, message: String },

    /// The hosting provider rejected a request (bad credentials, missing
    /// scopes, unexpected payload).
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    /// Reading an answer from the terminal failed.
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// The run configuration is not usable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON decoding error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http {
            url: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
            message: err.to_string(),
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Prompt {
            message: err.to_string(),
        }
    }
}
