//! # Hosting Providers
//!
//! A [`HostingProvider`] is the remote side of a migration: it logs the
//! operator in, lists the namespaces they may create projects in, and
//! creates one project per request. The pipeline only ever sees the raw JSON
//! answer of a creation request and classifies it itself (see
//! [`crate::classify`]), so a provider implementation stays a thin HTTP
//! wrapper.

pub mod gitee;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::ResponseShape;
use crate::config::Visibility;
use crate::error::Result;

pub use gitee::GiteeClient;

/// What kind of owner a namespace is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamespaceKind {
    Personal,
    Group,
    Enterprise,
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NamespaceKind::Personal => "Personal",
            NamespaceKind::Group => "Group",
            NamespaceKind::Enterprise => "Enterprise",
        };
        f.write_str(label)
    }
}

/// A place projects can be created in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Display name.
    pub name: String,
    /// URL path segment (login, org path or enterprise path).
    pub path: String,
    pub kind: NamespaceKind,
}

/// The logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub login: String,
}

/// Login credentials, also used for HTTP pushes.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An API access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// One project-creation request.
#[derive(Debug, Clone)]
pub struct CreateRepository<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub visibility: Visibility,
    pub namespace: &'a Namespace,
    pub token: &'a AccessToken,
}

/// The remote hosting service projects are created on.
pub trait HostingProvider: Send + Sync {
    /// Name shown to the operator, e.g. `Gitee`.
    fn display_name(&self) -> &str;

    /// Host name used in planned project URLs, e.g. `gitee.com`.
    fn host(&self) -> &str;

    /// Exchange account credentials for an access token.
    fn authenticate(&self, account: &Account) -> Result<AccessToken>;

    fn current_user(&self, token: &AccessToken) -> Result<User>;

    /// Namespaces the user may create projects in, personal first.
    fn namespaces(&self, token: &AccessToken, user: &User) -> Result<Vec<Namespace>>;

    /// Send one creation request and return the decoded response body.
    ///
    /// `Err` means no response body was obtained (transport failure); every
    /// answer the provider did send, error or not, is returned as `Ok`.
    fn create_repository(&self, request: &CreateRepository<'_>) -> Result<Value>;

    /// Web URL of `path` on the provider.
    fn web_url(&self, path: &str) -> String {
        format!("https://{}/{}", self.host(), path)
    }

    /// The clone URL of `name` inside `namespace`.
    fn repository_url(&self, namespace: &Namespace, name: &str) -> String {
        self.web_url(&format!("{}/{}.git", namespace.path, name))
    }

    /// Where the provider puts the interesting parts of a creation response.
    fn response_shape(&self) -> ResponseShape<'static> {
        ResponseShape::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let account = Account {
            username: "zoker@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let token = AccessToken::new("abc123");
        assert!(!format!("{:?}", account).contains("hunter2"));
        assert!(!format!("{:?}", token).contains("abc123"));
        assert_eq!(token.secret(), "abc123");
    }

    #[test]
    fn test_namespace_kind_display() {
        assert_eq!(NamespaceKind::Enterprise.to_string(), "Enterprise");
    }
}
