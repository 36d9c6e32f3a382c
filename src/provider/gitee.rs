//! Gitee (<https://gitee.com>) API v5 client.
//!
//! Uses the blocking `reqwest` client: every call is made from a worker
//! thread of the pool, and the pool already bounds concurrency.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{
    AccessToken, Account, CreateRepository, HostingProvider, Namespace, NamespaceKind, User,
};
use crate::config::Visibility;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://gitee.com";

const OAUTH_SCOPE: &str = "user_info projects groups enterprises";
const PAGE_SIZE: &str = "100";
const PROVIDER: &str = "Gitee";

/// Connection settings for a Gitee instance.
#[derive(Debug, Clone)]
pub struct GiteeSettings {
    pub base_url: String,
    /// OAuth application id, needed only for the password grant.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for GiteeSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: None,
            client_secret: None,
            timeout: None,
        }
    }
}

pub struct GiteeClient {
    http: Client,
    base: Url,
    host: String,
    settings: GiteeSettings,
}

#[derive(Debug, Deserialize)]
struct OrgEntry {
    login: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnterpriseEntry {
    path: String,
    #[serde(default)]
    name: Option<String>,
}

impl GiteeClient {
    pub fn new(settings: GiteeSettings) -> Result<Self> {
        let base = Url::parse(settings.base_url.trim_end_matches('/'))?;
        let host = match (base.host_str(), base.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::InvalidConfig {
                    message: format!("base URL '{}' has no host", settings.base_url),
                })
            }
        };

        let mut builder = Client::builder().user_agent(concat!("up2/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base,
            host,
            settings,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn creation_endpoint(&self, namespace: &Namespace) -> Result<Url> {
        match namespace.kind {
            NamespaceKind::Personal => self.endpoint("/api/v5/user/repos"),
            NamespaceKind::Group => self.endpoint(&format!("/api/v5/orgs/{}/repos", namespace.path)),
            NamespaceKind::Enterprise => {
                self.endpoint(&format!("/api/v5/enterprises/{}/repos", namespace.path))
            }
        }
    }

    fn get_json(&self, path: &str, token: &AccessToken) -> Result<Value> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .query(&[("access_token", token.secret()), ("per_page", PAGE_SIZE)])
            .send()?;
        decode(response)
    }

    fn secondary_namespaces<T, F>(&self, path: &str, token: &AccessToken, convert: F) -> Vec<Namespace>
    where
        T: for<'de> Deserialize<'de>,
        F: Fn(T) -> Namespace,
    {
        let listed = self
            .get_json(path, token)
            .and_then(|value| serde_json::from_value::<Vec<T>>(value).map_err(Error::from));
        match listed {
            Ok(entries) => entries.into_iter().map(convert).collect(),
            Err(e) => {
                warn!("could not list namespaces from {}: {}", path, e);
                Vec::new()
            }
        }
    }
}

/// Decode a response body as JSON whatever the status code. Bodies that are
/// not JSON are wrapped in a `message` field so the diagnostic survives.
fn decode(response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text()?;
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => Ok(value),
        Err(_) => {
            debug!("non-JSON response (HTTP {}): {}", status, body);
            let snippet: String = body.chars().take(200).collect();
            Ok(json!({
                "message": format!("unexpected response (HTTP {}): {}", status.as_u16(), snippet.trim())
            }))
        }
    }
}

fn provider_error(message: impl Into<String>) -> Error {
    Error::Provider {
        provider: PROVIDER.to_string(),
        message: message.into(),
    }
}

/// Pull a string field out of a response, or explain why it is missing.
fn required_field(value: &Value, key: &str) -> Result<String> {
    if let Some(found) = value.get(key).and_then(Value::as_str) {
        return Ok(found.to_string());
    }
    let message = value
        .get("error_description")
        .or_else(|| value.get("message"))
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("Unexpected response");
    Err(provider_error(message))
}

impl HostingProvider for GiteeClient {
    fn display_name(&self) -> &str {
        PROVIDER
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn web_url(&self, path: &str) -> String {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(None);
        url.to_string()
    }

    fn authenticate(&self, account: &Account) -> Result<AccessToken> {
        if account.username.is_empty() || account.password.is_empty() {
            return Err(provider_error("Email or Password must be provided!"));
        }
        let (Some(client_id), Some(client_secret)) = (
            self.settings.client_id.as_deref(),
            self.settings.client_secret.as_deref(),
        ) else {
            return Err(Error::InvalidConfig {
                message: "password login needs an OAuth client id and secret (or pass --token)"
                    .to_string(),
            });
        };

        let url = self.endpoint("/oauth/token")?;
        debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "password"),
                ("username", account.username.as_str()),
                ("password", account.password.as_str()),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("scope", OAUTH_SCOPE),
            ])
            .send()?;
        let value = decode(response)?;
        required_field(&value, "access_token").map(AccessToken::new)
    }

    fn current_user(&self, token: &AccessToken) -> Result<User> {
        let value = self.get_json("/api/v5/user", token)?;
        let name = required_field(&value, "name")?;
        let login = required_field(&value, "login")?;
        Ok(User { name, login })
    }

    fn namespaces(&self, token: &AccessToken, user: &User) -> Result<Vec<Namespace>> {
        let mut namespaces = vec![Namespace {
            name: user.name.clone(),
            path: user.login.clone(),
            kind: NamespaceKind::Personal,
        }];
        namespaces.extend(self.secondary_namespaces(
            "/api/v5/user/orgs",
            token,
            |org: OrgEntry| Namespace {
                name: org.name.unwrap_or_else(|| org.login.clone()),
                path: org.login,
                kind: NamespaceKind::Group,
            },
        ));
        namespaces.extend(self.secondary_namespaces(
            "/api/v5/user/enterprises",
            token,
            |ent: EnterpriseEntry| Namespace {
                name: ent.name.unwrap_or_else(|| ent.path.clone()),
                path: ent.path,
                kind: NamespaceKind::Enterprise,
            },
        ));
        Ok(namespaces)
    }

    fn create_repository(&self, request: &CreateRepository<'_>) -> Result<Value> {
        let url = self.creation_endpoint(request.namespace)?;
        let private = if request.visibility == Visibility::Private {
            "true"
        } else {
            "false"
        };
        let mut form = vec![
            ("access_token", request.token.secret()),
            ("name", request.name),
            ("path", request.path),
            ("private", private),
        ];
        if request.namespace.kind == NamespaceKind::Enterprise {
            form.push((
                "public",
                match request.visibility {
                    Visibility::Private => "0",
                    Visibility::Public => "1",
                    Visibility::InnerPublic => "2",
                },
            ));
        }

        debug!("POST {} (name={})", url, request.name);
        let response = self.http.post(url).form(&form).send()?;
        decode(response)
    }
}
