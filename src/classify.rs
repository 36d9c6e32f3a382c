//! Classification of repository-creation responses.
//!
//! The provider answers a creation request with a JSON object that either
//! carries the new project's URL or an `error` object keyed by the offending
//! field. [`classify`] maps that payload onto an [`OutcomeKind`] without
//! knowing anything else about the provider.

use serde_json::Value;

use crate::outcome::{Outcome, OutcomeKind, WorkItem};

/// Detail used when the response matches none of the known shapes.
pub const UNEXPECTED_RESPONSE: &str = "unexpected response from provider";

/// The provider-agnostic result of classifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: OutcomeKind,
    /// The project URL for `Success` and `Exists`, the diagnostic otherwise.
    pub location_or_detail: String,
    /// The provider's message for `Exists`.
    pub detail: Option<String>,
}

/// Which response fields carry meaning for a given provider.
#[derive(Debug, Clone, Copy)]
pub struct ResponseShape<'a> {
    /// Field holding the created project's URL (`html_url` on Gitee).
    pub success_field: &'a str,
    /// Key inside the `error` object that signals a name collision.
    pub collision_marker: &'a str,
}

impl Default for ResponseShape<'_> {
    fn default() -> Self {
        Self {
            success_field: "html_url",
            collision_marker: "base",
        }
    }
}

/// Classify a raw creation response.
///
/// `collision_location` is the project URL to record when the name is
/// already taken; providers do not echo it in their error payload, so it is
/// derived by the caller from the namespace and item name.
///
/// When the error object names several fields and one of them is the
/// collision marker, the collision wins: the project exists either way and
/// the operator decides what to do with it.
pub fn classify(raw: &Value, shape: ResponseShape<'_>, collision_location: &str) -> Classification {
    if let Some(error) = raw.get("error").filter(|e| !e.is_null()) {
        return classify_error(raw, error, shape, collision_location);
    }

    match raw.get(shape.success_field).and_then(Value::as_str) {
        Some(url) if !url.is_empty() => Classification {
            kind: OutcomeKind::Success,
            location_or_detail: url.to_string(),
            detail: None,
        },
        _ => failed(provider_message(raw).unwrap_or_else(|| UNEXPECTED_RESPONSE.to_string())),
    }
}

fn classify_error(
    raw: &Value,
    error: &Value,
    shape: ResponseShape<'_>,
    collision_location: &str,
) -> Classification {
    match error {
        Value::Object(fields) => {
            if let Some(collision) = fields.get(shape.collision_marker) {
                return Classification {
                    kind: OutcomeKind::Exists,
                    location_or_detail: collision_location.to_string(),
                    detail: Some(render_message(collision)),
                };
            }
            let messages: Vec<String> = fields
                .iter()
                .map(|(field, message)| format!("{}: {}", field, render_message(message)))
                .collect();
            if messages.is_empty() {
                failed(UNEXPECTED_RESPONSE.to_string())
            } else {
                failed(messages.join("; "))
            }
        }
        // OAuth-style errors: {"error": "invalid_token", "error_description": "..."}
        other => {
            let description = raw
                .get("error_description")
                .and_then(Value::as_str)
                .map(str::to_string);
            failed(description.unwrap_or_else(|| render_message(other)))
        }
    }
}

fn failed(detail: String) -> Classification {
    Classification {
        kind: OutcomeKind::Failed,
        location_or_detail: detail,
        detail: None,
    }
}

/// Plain-text rendering of an error value: strings verbatim, arrays joined.
fn render_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_message)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Top-level `message` field, as sent with 4xx responses.
fn provider_message(raw: &Value) -> Option<String> {
    raw.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

impl Classification {
    /// Attach the classification to the item it belongs to.
    pub fn into_outcome(self, item: WorkItem) -> Outcome {
        match self.kind {
            OutcomeKind::Success => Outcome::success(item, self.location_or_detail),
            OutcomeKind::Exists => Outcome::exists(
                item,
                self.location_or_detail,
                self.detail.unwrap_or_default(),
            ),
            OutcomeKind::Failed => Outcome::failed(item, None, self.location_or_detail),
        }
    }
}
