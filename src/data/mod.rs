//! Records produced by the fetchers and shown by the view.
//!
//! Both record types keep every field the provider returned and add their
//! own derived field on top, so renderers can use any part of the payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of body characters kept in a task summary.
pub const SUMMARY_MAX_CHARS: usize = 200;
/// Appended to a summary when the body was cut.
pub const SUMMARY_MARKER: &str = "...";

/// Shorten a task body for compact display.
///
/// Bodies of up to [`SUMMARY_MAX_CHARS`] characters are returned whole;
/// longer ones are cut and get [`SUMMARY_MARKER`] appended.
pub fn summarize(body: &str) -> String {
    match body.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &body[..cut], SUMMARY_MARKER),
        None => body.to_string(),
    }
}

/// A repository definition from the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RepoConfig {
    pub fn new(owner: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// An open issue plus its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub summary: String,
}

impl TaskRecord {
    pub fn from_issue(mut fields: Map<String, Value>) -> Self {
        fields.remove("summary");
        let summary = summarize(fields.get("body").and_then(Value::as_str).unwrap_or(""));
        Self { fields, summary }
    }

    /// Issue body; GitHub sends `null` for issues without a description.
    pub fn body(&self) -> &str {
        self.str_field("body").unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.str_field("title").unwrap_or("")
    }

    pub fn number(&self) -> Option<u64> {
        self.fields.get("number").and_then(Value::as_u64)
    }

    pub fn html_url(&self) -> Option<&str> {
        self.str_field("html_url")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Repository metadata plus its open tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

impl RepositoryRecord {
    pub fn from_metadata(mut fields: Map<String, Value>) -> Self {
        fields.remove("tasks");
        Self {
            fields,
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.fields.get("name").and_then(Value::as_str).unwrap_or("")
    }

    /// `owner/name` when the provider sent it, else just the name.
    pub fn full_name(&self) -> &str {
        self.fields
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.name())
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.get("description").and_then(Value::as_str)
    }

    pub fn html_url(&self) -> Option<&str> {
        self.fields.get("html_url").and_then(Value::as_str)
    }
}
