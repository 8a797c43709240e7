//! Error types for the task aggregator.
//!
//! Every variant is terminal for the operation that raised it (usually one
//! repository's fetch). Reporting happens once, where the error is caught;
//! see [`crate::alerts::fail`].

use serde_json::{json, Value};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A repository definition is missing a required field.
    #[error("{message}")]
    Configuration { message: String, trace: Value },

    /// The request never produced a usable response.
    #[error("Request failed: {status_text}, {detail}")]
    Transport { status_text: String, detail: String },

    /// The provider answered with a non-success envelope.
    #[error(
        "An error occurred while trying to retrieve information on project \"{owner}/{project}\": {message} (code {status})"
    )]
    Provider {
        owner: String,
        project: String,
        message: String,
        status: u16,
        response: Value,
    },

    /// A caller bug, e.g. an unknown alert type.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn configuration(message: impl Into<String>, trace: Value) -> Self {
        Self::Configuration {
            message: message.into(),
            trace,
        }
    }

    pub fn transport(status_text: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            status_text: status_text.into(),
            detail: detail.into(),
        }
    }

    /// Short tag used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Transport { .. } => "transport",
            Self::Provider { .. } => "provider",
            Self::Internal(_) => "internal",
        }
    }

    /// Structured diagnostic context logged alongside the message.
    pub fn trace(&self) -> Value {
        match self {
            Self::Configuration { trace, .. } => trace.clone(),
            Self::Transport {
                status_text,
                detail,
            } => json!({ "textStatus": status_text, "error": detail }),
            Self::Provider { response, .. } => json!({ "response": response }),
            Self::Internal(_) => Value::Null,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let status_text = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connection error"
        } else if e.is_decode() {
            "parsererror"
        } else {
            "error"
        };
        // The request URL can carry the access token.
        let detail = crate::integrations::redact_token(&e.without_url().to_string());
        Self::transport(status_text, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_names_project_and_code() {
        let err = Error::Provider {
            owner: "acme".into(),
            project: "widgets".into(),
            message: "Not Found".into(),
            status: 404,
            response: Value::Null,
        };
        assert_eq!(
            err.to_string(),
            "An error occurred while trying to retrieve information on project \"acme/widgets\": Not Found (code 404)"
        );
        assert_eq!(err.kind(), "provider");
    }

    #[test]
    fn test_transport_trace_carries_status_and_detail() {
        let err = Error::transport("timeout", "deadline elapsed");
        assert_eq!(err.to_string(), "Request failed: timeout, deadline elapsed");
        assert_eq!(err.trace()["textStatus"], "timeout");
        assert_eq!(err.trace()["error"], "deadline elapsed");
    }
}
