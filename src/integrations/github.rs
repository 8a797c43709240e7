use crate::config::LabelConfig;
use crate::data::{RepoConfig, RepositoryRecord, TaskRecord};
use crate::error::{Error, Result};
use crate::integrations::{Envelope, Transport, JSONP_CALLBACK};
use crate::query_params::QueryParams;
use serde_json::{json, Value};
use std::sync::Arc;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Settings shared by every repository's fetch.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub api_url: String,
    pub labels: LabelConfig,
    pub params: QueryParams,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            labels: LabelConfig::default(),
            params: QueryParams::default(),
        }
    }
}

/// Where a fetcher is in its two-step pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Created,
    FetchingRepo,
    FetchingTasks,
    Done,
    Failed,
}

/// Fetches one repository and its labeled open issues.
///
/// The issues request is only made once the repository request has come
/// back successfully, so a missing or private repository costs one call.
pub struct ProjectFetcher<T> {
    transport: Arc<T>,
    owner: String,
    project: String,
    label: Option<String>,
    access_token: Option<String>,
    base_url: String,
    state: FetchState,
}

impl<T: Transport> ProjectFetcher<T> {
    pub fn new(repo: &RepoConfig, settings: &FetchSettings, transport: Arc<T>) -> Result<Self> {
        if repo.owner.is_empty() {
            return Err(Error::configuration(
                "Error in repository definition: required parameter \"owner\" not defined",
                json!({ "projectDef": repo }),
            ));
        }
        if repo.project.is_empty() {
            return Err(Error::configuration(
                "Error in repository definition: required parameter \"project\" not defined",
                json!({ "projectDef": repo }),
            ));
        }

        let base_url = format!(
            "{}/repos/{}/{}",
            settings.api_url.trim_end_matches('/'),
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.project)
        );

        Ok(Self {
            transport,
            owner: repo.owner.clone(),
            project: repo.project.clone(),
            label: settings.labels.resolve(repo.label.as_deref()),
            access_token: settings.params.access_token().map(str::to_string),
            base_url,
            state: FetchState::Created,
        })
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Label the issues are filtered by; `None` means all open issues.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Build a request URL below the repository endpoint.
    ///
    /// `path` must start with `/`. The access token, when one was supplied,
    /// is appended to every URL.
    pub fn build_url(&self, path: Option<&str>, params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{}?callback={}",
            self.base_url,
            path.unwrap_or(""),
            JSONP_CALLBACK
        );

        let token = self.access_token.as_deref().map(|t| ("access_token", t));
        for (key, value) in params.iter().copied().chain(token) {
            url.push('&');
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Fail unless the envelope reports success.
    pub fn check_response(&self, response: &Envelope) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }
        Err(Error::Provider {
            owner: self.owner.clone(),
            project: self.project.clone(),
            message: response.message().unwrap_or("unknown error").to_string(),
            status: response.meta.status,
            response: serde_json::to_value(response).unwrap_or(Value::Null),
        })
    }

    /// Fetch the repository, then its tasks.
    pub async fn query(&mut self) -> Result<RepositoryRecord> {
        self.state = FetchState::FetchingRepo;
        let repo = self.fetch_repo().await;
        let repo = self.settle(repo)?;
        self.query_tasks(repo).await
    }

    /// Fetch the open tasks for `repo` and attach them to it.
    pub async fn query_tasks(&mut self, mut repo: RepositoryRecord) -> Result<RepositoryRecord> {
        self.state = FetchState::FetchingTasks;
        let tasks = self.fetch_tasks().await;
        repo.tasks = self.settle(tasks)?;
        self.state = FetchState::Done;

        tracing::info!(
            "Fetched {} tasks for {}/{}",
            repo.tasks.len(),
            self.owner,
            self.project
        );
        Ok(repo)
    }

    async fn fetch_repo(&self) -> Result<RepositoryRecord> {
        let response = self.transport.get(&self.build_url(None, &[])).await?;
        self.check_response(&response)?;

        match response.data {
            Value::Object(fields) => Ok(RepositoryRecord::from_metadata(fields)),
            other => Err(self.unexpected_payload("repository", &other)),
        }
    }

    async fn fetch_tasks(&self) -> Result<Vec<TaskRecord>> {
        let params: Vec<(&str, &str)> = self.label().map(|l| ("labels", l)).into_iter().collect();
        let response = self
            .transport
            .get(&self.build_url(Some("/issues"), &params))
            .await?;
        self.check_response(&response)?;

        let items = match response.data {
            Value::Array(items) => items,
            other => return Err(self.unexpected_payload("issue list", &other)),
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(TaskRecord::from_issue(fields)),
                other => Err(self.unexpected_payload("issue", &other)),
            })
            .collect()
    }

    fn settle<R>(&mut self, result: Result<R>) -> Result<R> {
        if result.is_err() {
            self.state = FetchState::Failed;
        }
        result
    }

    fn unexpected_payload(&self, expected: &str, got: &Value) -> Error {
        let kind = match got {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        Error::transport(
            "parsererror",
            format!(
                "expected {} for {}/{}, got {}",
                expected, self.owner, self.project, kind
            ),
        )
    }
}
