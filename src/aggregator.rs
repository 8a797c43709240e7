//! Entry point that fetches every configured repository into the view.

use crate::alerts::{self, Reporter};
use crate::data::{RepoConfig, RepositoryRecord};
use crate::error::Result;
use crate::integrations::github::{FetchSettings, ProjectFetcher};
use crate::integrations::Transport;
use crate::view::ViewState;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Outcome counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Aggregator<T> {
    transport: Arc<T>,
    settings: Arc<FetchSettings>,
    reporter: Arc<Reporter>,
}

impl<T> Clone for Aggregator<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            settings: Arc::clone(&self.settings),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<T: Transport + 'static> Aggregator<T> {
    pub fn new(transport: Arc<T>, settings: FetchSettings, reporter: Arc<Reporter>) -> Self {
        Self {
            transport,
            settings: Arc::new(settings),
            reporter,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Create the view and route all alerts to it from now on.
    pub fn start(&self) -> Result<Arc<ViewState>> {
        let view = Arc::new(ViewState::new());
        self.reporter.bind(view.clone())?;
        Ok(view)
    }

    /// Start a view and fill it from `repos`.
    pub async fn run(&self, repos: &[RepoConfig]) -> Result<(Arc<ViewState>, RunSummary)> {
        let view = self.start()?;
        let summary = self.fetch_all(&view, repos).await;
        Ok((view, summary))
    }

    /// Fetch all repositories concurrently, appending each as it completes.
    ///
    /// A failing repository is reported and skipped; it never holds up the
    /// others. Records land in completion order.
    pub async fn fetch_all(&self, view: &ViewState, repos: &[RepoConfig]) -> RunSummary {
        let mut summary = RunSummary::default();

        let mut results = stream::iter(repos.to_vec())
            .map(|repo| {
                let this = self.clone();
                async move { this.fetch_one(&repo).await }
            })
            .buffer_unordered(repos.len().max(1));

        while let Some(result) = results.next().await {
            match result {
                Ok(record) => {
                    view.push_project(record);
                    summary.succeeded += 1;
                }
                Err(e) => {
                    alerts::fail(self.reporter.as_ref(), &e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Fetched {} of {} repositories ({} failed)",
            summary.succeeded,
            repos.len(),
            summary.failed
        );
        summary
    }

    async fn fetch_one(&self, repo: &RepoConfig) -> Result<RepositoryRecord> {
        let mut fetcher = ProjectFetcher::new(repo, &self.settings, Arc::clone(&self.transport))?;
        fetcher.query().await
    }
}
