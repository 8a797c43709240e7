//! End-to-end tests for fetching repositories into the view
//!
//! A fake provider stands in for GitHub so the full pipeline (URL building,
//! envelope checks, summaries, alerts) runs without the network.

mod test_utils;

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use taskboard::aggregator::{Aggregator, RunSummary};
use taskboard::alerts::{AlertLevel, Reporter};
use taskboard::data::RepoConfig;
use taskboard::integrations::github::FetchSettings;
use taskboard::integrations::Envelope;
use taskboard::query_params::QueryParams;
use taskboard::Error;
use test_utils::FakeProvider;

fn aggregator(provider: FakeProvider, settings: FetchSettings) -> (Aggregator<FakeProvider>, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    let aggregator = Aggregator::new(provider.clone(), settings, Arc::new(Reporter::console()));
    (aggregator, provider)
}

#[tokio::test]
async fn test_single_repository_end_to_end() {
    let provider = FakeProvider::new()
        .respond("/repos/acme/widgets", Envelope::ok(json!({"name": "widgets"})))
        .respond("/repos/acme/widgets/issues", Envelope::ok(json!([{"body": "short"}])));
    let (aggregator, provider) = aggregator(provider, FetchSettings::default());

    let repos = vec![RepoConfig::new("acme", "widgets").with_label("hack")];
    let (view, summary) = aggregator.run(&repos).await.unwrap();

    assert_eq!(summary, RunSummary { succeeded: 1, failed: 0 });
    let projects = serde_json::to_value(view.projects()).unwrap();
    assert_eq!(
        projects,
        json!([{"name": "widgets", "tasks": [{"body": "short", "summary": "short"}]}])
    );
    assert!(view.alerts().is_empty());
    assert!(provider.requests_for("/repos/acme/widgets/issues")[0].contains("labels=hack"));
}

#[tokio::test]
async fn test_missing_repository_reports_one_error() {
    let provider = FakeProvider::new().respond(
        "/repos/acme/gone",
        Envelope::new(404, json!({"message": "Not Found"})),
    );
    let (aggregator, provider) = aggregator(provider, FetchSettings::default());

    let (view, summary) = aggregator
        .run(&[RepoConfig::new("acme", "gone")])
        .await
        .unwrap();

    assert_eq!(summary, RunSummary { succeeded: 0, failed: 1 });
    assert!(view.projects().is_empty());
    assert!(provider.requests_for("/repos/acme/gone/issues").is_empty());

    let alerts = view.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Error);
    assert!(alerts[0].is_dismissable);
    assert!(alerts[0].message.contains("Not Found (code 404)"));
}

#[tokio::test]
async fn test_failure_does_not_block_other_repositories() {
    let provider = FakeProvider::new()
        .fail("/repos/acme/flaky", Error::transport("timeout", "deadline elapsed"))
        .respond("/repos/acme/widgets", Envelope::ok(json!({"name": "widgets"})))
        .respond("/repos/acme/widgets/issues", Envelope::ok(json!([])));
    let (aggregator, _provider) = aggregator(provider, FetchSettings::default());

    let repos = vec![
        RepoConfig::new("acme", "flaky"),
        RepoConfig::new("", "nameless"),
        RepoConfig::new("acme", "widgets"),
    ];
    let (view, summary) = aggregator.run(&repos).await.unwrap();

    assert_eq!(summary, RunSummary { succeeded: 1, failed: 2 });
    assert_eq!(view.projects()[0].name(), "widgets");

    let messages: Vec<String> = view.alerts().into_iter().map(|a| a.message).collect();
    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&"Request failed: timeout, deadline elapsed".to_string()));
    assert!(messages
        .iter()
        .any(|m| m.contains("required parameter \"owner\" not defined")));
}

#[tokio::test]
async fn test_issue_fetch_failure_after_repo_success() {
    let provider = FakeProvider::new()
        .respond("/repos/acme/widgets", Envelope::ok(json!({"name": "widgets"})))
        .respond(
            "/repos/acme/widgets/issues",
            Envelope::new(403, json!({"message": "API rate limit exceeded"})),
        );
    let (aggregator, _provider) = aggregator(provider, FetchSettings::default());

    let (view, _) = aggregator
        .run(&[RepoConfig::new("acme", "widgets")])
        .await
        .unwrap();

    assert!(view.projects().is_empty());
    assert_eq!(
        view.alerts()[0].message,
        "An error occurred while trying to retrieve information on project \"acme/widgets\": API rate limit exceeded (code 403)"
    );
}

#[tokio::test]
async fn test_access_token_sent_on_every_request() {
    let provider = FakeProvider::new()
        .respond("/repos/acme/widgets", Envelope::ok(json!({"name": "widgets"})))
        .respond("/repos/acme/widgets/issues", Envelope::ok(json!([])));
    let settings = FetchSettings {
        params: QueryParams::parse("https://example.org/tasks.html?_T=s3cret"),
        ..FetchSettings::default()
    };
    let (aggregator, provider) = aggregator(provider, settings);

    aggregator
        .run(&[RepoConfig::new("acme", "widgets").with_label("*")])
        .await
        .unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|u| u.contains("access_token=s3cret")));
    assert!(!requests[1].contains("labels="));
}

#[tokio::test]
async fn test_slow_repository_may_land_last() {
    let provider = FakeProvider::new()
        .respond_after(
            "/repos/acme/slow",
            Envelope::ok(json!({"name": "slow"})),
            Duration::from_millis(200),
        )
        .respond("/repos/acme/slow/issues", Envelope::ok(json!([])))
        .respond("/repos/acme/fast", Envelope::ok(json!({"name": "fast"})))
        .respond("/repos/acme/fast/issues", Envelope::ok(json!([])));
    let (aggregator, _provider) = aggregator(provider, FetchSettings::default());

    let repos = vec![RepoConfig::new("acme", "slow"), RepoConfig::new("acme", "fast")];
    let (view, _) = aggregator.run(&repos).await.unwrap();

    let names: Vec<String> = view.projects().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["fast", "slow"]);
}

#[tokio::test]
async fn test_view_can_only_be_started_once() {
    let (aggregator, _provider) = aggregator(FakeProvider::new(), FetchSettings::default());
    aggregator.start().unwrap();
    assert!(aggregator.reporter().is_bound());
    assert!(matches!(aggregator.start(), Err(Error::Internal(_))));
}

#[tokio::test]
async fn test_long_bodies_are_summarized() {
    let long = "z".repeat(450);
    let provider = FakeProvider::new()
        .respond("/repos/acme/widgets", Envelope::ok(json!({"name": "widgets"})))
        .respond(
            "/repos/acme/widgets/issues",
            Envelope::ok(json!([{"number": 1, "body": long}, {"number": 2, "body": null}])),
        );
    let (aggregator, _provider) = aggregator(provider, FetchSettings::default());

    let (view, _) = aggregator
        .run(&[RepoConfig::new("acme", "widgets")])
        .await
        .unwrap();

    let tasks = &view.projects()[0].tasks;
    assert_eq!(tasks[0].summary.chars().count(), 203);
    assert!(tasks[0].summary.ends_with("..."));
    assert_eq!(tasks[0].body(), long);
    assert_eq!(tasks[1].summary, "");
}
