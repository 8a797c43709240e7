use anyhow::Result;
use std::sync::Arc;
use taskboard::integrations::github::{FetchSettings, ProjectFetcher};
use taskboard::integrations::{redact_token, Envelope, HttpTransport, Transport};
use taskboard::query_params::{QueryParams, ACCESS_TOKEN_PARAM};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = taskboard::config::default_config_path()?;
    println!("Loading config from: {}", config_path.display());
    let config = taskboard::config::load(Some(&config_path))?;

    let mut params = QueryParams::parse(config.page_url.as_deref().unwrap_or(""));
    if let Ok(token) = std::env::var("TASKBOARD_TOKEN") {
        params.insert(ACCESS_TOKEN_PARAM, token);
    }
    println!(
        "Access token: {}",
        if params.access_token().is_some() { "set" } else { "not set" }
    );

    let settings = FetchSettings {
        api_url: config.api_url.clone(),
        labels: config.labels.clone(),
        params,
    };
    let transport = Arc::new(HttpTransport::new(&config.http)?);

    for repo in &config.repos {
        println!("\n=== {}/{} ===", repo.owner, repo.project);
        let fetcher = match ProjectFetcher::new(repo, &settings, Arc::clone(&transport)) {
            Ok(f) => f,
            Err(e) => {
                println!("Invalid definition: {}", e);
                continue;
            }
        };

        let repo_url = fetcher.build_url(None, &[]);
        probe(transport.as_ref(), &repo_url).await;

        let params: Vec<(&str, &str)> = fetcher.label().map(|l| ("labels", l)).into_iter().collect();
        let issues_url = fetcher.build_url(Some("/issues"), &params);
        probe(transport.as_ref(), &issues_url).await;
    }

    Ok(())
}

async fn probe(transport: &HttpTransport, url: &str) {
    println!("\n--- GET {} ---", redact_token(url));
    match transport.get(url).await {
        Ok(envelope) => print_envelope(&envelope),
        Err(e) => println!("Request failed: {}", e),
    }
}

fn print_envelope(envelope: &Envelope) {
    println!("Status: {}", envelope.meta.status);
    for (key, value) in &envelope.meta.extra {
        if key.to_ascii_lowercase().starts_with("x-ratelimit") {
            println!("{}: {}", key, value);
        }
    }

    if !envelope.is_success() {
        println!("Error: {}", envelope.message().unwrap_or("(no message)"));
    } else if let Some(items) = envelope.data.as_array() {
        println!("Found {} issues:", items.len());
        for issue in items.iter().take(5) {
            println!("  - #{} {}", issue["number"], issue["title"]);
        }
    } else {
        println!("Repository: {}", envelope.data["full_name"]);
    }
}
