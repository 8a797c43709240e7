//! Test utilities and fixtures for taskboard tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use taskboard::integrations::github::GITHUB_API_URL;
use taskboard::integrations::{Envelope, Transport};
use taskboard::{Error, Result};

#[derive(Clone)]
struct Route {
    response: std::result::Result<Envelope, Error>,
    delay: Duration,
}

/// In-memory provider keyed by request path (the part after the API host
/// and before the query string). Unknown paths fail like a dropped
/// connection.
#[derive(Default)]
pub struct FakeProvider {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, response: Envelope) -> Self {
        self.respond_after(path, response, Duration::ZERO)
    }

    pub fn respond_after(self, path: &str, response: Envelope, delay: Duration) -> Self {
        self.routes.lock().insert(
            path.to_string(),
            Route {
                response: Ok(response),
                delay,
            },
        );
        self
    }

    pub fn fail(self, path: &str, error: Error) -> Self {
        self.routes.lock().insert(
            path.to_string(),
            Route {
                response: Err(error),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn requests_for(&self, path: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|u| path_of(u) == path)
            .collect()
    }
}

fn path_of(url: &str) -> &str {
    let rest = url.strip_prefix(GITHUB_API_URL).unwrap_or(url);
    rest.split_once('?').map_or(rest, |(p, _)| p)
}

impl Transport for FakeProvider {
    async fn get(&self, url: &str) -> Result<Envelope> {
        self.requests.lock().push(url.to_string());
        let route = self.routes.lock().get(path_of(url)).cloned();

        let Some(route) = route else {
            return Err(Error::transport("error", format!("no route for {}", url)));
        };
        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }
        route.response
    }
}
