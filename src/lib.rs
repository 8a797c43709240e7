//! Taskboard - aggregates labeled GitHub issues from several repositories
//!
//! This library crate exposes internal modules for integration testing.

pub mod aggregator;
pub mod alerts;
pub mod config;
pub mod data;
pub mod error;
pub mod integrations;
pub mod output;
pub mod query_params;
pub mod tui;
pub mod view;

pub use error::{Error, Result};
