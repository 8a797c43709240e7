//! Observable view state: fetched repositories and alerts.
//!
//! The core only appends. Renderers read snapshots, subscribe to
//! [`ViewEvent`]s to know when to redraw, and may remove alerts.

use crate::alerts::{AlertOptions, AlertRecord, AlertReporter};
use crate::data::RepositoryRecord;
use crate::error::Result;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// A change to the view, published after it has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// A repository record was appended at this index.
    ProjectAdded(usize),
    AlertAdded(u64),
    AlertRemoved(u64),
}

/// An alert together with the id used to remove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEntry {
    pub id: u64,
    pub record: AlertRecord,
}

/// Point-in-time copy of the view, e.g. for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub projects: Vec<RepositoryRecord>,
    pub alerts: Vec<AlertRecord>,
}

pub struct ViewState {
    projects: RwLock<Vec<RepositoryRecord>>,
    alerts: RwLock<Vec<AlertEntry>>,
    next_alert_id: AtomicU64,
    events: broadcast::Sender<ViewEvent>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            projects: RwLock::new(Vec::new()),
            alerts: RwLock::new(Vec::new()),
            next_alert_id: AtomicU64::new(1),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn push_project(&self, record: RepositoryRecord) {
        let index = {
            let mut projects = self.projects.write();
            projects.push(record);
            projects.len() - 1
        };
        self.publish(ViewEvent::ProjectAdded(index));
    }

    pub fn projects(&self) -> Vec<RepositoryRecord> {
        self.projects.read().clone()
    }

    pub fn project_count(&self) -> usize {
        self.projects.read().len()
    }

    /// Append an alert, returning its id.
    pub fn push_alert(&self, record: AlertRecord) -> u64 {
        let id = self.next_alert_id.fetch_add(1, Ordering::Relaxed);
        self.alerts.write().push(AlertEntry { id, record });
        self.publish(ViewEvent::AlertAdded(id));
        id
    }

    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.alerts.read().iter().map(|e| e.record.clone()).collect()
    }

    pub fn alert_entries(&self) -> Vec<AlertEntry> {
        self.alerts.read().clone()
    }

    /// Remove an alert by id. Returns false if it was already gone.
    pub fn remove_alert(&self, id: u64) -> bool {
        let removed = {
            let mut alerts = self.alerts.write();
            let before = alerts.len();
            alerts.retain(|e| e.id != id);
            alerts.len() != before
        };
        if removed {
            self.publish(ViewEvent::AlertRemoved(id));
        }
        removed
    }

    /// Remove the newest alert the user is allowed to dismiss.
    pub fn dismiss_latest(&self) -> Option<AlertRecord> {
        let entry = self
            .alerts
            .read()
            .iter()
            .rev()
            .find(|e| e.record.is_dismissable)
            .cloned()?;
        self.remove_alert(entry.id).then_some(entry.record)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            projects: self.projects(),
            alerts: self.alerts(),
        }
    }

    fn publish(&self, event: ViewEvent) {
        // No subscribers is fine; nothing is rendering yet.
        let _ = self.events.send(event);
    }
}

impl AlertReporter for ViewState {
    fn alert(&self, message: &str, options: AlertOptions) -> Result<AlertRecord> {
        let record = AlertRecord::new(message, options);
        self.push_alert(record.clone());
        Ok(record)
    }
}
