use crate::aggregator::{Aggregator, RunSummary};
use crate::alerts::{AlertKind, AlertOptions, AlertRecord};
use crate::data::RepoConfig;
use crate::integrations::Transport;
use crate::tui::ui;
use crate::view::{ViewEvent, ViewState};
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;

/// Braille spinner frames for loading animation
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const PAGE_LINES: usize = 10;

pub struct App {
    pub view: Arc<ViewState>,
    pub scroll: usize,
    pub spinner_frame: usize,
    /// Set once the background fetch has finished.
    pub summary: Option<RunSummary>,
    busy_alert: Option<u64>,
    fetch: Option<JoinHandle<RunSummary>>,
    events: broadcast::Receiver<ViewEvent>,
    line_count: usize,
}

impl App {
    pub fn new(view: Arc<ViewState>) -> Self {
        let events = view.subscribe();
        let line_count = ui::project_lines(&view.projects()).len();
        Self {
            view,
            scroll: 0,
            spinner_frame: 0,
            summary: None,
            busy_alert: None,
            fetch: None,
            events,
            line_count,
        }
    }

    /// Fetch `repos` in the background, showing a busy alert meanwhile.
    pub fn start_fetch<T: Transport + 'static>(
        &mut self,
        aggregator: Aggregator<T>,
        repos: Vec<RepoConfig>,
    ) {
        if self.fetch.is_some() {
            return;
        }

        let message = format!("Fetching tasks from {} repositories...", repos.len());
        let busy = AlertRecord::new(message, AlertOptions::kind(AlertKind::Busy));
        self.busy_alert = Some(self.view.push_alert(busy));

        let view = Arc::clone(&self.view);
        self.fetch = Some(tokio::spawn(async move {
            aggregator.fetch_all(&view, &repos).await
        }));
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_some()
    }

    /// Process a message and update app state.
    ///
    /// Returns `true` if the app should quit.
    pub fn update(&mut self, msg: super::Message) -> bool {
        use super::Message;
        match msg {
            Message::Quit => return true,
            Message::ScrollUp => self.scroll_by(-1),
            Message::ScrollDown => self.scroll_by(1),
            Message::PageUp => self.scroll_by(-(PAGE_LINES as i64)),
            Message::PageDown => self.scroll_by(PAGE_LINES as i64),
            Message::GotoTop => self.scroll = 0,
            Message::GotoBottom => self.scroll = self.max_scroll(),
            Message::DismissAlert => {
                if let Some(alert) = self.view.dismiss_latest() {
                    tracing::debug!("Dismissed alert: {}", alert.message);
                }
            }
            Message::None => {}
        }
        false
    }

    /// Periodic housekeeping; returns true when a redraw is needed.
    pub fn on_tick(&mut self) -> bool {
        // Checked before draining so every event the task sent is seen.
        let finished = self.fetch.as_ref().is_some_and(|h| h.is_finished());
        if finished {
            self.finish_fetch();
        }

        let mut changed = self.drain_events() || finished;

        if self.is_loading() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
            changed = true;
        }

        changed
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    fn finish_fetch(&mut self) {
        let Some(handle) = self.fetch.take() else {
            return;
        };
        match handle.now_or_never() {
            Some(Ok(summary)) => self.summary = Some(summary),
            Some(Err(e)) => tracing::error!("Fetch task failed: {}", e),
            None => tracing::warn!("Fetch task reported finished but had no result"),
        }
        if let Some(id) = self.busy_alert.take() {
            self.view.remove_alert(id);
        }
    }

    fn drain_events(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(ViewEvent::ProjectAdded(_)) | Err(TryRecvError::Lagged(_)) => {
                    self.line_count = ui::project_lines(&self.view.projects()).len();
                    changed = true;
                }
                Ok(_) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        changed
    }

    fn max_scroll(&self) -> usize {
        self.line_count.saturating_sub(1)
    }

    fn scroll_by(&mut self, delta: i64) {
        let target = (self.scroll as i64 + delta).clamp(0, self.max_scroll() as i64);
        self.scroll = target as usize;
    }
}
