mod app;
mod input;
mod message;
pub mod ui;

use crate::aggregator::Aggregator;
use crate::data::RepoConfig;
use crate::integrations::Transport;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

pub use app::{App, SPINNER_FRAMES};
pub use message::Message;

pub async fn run<T: Transport + 'static>(
    aggregator: Aggregator<T>,
    repos: Vec<RepoConfig>,
) -> Result<()> {
    // Check if stdout is a terminal
    if !std::io::IsTerminal::is_terminal(&io::stdout()) {
        anyhow::bail!("taskboard requires an interactive terminal; use --plain or --json");
    }

    // The view exists before the screen does, so alerts from here on land in it.
    let view = aggregator.start()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(view);
    app.start_fetch(aggregator, repos);

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = std::time::Instant::now();
    let mut dirty = true;

    loop {
        if dirty {
            terminal.draw(|f| ui::draw(f, app))?;
            dirty = false;
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.update(input::dispatch(key)) {
                        return Ok(()); // Quit requested
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            dirty |= app.on_tick();
            last_tick = std::time::Instant::now();
        }

        // Let the fetch task make progress between polls.
        tokio::task::yield_now().await;
    }
}
