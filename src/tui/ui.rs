//! Rendering for the task board.

use crate::alerts::AlertLevel;
use crate::data::RepositoryRecord;
use crate::tui::App;
use crate::view::AlertEntry;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Icon and style for an alert level.
pub struct LevelConfig {
    pub icon: &'static str,
    pub style: Style,
}

pub fn level_config(level: AlertLevel) -> LevelConfig {
    match level {
        AlertLevel::Error => LevelConfig {
            icon: "✗",
            style: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        },
        AlertLevel::Warn => LevelConfig {
            icon: "!",
            style: Style::default().fg(Color::Yellow),
        },
        AlertLevel::Info => LevelConfig {
            icon: "i",
            style: Style::default().fg(Color::Cyan),
        },
        AlertLevel::Success => LevelConfig {
            icon: "✓",
            style: Style::default().fg(Color::Green),
        },
    }
}

/// Main draw function - renders the entire TUI.
pub fn draw(f: &mut Frame, app: &App) {
    let alerts = app.view.alert_entries();
    let alerts_height = if alerts.is_empty() {
        0
    } else {
        alerts.len().min(6) as u16 + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Length(alerts_height), // Alerts
            Constraint::Min(0),                // Tasks
            Constraint::Length(1),             // Status bar
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    if !alerts.is_empty() {
        draw_alerts(f, app, &alerts, chunks[1]);
    }
    draw_projects(f, app, chunks[2]);
    draw_status_bar(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let projects = app.view.projects();
    let task_count: usize = projects.iter().map(|p| p.tasks.len()).sum();

    let border_style = if app.is_loading() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let text = Line::from(vec![
        Span::styled("Taskboard", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "  {} repositories, {} open tasks",
            projects.len(),
            task_count
        )),
    ]);

    let header = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(header, area);
}

fn draw_alerts(f: &mut Frame, app: &App, alerts: &[AlertEntry], area: Rect) {
    let visible = alerts.len().saturating_sub(6);
    let lines: Vec<Line> = alerts[visible..]
        .iter()
        .map(|entry| {
            let config = level_config(entry.record.level);
            let icon = if entry.record.is_busy() {
                app.spinner_char().to_string()
            } else {
                config.icon.to_string()
            };
            Line::from(vec![
                Span::styled(format!(" {} ", icon), config.style),
                Span::styled(entry.record.message.clone(), config.style),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Alerts ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_projects(f: &mut Frame, app: &App, area: Rect) {
    let projects = app.view.projects();
    let block = Block::default().borders(Borders::ALL).title(" Tasks ");

    if projects.is_empty() {
        let text = if app.is_loading() {
            "Loading..."
        } else {
            "No repositories loaded."
        };
        let placeholder =
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))).block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let paragraph = Paragraph::new(project_lines(&projects))
        .block(block)
        .scroll((app.scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let state = match (app.is_loading(), app.summary) {
        (true, _) => format!(" {} loading ", app.spinner_char()),
        (false, Some(s)) if s.failed > 0 => format!(" {} loaded, {} failed ", s.succeeded, s.failed),
        (false, Some(s)) => format!(" {} loaded ", s.succeeded),
        (false, None) => String::new(),
    };

    let line = Line::from(vec![
        Span::styled(state, Style::default().fg(Color::Cyan)),
        Span::styled(
            " j/k: scroll | g/G: top/bottom | d: dismiss alert | q: quit ",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// One line per repository heading, plus a title and summary line per task.
pub fn project_lines(projects: &[RepositoryRecord]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, project) in projects.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }

        let mut heading = vec![
            Span::styled(
                project.full_name().to_string(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({} tasks)", project.tasks.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if let Some(description) = project.description() {
            heading.push(Span::raw(format!("  {}", description)));
        }
        lines.push(Line::from(heading));

        for task in &project.tasks {
            let number = task.number().map(|n| format!("#{} ", n)).unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", number), Style::default().fg(Color::Cyan)),
                Span::raw(task.title().to_string()),
            ]));

            // Summaries can span lines; the list shows them flattened.
            let summary = task.summary.split_whitespace().collect::<Vec<_>>().join(" ");
            if !summary.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("      {}", summary),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    lines
}
