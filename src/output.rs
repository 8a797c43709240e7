//! Non-interactive renderers: plain text and JSON.

use crate::view::ViewSnapshot;
use std::io::{self, Write};

pub fn write_plain<W: Write>(w: &mut W, snapshot: &ViewSnapshot) -> io::Result<()> {
    for alert in &snapshot.alerts {
        writeln!(w, "[{}] {}", alert.level, alert.message)?;
    }
    if !snapshot.alerts.is_empty() && !snapshot.projects.is_empty() {
        writeln!(w)?;
    }

    for (i, project) in snapshot.projects.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "{} ({} tasks)", project.full_name(), project.tasks.len())?;
        if let Some(url) = project.html_url() {
            writeln!(w, "  {}", url)?;
        }

        for task in &project.tasks {
            match task.number() {
                Some(n) => writeln!(w, "  #{} {}", n, task.title())?,
                None => writeln!(w, "  {}", task.title())?,
            }
            for line in task.summary.lines().filter(|l| !l.trim().is_empty()) {
                writeln!(w, "      {}", line.trim_end())?;
            }
        }
    }
    Ok(())
}

pub fn write_json<W: Write>(w: &mut W, snapshot: &ViewSnapshot) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, snapshot)?;
    writeln!(w)
}
