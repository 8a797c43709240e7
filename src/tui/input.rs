//! Maps key events to messages.

use super::Message;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn dispatch(key: KeyEvent) -> Message {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Message::Quit,
            KeyCode::Char('d') => Message::PageDown,
            KeyCode::Char('u') => Message::PageUp,
            _ => Message::None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Message::Quit,
        KeyCode::Char('j') | KeyCode::Down => Message::ScrollDown,
        KeyCode::Char('k') | KeyCode::Up => Message::ScrollUp,
        KeyCode::PageDown => Message::PageDown,
        KeyCode::PageUp => Message::PageUp,
        KeyCode::Char('g') | KeyCode::Home => Message::GotoTop,
        KeyCode::Char('G') | KeyCode::End => Message::GotoBottom,
        KeyCode::Char('d') | KeyCode::Char('x') => Message::DismissAlert,
        _ => Message::None,
    }
}
