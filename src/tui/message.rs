//! Message enum for Elm Architecture (TEA) pattern.
//!
//! Every user action is a message; `App::update()` applies it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Quit the application
    Quit,
    /// Scroll the task list up by one line
    ScrollUp,
    /// Scroll the task list down by one line
    ScrollDown,
    /// Half a screen up
    PageUp,
    /// Half a screen down
    PageDown,
    GotoTop,
    GotoBottom,
    /// Remove the newest dismissable alert
    DismissAlert,
    /// Key had no binding
    None,
}
