//! User-facing alerts.
//!
//! Components never print or pop up alerts themselves. They receive an
//! [`AlertReporter`] and call it. Until the view exists, reports go to the
//! console; [`Reporter::bind`] swaps them over to the view exactly once.

use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Icon shown next to a `busy` alert unless the caller supplies one.
pub const BUSY_ICON_SRC: &str = "icon-busy.gif";
pub const BUSY_ICON_SIZE: u32 = 32;

/// Alert type as requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Warn,
    Info,
    Success,
    /// Shorthand for a non-dismissable `info` alert with a busy icon.
    Busy,
}

impl FromStr for AlertKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "busy" => Ok(Self::Busy),
            other => Err(Error::Internal(format!("unknown alert type: {}", other))),
        }
    }
}

/// Alert type as stored; `busy` has already been folded into `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warn,
    Info,
    Success,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Success => "success",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertIcon {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

impl AlertIcon {
    pub fn busy() -> Self {
        Self {
            src: BUSY_ICON_SRC.to_string(),
            width: BUSY_ICON_SIZE,
            height: BUSY_ICON_SIZE,
        }
    }
}

/// Optional settings for an alert. Unset fields take per-type defaults:
/// the type defaults to `error`, dismissable defaults to `true` (`false` for
/// `busy`), and only `busy` gets a default icon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertOptions {
    pub kind: Option<AlertKind>,
    pub dismissable: Option<bool>,
    pub icon: Option<AlertIcon>,
}

impl AlertOptions {
    pub fn kind(kind: AlertKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn dismissable(mut self, dismissable: bool) -> Self {
        self.dismissable = Some(dismissable);
        self
    }

    pub fn icon(mut self, icon: AlertIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// A notification as displayed. Never changed after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub message: String,
    #[serde(rename = "isDismissable")]
    pub is_dismissable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<AlertIcon>,
}

impl AlertRecord {
    pub fn new(message: impl Into<String>, options: AlertOptions) -> Self {
        let AlertOptions {
            kind,
            dismissable,
            icon,
        } = options;

        let (level, dismissable, icon) = match kind.unwrap_or(AlertKind::Error) {
            AlertKind::Error => (AlertLevel::Error, dismissable, icon),
            AlertKind::Warn => (AlertLevel::Warn, dismissable, icon),
            AlertKind::Info => (AlertLevel::Info, dismissable, icon),
            AlertKind::Success => (AlertLevel::Success, dismissable, icon),
            AlertKind::Busy => (
                AlertLevel::Info,
                Some(dismissable.unwrap_or(false)),
                Some(icon.unwrap_or_else(AlertIcon::busy)),
            ),
        };

        Self {
            level,
            message: message.into(),
            is_dismissable: dismissable.unwrap_or(true),
            icon,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.icon.as_ref().is_some_and(|i| i.src == BUSY_ICON_SRC)
    }
}

/// Something that can show an alert to the user.
pub trait AlertReporter: Send + Sync {
    fn alert(&self, message: &str, options: AlertOptions) -> Result<AlertRecord>;
}

/// Fallback reporter used before any view is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl AlertReporter for ConsoleReporter {
    fn alert(&self, message: &str, options: AlertOptions) -> Result<AlertRecord> {
        let record = AlertRecord::new(message, options);
        eprintln!("[{}] {}", record.level, record.message);
        Ok(record)
    }
}

/// The process's alert capability: a fallback plus a one-time binding.
pub struct Reporter {
    fallback: Arc<dyn AlertReporter>,
    bound: OnceCell<Arc<dyn AlertReporter>>,
}

impl Reporter {
    pub fn new(fallback: Arc<dyn AlertReporter>) -> Self {
        Self {
            fallback,
            bound: OnceCell::new(),
        }
    }

    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleReporter))
    }

    /// Route all further alerts to `target`. Can only happen once.
    pub fn bind(&self, target: Arc<dyn AlertReporter>) -> Result<()> {
        self.bound
            .set(target)
            .map_err(|_| Error::Internal("alert reporter is already bound".to_string()))
    }

    pub fn is_bound(&self) -> bool {
        self.bound.get().is_some()
    }

    fn current(&self) -> &dyn AlertReporter {
        self.bound.get().unwrap_or(&self.fallback).as_ref()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::console()
    }
}

impl AlertReporter for Reporter {
    fn alert(&self, message: &str, options: AlertOptions) -> Result<AlertRecord> {
        self.current().alert(message, options)
    }
}

/// Report a terminal error: alert the user, then log the diagnostic record.
///
/// The operation that produced `err` has already unwound by returning it.
pub fn fail(reporter: &dyn AlertReporter, err: &Error) {
    let message = err.to_string();
    if let Err(e) = reporter.alert(&message, AlertOptions::default()) {
        tracing::warn!("Failed to display alert: {}", e);
    }
    tracing::error!(
        kind = err.kind(),
        trace = %err.trace(),
        "{}",
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<AlertRecord>>);

    impl AlertReporter for Recording {
        fn alert(&self, message: &str, options: AlertOptions) -> Result<AlertRecord> {
            let record = AlertRecord::new(message, options);
            self.0.lock().push(record.clone());
            Ok(record)
        }
    }

    #[test]
    fn test_default_is_dismissable_error() {
        let a = AlertRecord::new("boom", AlertOptions::default());
        assert_eq!(a.level, AlertLevel::Error);
        assert!(a.is_dismissable);
        assert_eq!(a.icon, None);
    }

    #[test]
    fn test_busy_maps_to_info() {
        let a = AlertRecord::new("loading", AlertOptions::kind(AlertKind::Busy));
        assert_eq!(a.level, AlertLevel::Info);
        assert!(!a.is_dismissable);
        assert_eq!(a.icon, Some(AlertIcon::busy()));
        assert!(a.is_busy());
    }

    #[test]
    fn test_busy_respects_explicit_options() {
        let icon = AlertIcon {
            src: "spin.png".into(),
            width: 16,
            height: 16,
        };
        let a = AlertRecord::new(
            "loading",
            AlertOptions::kind(AlertKind::Busy)
                .dismissable(true)
                .icon(icon.clone()),
        );
        assert!(a.is_dismissable);
        assert_eq!(a.icon, Some(icon));
    }

    #[test]
    fn test_explicit_not_dismissable() {
        let a = AlertRecord::new("careful", AlertOptions::kind(AlertKind::Warn).dismissable(false));
        assert_eq!(a.level, AlertLevel::Warn);
        assert!(!a.is_dismissable);
    }

    #[test]
    fn test_unknown_type_is_internal_error() {
        let err = "panic".parse::<AlertKind>().unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        assert_eq!(err.to_string(), "Internal error: unknown alert type: panic");
        assert_eq!("success".parse::<AlertKind>().unwrap(), AlertKind::Success);
    }

    #[test]
    fn test_serialized_field_names() {
        let a = AlertRecord::new("done", AlertOptions::kind(AlertKind::Success));
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["type"], "success");
        assert_eq!(v["isDismissable"], true);
        assert!(v.get("icon").is_none());
    }

    #[test]
    fn test_reporter_binds_once() {
        let reporter = Reporter::console();
        let view = Arc::new(Recording::default());
        reporter.bind(view.clone()).unwrap();
        assert!(reporter.is_bound());
        assert!(reporter.bind(Arc::new(Recording::default())).is_err());

        reporter.alert("hello", AlertOptions::kind(AlertKind::Info)).unwrap();
        assert_eq!(view.0.lock().len(), 1);
    }

    #[test]
    fn test_fail_reports_error_alert() {
        let rec = Recording::default();
        fail(&rec, &Error::transport("error", "connection refused"));
        let alerts = rec.0.lock();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Error);
        assert_eq!(alerts[0].message, "Request failed: error, connection refused");
    }
}
