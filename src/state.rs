//! UI-agnostic widget state types
//!
//! This module contains data structures that any front end (the terminal UI,
//! the one-shot CLI, tests) shares. Nothing here depends on a UI framework.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Label shown on a submit control while its request is in flight.
pub const SENDING_LABEL: &str = "Yuborilmoqda...";

/// One of the two mutually exclusive submission modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Webchat,
    Phone,
}

impl Tab {
    pub fn all() -> [Tab; 2] {
        [Tab::Webchat, Tab::Phone]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Webchat => "webchat",
            Tab::Phone => "phone",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Webchat => "💬 Chat",
            Tab::Phone => "📞 Qo'ng'iroq",
        }
    }

    /// Label of the tab's submit control when it is enabled.
    pub fn submit_label(&self) -> &'static str {
        match self {
            Tab::Webchat => "Yuborish",
            Tab::Phone => "Qo'ng'iroq so'rash",
        }
    }

    /// How long a successful submission stays on screen before the widget closes.
    pub fn auto_close_delay(&self) -> Duration {
        match self {
            Tab::Webchat => Duration::from_secs(2),
            Tab::Phone => Duration::from_secs(3),
        }
    }

    pub fn other(&self) -> Tab {
        match self {
            Tab::Webchat => Tab::Phone,
            Tab::Phone => Tab::Webchat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
}

/// Status message describing the outcome of the last submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub text: String,
    pub kind: AlertKind,
}

impl Alert {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: AlertKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: AlertKind::Error,
        }
    }
}

/// Visibility, tab selection and alert of a single widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetState {
    pub is_open: bool,
    pub active_tab: Tab,
    pub alert: Option<Alert>,
}
