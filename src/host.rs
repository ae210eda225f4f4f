//! Host Platform Bridge
//!
//! The chat platform that embeds the booking pages supplies the user's
//! identity and accepts a few signals back: haptic feedback, data sent to
//! the bot, and external links.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Identity of the current user as given by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl HostUser {
    /// First and last name joined, empty when neither is known
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            "Guest".to_string()
        } else {
            name
        }
    }
}

/// Haptic feedback kinds the host understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    Light,
    Success,
    Error,
}

/// Signals the pages can send to the host
pub trait HostBridge: Send + Sync {
    fn user(&self) -> Option<HostUser>;
    fn haptic(&self, kind: Haptic);
    /// Hand a payload back to the bot; the host may close the page
    fn send_data(&self, payload: &serde_json::Value);
    fn open_link(&self, url: &str);
}

/// Host used by the terminal front end: identity from the command line,
/// signals written to the log
pub struct ConsoleHost {
    user: Option<HostUser>,
}

impl ConsoleHost {
    pub fn new(user: Option<HostUser>) -> Self {
        Self { user }
    }
}

impl HostBridge for ConsoleHost {
    fn user(&self) -> Option<HostUser> {
        self.user.clone()
    }

    fn haptic(&self, kind: Haptic) {
        tracing::debug!(?kind, "Haptic feedback");
    }

    fn send_data(&self, payload: &serde_json::Value) {
        tracing::info!(payload = %payload, "Data sent to host");
    }

    fn open_link(&self, url: &str) {
        tracing::info!(url = %url, "Open link requested");
        println!("Open: {}", url);
    }
}

/// A signal captured by [`RecordingHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostSignal {
    Haptic(Haptic),
    Data(serde_json::Value),
    Link(String),
}

/// Host that records every signal; used by tests
pub struct RecordingHost {
    user: Option<HostUser>,
    signals: Mutex<Vec<HostSignal>>,
}

impl RecordingHost {
    pub fn new(user: Option<HostUser>) -> Self {
        Self {
            user,
            signals: Mutex::new(Vec::new()),
        }
    }

    pub fn signals(&self) -> Vec<HostSignal> {
        self.signals
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn record(&self, signal: HostSignal) {
        if let Ok(mut signals) = self.signals.lock() {
            signals.push(signal);
        }
    }
}

impl HostBridge for RecordingHost {
    fn user(&self) -> Option<HostUser> {
        self.user.clone()
    }

    fn haptic(&self, kind: Haptic) {
        self.record(HostSignal::Haptic(kind));
    }

    fn send_data(&self, payload: &serde_json::Value) {
        self.record(HostSignal::Data(payload.clone()));
    }

    fn open_link(&self, url: &str) {
        self.record(HostSignal::Link(url.to_string()));
    }
}
