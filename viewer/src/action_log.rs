//! Chronological log of view actions, newest first.
//!
//! Entries are append-only: the log can grow or be cleared as a whole, never
//! edited. Ids are `<timestamp>-<random hex>` so two entries recorded in the
//! same millisecond stay distinct.

#[cfg(test)]
#[path = "action_log_test.rs"]
mod action_log_test;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// What the user did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ZoomIn,
    ZoomOut,
    PanStart,
    PanEnd,
    ResetCenter,
}

impl ActionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::PanStart => "pan_start",
            Self::PanEnd => "pan_end",
            Self::ResetCenter => "reset_center",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: VecDeque<LogEntry>,
}

impl ActionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action stamped with the current time.
    pub fn push(&mut self, kind: ActionKind, details: Option<String>) -> &LogEntry {
        self.push_at(now_ms(), kind, details)
    }

    /// Record an action with a caller-supplied timestamp.
    pub fn push_at(&mut self, timestamp: u64, kind: ActionKind, details: Option<String>) -> &LogEntry {
        let id = format!("{timestamp}-{:x}", rand::random::<u64>());
        self.entries.push_front(LogEntry { id, timestamp, kind, details });
        &self.entries[0]
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn now_ms() -> u64 {
    let Ok(duration) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
