//! Per-request debug log.
//!
//! Every stage receives `&mut ResearchLog` instead of writing to a shared
//! buffer, so concurrent requests never see each other's entries. Recording an
//! entry also emits a `tracing` event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage a log entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogStage {
    Start,
    Fetch,
    Foundation,
    Sponsored,
    ReverseLookup,
    Details,
    Events,
    Tools,
    Crawl,
    Contacts,
    Complete,
    Error,
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LogStage::Start => "START",
            LogStage::Fetch => "FETCH",
            LogStage::Foundation => "FOUNDATION",
            LogStage::Sponsored => "SPONSORED",
            LogStage::ReverseLookup => "REVERSE_LOOKUP",
            LogStage::Details => "DETAILS",
            LogStage::Events => "EVENTS",
            LogStage::Tools => "TOOLS",
            LogStage::Crawl => "CRAWL",
            LogStage::Contacts => "CONTACTS",
            LogStage::Complete => "COMPLETE",
            LogStage::Error => "ERROR",
        };
        f.write_str(tag)
    }
}

/// One diagnostic entry. Never read by pipeline logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugLogEntry {
    pub timestamp: DateTime<Utc>,
    pub stage: LogStage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Default, Clone)]
pub struct ResearchLog {
    entries: Vec<DebugLogEntry>,
}

impl ResearchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: LogStage, message: impl Into<String>) {
        self.push(stage, message.into(), None);
    }

    pub fn record_with(
        &mut self,
        stage: LogStage,
        message: impl Into<String>,
        data: serde_json::Value,
    ) {
        self.push(stage, message.into(), Some(data));
    }

    fn push(&mut self, stage: LogStage, message: String, data: Option<serde_json::Value>) {
        match (&data, stage) {
            (_, LogStage::Error) => {
                tracing::warn!(stage = %stage, data = ?data, "{}", message)
            }
            (Some(data), _) => tracing::debug!(stage = %stage, data = %data, "{}", message),
            (None, _) => tracing::debug!(stage = %stage, "{}", message),
        }

        self.entries.push(DebugLogEntry {
            timestamp: Utc::now(),
            stage,
            message,
            data,
        });
    }

    pub fn entries(&self) -> &[DebugLogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DebugLogEntry> {
        self.entries
    }
}
