//! Core data types for the chat-transcript crate.
//!
//! - `Message`: one reconstructed chat message
//! - `ExportFormat`: the flat file formats a transcript can be written to
//! - `ExportError`: errors that can occur while exporting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder used when a field cannot be recovered from the raw text.
pub const UNKNOWN: &str = "Unknown";

/// Sender assigned to collected messages that never had a sender label.
/// In a one-to-one chat these are the local user's own messages.
pub const SELF_SENDER: &str = "You";

/// A single message recovered from a raw text dump.
///
/// Field order matches the wire format used by the JSON export
/// (`text`, `timestamp`, `sender`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Message body, newline-joined and trimmed. Never empty.
    pub text: String,

    /// Recognised time literal ("10:42 AM", "Yesterday 3:15 PM") or "Unknown"
    pub timestamp: String,

    /// Sender name, or one of the "You" / "Unknown" placeholders
    pub sender: String,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        timestamp: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            timestamp: timestamp.into(),
            sender: sender.into(),
        }
    }

    /// Whether the timestamp was recovered from the dump.
    pub fn has_timestamp(&self) -> bool {
        self.timestamp != UNKNOWN
    }
}

/// Output format for transcript export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors that can occur while exporting a transcript.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no messages to export")]
    Empty,

    #[error("unknown export format: {0} (expected json or csv)")]
    UnknownFormat(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
