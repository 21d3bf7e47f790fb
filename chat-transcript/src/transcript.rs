//! Transcript reconstruction from raw accessibility text.
//!
//! Chat windows expose their visible content as a flat list of text lines with
//! no structural markup. Timestamps, sender labels and message bodies all come
//! through as plain lines, so the reconstructor recovers message boundaries
//! from three signals only:
//!
//! - a recognised time literal (`10:42 AM`, `Yesterday 3:15 PM`, `3/14/24 9:05 PM`)
//!   starts a new message
//! - a line ending in `:` before any body text is a sender label
//! - a blank line closes the message being collected
//!
//! Sender and timestamp carry over from one message to the next until a new
//! label or time literal replaces them.

use crate::types::{Message, SELF_SENDER, UNKNOWN};
use lazy_static::lazy_static;
use log::debug;
use regex_lite::Regex;
use std::num::NonZeroUsize;

lazy_static! {
    // "Today 9:41 AM", "Yesterday 3:15 PM", "3/14/2024 10:02 PM"
    static ref DATE_TIME: Regex = Regex::new(
        r"\b(?:Today|Yesterday|\d{1,2}/\d{1,2}/\d{2,4}) \d{1,2}:\d{2} (?:AM|PM)\b"
    ).unwrap();

    // "10:42 AM"
    static ref TIME: Regex = Regex::new(r"\b\d{1,2}:\d{2} (?:AM|PM)\b").unwrap();
}

/// A time literal located inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampMatch<'a> {
    /// The matched literal, e.g. "Yesterday 3:15 PM"
    pub timestamp: &'a str,
    /// The line with the literal cut out, trimmed
    pub remainder: String,
}

/// Find the timestamp in a line.
///
/// The date-time form is tried before the bare time so that
/// "Yesterday 3:15 PM" is never split into "Yesterday" + "3:15 PM".
/// Only the first match of the winning pattern is removed; any further
/// time-like text stays in the remainder.
pub fn find_timestamp(line: &str) -> Option<TimestampMatch<'_>> {
    let found = DATE_TIME.find(line).or_else(|| TIME.find(line))?;

    let mut remainder = String::with_capacity(line.len());
    remainder.push_str(&line[..found.start()]);
    remainder.push_str(&line[found.end()..]);

    Some(TimestampMatch {
        timestamp: found.as_str(),
        remainder: remainder.trim().to_string(),
    })
}

/// Sender name from a `Name:` label line, if the line is one.
fn sender_label(line: &str) -> Option<&str> {
    line.strip_suffix(':').map(str::trim)
}

/// Whether the parser is inside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No message is being accumulated
    Idle,
    /// A timestamp or sender label opened a message; body lines are collected
    Collecting,
}

/// Line-at-a-time transcript state machine.
///
/// Each call to [`feed`](Self::feed) emits at most one message. Call
/// [`finish`](Self::finish) after the last line to flush a message that was
/// not closed by a blank line.
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    state: ParserState,
    /// Last seen sender label; empty means none yet
    sender: String,
    /// Last seen time literal
    timestamp: Option<String>,
    /// Body lines of the message being collected, newline-joined
    body: String,
}

impl TranscriptParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            sender: String::new(),
            timestamp: None,
            body: String::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Current sender label, if one has been seen.
    pub fn sender(&self) -> Option<&str> {
        (!self.sender.is_empty()).then_some(self.sender.as_str())
    }

    /// Process one line of the dump.
    pub fn feed(&mut self, raw_line: &str) -> Option<Message> {
        let line = raw_line.trim();

        if line.is_empty() {
            if self.has_pending_body() {
                let message = self.take_message();
                self.state = ParserState::Idle;
                return Some(message);
            }
            return None;
        }

        if let Some(found) = find_timestamp(line) {
            let flushed = if self.has_pending_body() {
                Some(self.take_message())
            } else {
                None
            };

            self.body.clear();
            self.timestamp = Some(found.timestamp.to_string());
            if !found.remainder.is_empty() {
                match sender_label(&found.remainder) {
                    Some(sender) => self.sender = sender.to_string(),
                    None => self.body.push_str(&found.remainder),
                }
            }
            self.state = ParserState::Collecting;
            return flushed;
        }

        // A label only counts before any body text; "Here's the list:" in the
        // middle of a message is content.
        if self.body.is_empty() {
            if let Some(sender) = sender_label(line) {
                self.sender = sender.to_string();
                self.state = ParserState::Collecting;
                return None;
            }
        }

        if self.state == ParserState::Collecting {
            if !self.body.is_empty() {
                self.body.push('\n');
            }
            self.body.push_str(line);
            return None;
        }

        let sender = self.sender().unwrap_or(UNKNOWN);
        Some(Message::new(sender, UNKNOWN, line))
    }

    /// Flush the message still being collected, if it has a body.
    pub fn finish(mut self) -> Option<Message> {
        if self.has_pending_body() {
            Some(self.take_message())
        } else {
            None
        }
    }

    fn has_pending_body(&self) -> bool {
        self.state == ParserState::Collecting && !self.body.is_empty()
    }

    fn take_message(&mut self) -> Message {
        let body = std::mem::take(&mut self.body);
        Message::new(
            self.sender().unwrap_or(SELF_SENDER),
            self.timestamp.as_deref().unwrap_or(UNKNOWN),
            body.trim(),
        )
    }
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconstruct up to `limit` messages from a raw text dump.
///
/// Messages are returned in the order they appear in the dump. Scanning stops
/// as soon as `limit` messages have been emitted, so the result can be shorter
/// than requested but never longer. Unrecognisable text degrades to one
/// message per line rather than an error.
pub fn reconstruct(raw_text: &str, limit: NonZeroUsize) -> Vec<Message> {
    let limit = limit.get();
    let mut parser = TranscriptParser::new();
    let mut messages = Vec::new();

    for line in raw_text.lines() {
        if let Some(message) = parser.feed(line) {
            messages.push(message);
        }
        if messages.len() >= limit {
            break;
        }
    }

    if messages.len() < limit {
        if let Some(message) = parser.finish() {
            messages.push(message);
        }
    }

    messages.truncate(limit);
    debug!(
        "Reconstructed {} messages ({} timestamped, limit {}) from {} bytes",
        messages.len(),
        messages.iter().filter(|m| m.has_timestamp()).count(),
        limit,
        raw_text.len()
    );
    messages
}
