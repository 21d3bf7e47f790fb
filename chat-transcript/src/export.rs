//! Flat-file export of reconstructed transcripts.

use crate::types::{ExportError, ExportFormat, Message};
use chrono::{DateTime, SecondsFormat, Utc};

const CSV_HEADER: &str = "timestamp,sender,message";

/// Render a transcript in the requested format.
pub fn render(messages: &[Message], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(messages),
        ExportFormat::Csv => to_csv(messages),
    }
}

/// Pretty-printed JSON array of `{text, timestamp, sender}` objects.
pub fn to_json(messages: &[Message]) -> Result<String, ExportError> {
    if messages.is_empty() {
        return Err(ExportError::Empty);
    }
    Ok(serde_json::to_string_pretty(messages)?)
}

/// CSV with a `timestamp,sender,message` header.
///
/// Every field is quoted and embedded quotes are doubled, so commas and
/// newlines inside a message body survive a round trip through a CSV reader.
pub fn to_csv(messages: &[Message]) -> Result<String, ExportError> {
    if messages.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut out = String::with_capacity(CSV_HEADER.len() + messages.len() * 64);
    out.push_str(CSV_HEADER);
    for message in messages {
        out.push('\n');
        out.push_str(&quote(&message.timestamp));
        out.push(',');
        out.push_str(&quote(&message.sender));
        out.push(',');
        out.push_str(&quote(&message.text));
    }
    Ok(out)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// File name for an export, e.g. `whatsapp-Alice-2026-10-18T09:30:00.000Z.json`.
pub fn export_file_name(
    app_name: &str,
    contact: &str,
    format: ExportFormat,
    at: DateTime<Utc>,
) -> String {
    let app = app_name.to_lowercase().replace(' ', "-");
    let contact = contact.trim().replace(['/', '\\'], "_");
    format!(
        "{}-{}-{}.{}",
        app,
        contact,
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        format.as_str()
    )
}
