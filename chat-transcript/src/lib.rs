//! Chat Transcript - Recover structured chat messages from raw accessibility text.
//!
//! Desktop chat clients expose their visible content to accessibility APIs as
//! an unstructured list of text lines. This crate turns such a dump into an
//! ordered list of messages and provides the small helpers around it.
//!
//! # Quick Start
//!
//! ```
//! use std::num::NonZeroUsize;
//! use chat_transcript::reconstruct;
//!
//! let raw = "10:42 AM\nBob:\nhey there\n\n10:45 AM\nhow are you?";
//! let messages = reconstruct(raw, NonZeroUsize::new(10).unwrap());
//!
//! assert_eq!(messages.len(), 2);
//! assert_eq!(messages[1].sender, "Bob");
//! ```
//!
//! # Modules
//!
//! - [`transcript`]: the line-scanning state machine
//! - [`contacts`]: contact-name filter for sidebar dumps
//! - [`scroll`]: how far to scroll back for a given message count
//! - [`export`]: JSON and CSV rendering
//! - [`types`]: `Message`, `ExportFormat`, `ExportError`

pub mod contacts;
pub mod export;
pub mod scroll;
pub mod transcript;
pub mod types;

pub use contacts::{extract_contacts, is_contact_line};
pub use export::{export_file_name, render, to_csv, to_json};
pub use scroll::{estimate_scrolls, estimate_scrolls_with, MESSAGES_PER_VIEWPORT};
pub use transcript::{find_timestamp, reconstruct, ParserState, TranscriptParser};
pub use types::{ExportError, ExportFormat, Message, SELF_SENDER, UNKNOWN};
