//! Chat Scraper - Drive a desktop chat application and scrape its transcript.
//!
//! The scraper automates a chat client (WhatsApp Desktop by default) through
//! accessibility primitives: it opens the app, searches for a chat, scrolls
//! back through the history and reads the window text. The raw text is turned
//! into messages by the [`chat_transcript`] crate.
//!
//! # Architecture
//!
//! - [`driver`]: the automation contract and the command-bridge driver that
//!   delegates to an external helper binary
//! - [`workflow`]: the scrape operations, with settle delays between steps
//! - [`service`]: line-delimited JSON over a Unix socket
//! - [`config`]: TOML configuration with per-field defaults

pub mod config;
pub mod driver;
pub mod service;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use driver::{
    AutomationDriver, CommandDriver, ElementHandle, ElementQuery, ScrollDirection,
    TextExtraction, TextQuery,
};
pub use service::{parse_message_count, ScrapeService, ServiceRequest, ServiceResponse};
pub use types::{DriverError, ScrapeError};
pub use workflow::ChatScraper;
