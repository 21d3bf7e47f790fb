//! Error types shared across the scraper.

use chat_transcript::ExportError;
use thiserror::Error;

/// Errors raised by an automation driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Automation helper not found at: {0}")]
    BinaryNotFound(String),

    #[error("Automation command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Invalid output from automation command `{command}`: {reason}")]
    InvalidOutput { command: String, reason: String },

    #[error("Automation command `{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Rejected before any automation was attempted
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to open {0} application")]
    AppLaunchFailed(String),

    #[error("Failed to extract text from {0}")]
    NoText(String),

    #[error("Failed to {operation}: {source}")]
    Driver {
        operation: &'static str,
        #[source]
        source: DriverError,
    },

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Wrap a driver error with the operation that was running
    pub fn driver(operation: &'static str) -> impl Fn(DriverError) -> Self + Copy {
        move |source| ScrapeError::Driver { operation, source }
    }

    /// HTTP-style status: 400 for caller mistakes, 500 for automation failures
    pub fn status_code(&self) -> u16 {
        match self {
            ScrapeError::InvalidInput(_) => 400,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() == 400
    }
}
