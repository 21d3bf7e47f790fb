//! Automation driver contract.
//!
//! The scraper never talks to the OS accessibility layer directly. It needs a
//! handful of primitives (launch an app, find an element, click, scroll, send
//! keys, read text) and gets them from an [`AutomationDriver`]. The shipped
//! implementation is [`command::CommandDriver`], which delegates each primitive
//! to an external helper binary.

pub mod command;

use crate::types::DriverError;
use serde::{Deserialize, Serialize};

pub use command::CommandDriver;

/// Query for a single UI element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementQuery {
    /// Application that owns the element
    pub app: String,
    /// Accessibility role hint, e.g. "AXTextField"
    pub role: String,
    /// Also search windows that are not in the foreground
    pub search_background_windows: bool,
}

impl ElementQuery {
    pub fn new(app: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            role: role.into(),
            search_background_windows: true,
        }
    }
}

/// A located element. Opaque to the scraper; only the driver interprets `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
        }
    }
}

/// Request for the flattened text of a window or subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextQuery {
    pub app: String,
    /// Subtree to read; `None` reads the whole window
    pub subtree_root: Option<String>,
    /// Traversal depth bound
    pub max_depth: u32,
}

/// Result of a text extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextExtraction {
    pub success: bool,
    #[serde(default)]
    pub text: Option<String>,
}

impl TextExtraction {
    pub fn found(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    /// The extracted text, if extraction succeeded and produced something
    pub fn into_text(self) -> Option<String> {
        if !self.success {
            return None;
        }
        self.text.filter(|t| !t.is_empty())
    }
}

/// Primitives the scraper needs from the UI automation layer
#[async_trait::async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Bring an application to the foreground, launching it if needed.
    /// A failed launch is `Ok(false)`, not an error.
    async fn open_application(&self, name: &str) -> Result<bool, DriverError>;

    /// Find the first element matching the query
    async fn locate_element(
        &self,
        query: &ElementQuery,
    ) -> Result<Option<ElementHandle>, DriverError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn scroll(
        &self,
        element: &ElementHandle,
        direction: ScrollDirection,
        amount: u32,
    ) -> Result<(), DriverError>;

    /// Send a key or key combination ("enter", "ctrl+f") to the focused app
    async fn send_keystroke(&self, key: &str) -> Result<(), DriverError>;

    /// Type text into the focused element
    async fn type_text(&self, text: &str) -> Result<(), DriverError>;

    /// Read the visible text of a window or subtree
    async fn extract_text(&self, query: &TextQuery) -> Result<TextExtraction, DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_extraction_into_text() {
        assert_eq!(TextExtraction::found("hi").into_text().as_deref(), Some("hi"));
        assert_eq!(TextExtraction::found("").into_text(), None);
        assert_eq!(TextExtraction::failed().into_text(), None);

        let inconsistent = TextExtraction {
            success: false,
            text: Some("stale".into()),
        };
        assert_eq!(inconsistent.into_text(), None);
    }

    #[test]
    fn test_element_query_defaults_to_background_search() {
        let query = ElementQuery::new("WhatsApp", "AXScrollArea");
        assert!(query.search_background_windows);
        assert_eq!(ScrollDirection::Up.as_str(), "up");
    }
}
