//! Scripted in-memory driver shared by the integration tests.

#![allow(dead_code)]

use chat_scraper::config::TimingConfig;
use chat_scraper::{
    AutomationDriver, Config, DriverError, ElementHandle, ElementQuery, ScrollDirection,
    TextExtraction, TextQuery,
};
use std::sync::Mutex;

/// One primitive call as seen by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    Locate(String),
    Click(String),
    Scroll(String, ScrollDirection, u32),
    Key(String),
    Type(String),
    Text(Option<String>, u32),
}

/// Driver that answers from canned fixtures and records every call
pub struct ScriptedDriver {
    pub calls: Mutex<Vec<Call>>,
    pub open_succeeds: bool,
    pub search_field: Option<ElementHandle>,
    pub scroll_area: Option<ElementHandle>,
    pub sidebar: TextExtraction,
    pub window: TextExtraction,
    /// Fail the first call of this kind ("open", "locate", "scroll", "key", "type", "text")
    pub fail_on: Option<&'static str>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            open_succeeds: true,
            search_field: Some(handle("search-field")),
            scroll_area: Some(handle("chat-scroll")),
            sidebar: TextExtraction::failed(),
            window: TextExtraction::failed(),
            fail_on: None,
        }
    }

    pub fn with_window_text(mut self, text: &str) -> Self {
        self.window = TextExtraction::found(text);
        self
    }

    pub fn with_sidebar_text(mut self, text: &str) -> Self {
        self.sidebar = TextExtraction::found(text);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, call: Call) -> Result<(), DriverError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(kind) {
            return Err(DriverError::CommandFailed {
                command: kind.to_string(),
                stderr: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

pub fn handle(id: &str) -> ElementHandle {
    ElementHandle {
        id: id.to_string(),
        role: None,
    }
}

/// Default config with every settle delay disabled
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.timing = TimingConfig::zero();
    config.extraction.search_shortcut = "ctrl+f".to_string();
    config
}

#[async_trait::async_trait]
impl AutomationDriver for ScriptedDriver {
    async fn open_application(&self, name: &str) -> Result<bool, DriverError> {
        self.record("open", Call::Open(name.to_string()))?;
        Ok(self.open_succeeds)
    }

    async fn locate_element(
        &self,
        query: &ElementQuery,
    ) -> Result<Option<ElementHandle>, DriverError> {
        self.record("locate", Call::Locate(query.role.clone()))?;
        Ok(match query.role.as_str() {
            "AXTextField" => self.search_field.clone(),
            "AXScrollArea" => self.scroll_area.clone(),
            _ => None,
        })
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record("click", Call::Click(element.id.clone()))
    }

    async fn scroll(
        &self,
        element: &ElementHandle,
        direction: ScrollDirection,
        amount: u32,
    ) -> Result<(), DriverError> {
        self.record("scroll", Call::Scroll(element.id.clone(), direction, amount))
    }

    async fn send_keystroke(&self, key: &str) -> Result<(), DriverError> {
        self.record("key", Call::Key(key.to_string()))
    }

    async fn type_text(&self, text: &str) -> Result<(), DriverError> {
        self.record("type", Call::Type(text.to_string()))
    }

    async fn extract_text(&self, query: &TextQuery) -> Result<TextExtraction, DriverError> {
        self.record("text", Call::Text(query.subtree_root.clone(), query.max_depth))?;
        Ok(match query.subtree_root {
            Some(_) => self.sidebar.clone(),
            None => self.window.clone(),
        })
    }
}
