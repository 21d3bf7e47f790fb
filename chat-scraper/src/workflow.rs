//! Scrape workflows.
//!
//! This module sequences driver primitives into the operations callers use:
//! open the app, list contacts, search for a chat, scroll back and scrape.
//! Each step waits out a settle delay before the next one so the UI has
//! finished rendering. There is no cancellation and no retry; a sequence
//! runs to completion or fails at the first driver error.

use crate::config::{millis, Config};
use crate::driver::{AutomationDriver, ElementQuery, ScrollDirection, TextQuery};
use crate::types::{DriverError, ScrapeError};
use chat_transcript::{estimate_scrolls_with, extract_contacts, reconstruct, Message};
use std::num::NonZeroUsize;
use tracing::{debug, error, info, warn};

/// Used when the configured default message count is zero
const FALLBACK_MESSAGE_COUNT: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(n) => n,
    None => unreachable!(),
};

async fn settle(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(millis(ms)).await;
    }
}

/// Drives one chat application through an [`AutomationDriver`]
pub struct ChatScraper<D> {
    driver: D,
    config: Config,
}

impl<D: AutomationDriver> ChatScraper<D> {
    pub fn new(driver: D, config: Config) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn app(&self) -> &str {
        &self.config.general.app_name
    }

    /// Message count used when the caller does not give one
    pub fn default_message_count(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.config.extraction.default_message_count)
            .unwrap_or(FALLBACK_MESSAGE_COUNT)
    }

    /// Bring the chat application to the foreground and let it settle.
    pub async fn open_application(&self) -> Result<(), ScrapeError> {
        info!("Attempting to open {} application", self.app());

        let opened = self
            .driver
            .open_application(self.app())
            .await
            .map_err(ScrapeError::driver("open application"))?;

        if !opened {
            error!("Failed to open {} application", self.app());
            return Err(ScrapeError::AppLaunchFailed(self.app().to_string()));
        }

        info!("{} application opened", self.app());
        settle(self.config.timing.launch_settle_ms).await;
        Ok(())
    }

    /// Contact names visible in the sidebar.
    ///
    /// An extraction that comes back empty yields an empty list; only driver
    /// failures are errors.
    pub async fn list_contacts(&self) -> Result<Vec<String>, ScrapeError> {
        info!("Listing visible {} contacts", self.app());

        let query = TextQuery {
            app: self.app().to_string(),
            subtree_root: Some(self.config.extraction.sidebar_subtree.clone()),
            max_depth: self.config.extraction.sidebar_max_depth,
        };
        let extraction = self
            .driver
            .extract_text(&query)
            .await
            .map_err(ScrapeError::driver("list contacts"))?;

        let contacts = match extraction.into_text() {
            Some(text) => extract_contacts(&text),
            None => Vec::new(),
        };

        if contacts.is_empty() {
            warn!("No contacts found in {} sidebar", self.app());
        } else {
            info!("Found {} contacts in {} sidebar", contacts.len(), self.app());
        }
        Ok(contacts)
    }

    /// Open the chat with `contact` through the app's search field.
    ///
    /// Focuses the search field (clicking it, or pressing the search shortcut
    /// when it cannot be located), clears it, types the name and selects the
    /// first result.
    pub async fn search_contact(&self, contact: &str) -> Result<(), ScrapeError> {
        let contact = contact.trim();
        if contact.is_empty() {
            return Err(ScrapeError::InvalidInput(
                "Contact name is required".to_string(),
            ));
        }

        info!("Searching for contact: {}", contact);
        let timing = &self.config.timing;
        let on_error = ScrapeError::driver("search for contact");

        let query = ElementQuery::new(self.app(), &self.config.extraction.search_field_role);
        let field = self.driver.locate_element(&query).await.map_err(on_error)?;

        match field {
            Some(field) => {
                debug!("Clicking search field {}", field.id);
                self.driver.click(&field).await.map_err(on_error)?;
            }
            None => {
                warn!("Could not find the search field, using keyboard shortcut");
                self.driver
                    .send_keystroke(&self.config.extraction.search_shortcut)
                    .await
                    .map_err(on_error)?;
                settle(timing.search_focus_ms).await;
            }
        }

        self.driver.send_keystroke("escape").await.map_err(on_error)?;
        settle(timing.search_clear_ms).await;

        self.driver.type_text(contact).await.map_err(on_error)?;
        settle(timing.search_results_ms).await;

        self.driver.send_keystroke("enter").await.map_err(on_error)?;
        settle(timing.chat_load_ms).await;

        info!("Opened chat for {}", contact);
        Ok(())
    }

    /// Scroll the open chat up `count` times to load older messages.
    ///
    /// Falls back to Page Up when the chat container cannot be located.
    /// Returns false if the driver failed part way.
    pub async fn scroll_up_chat(&self, count: usize) -> bool {
        match self.try_scroll_up(count).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error scrolling chat: {}", e);
                false
            }
        }
    }

    async fn try_scroll_up(&self, count: usize) -> Result<(), DriverError> {
        let settle_ms = self.config.timing.scroll_settle_ms;
        let query = ElementQuery::new(self.app(), &self.config.extraction.scroll_area_role);

        match self.driver.locate_element(&query).await? {
            Some(container) => {
                for _ in 0..count {
                    self.driver
                        .scroll(
                            &container,
                            ScrollDirection::Up,
                            self.config.extraction.scroll_amount,
                        )
                        .await?;
                    settle(settle_ms).await;
                }
            }
            None => {
                info!("Could not find chat container, scrolling with Page Up");
                for _ in 0..count {
                    self.driver.send_keystroke("pageup").await?;
                    settle(settle_ms).await;
                }
            }
        }
        Ok(())
    }

    /// Scroll back far enough for `message_count` messages, read the window
    /// and reconstruct the transcript.
    ///
    /// The result may hold fewer messages than requested when the visible
    /// text runs out first.
    pub async fn scrape_messages(
        &self,
        message_count: NonZeroUsize,
    ) -> Result<Vec<Message>, ScrapeError> {
        info!("Scraping {} messages from {} chat", message_count, self.app());

        let scrolls = estimate_scrolls_with(
            message_count,
            self.config.extraction.messages_per_viewport,
        );
        info!("Will scroll up {} times to load more messages", scrolls);

        if !self.scroll_up_chat(scrolls).await {
            warn!("Scrolling did not complete, extracting what is visible");
        }
        settle(self.config.timing.extract_settle_ms).await;

        let query = TextQuery {
            app: self.app().to_string(),
            subtree_root: None,
            max_depth: self.config.extraction.chat_max_depth,
        };
        let extraction = self
            .driver
            .extract_text(&query)
            .await
            .map_err(ScrapeError::driver("scrape messages"))?;

        let Some(text) = extraction.into_text() else {
            error!("Failed to extract text from {}", self.app());
            return Err(ScrapeError::NoText(self.app().to_string()));
        };
        info!("Extracted {} characters of text", text.len());

        let messages = reconstruct(&text, message_count);
        if !messages.is_empty() && !messages.iter().any(|m| m.has_timestamp()) {
            warn!("No timestamps recognised in {} chat text", self.app());
        }
        if messages.len() < message_count.get() {
            info!(
                "Requested {} messages but only {} were visible",
                message_count,
                messages.len()
            );
        }
        Ok(messages)
    }

    /// Open the app, select the chat with `contact` and scrape it.
    pub async fn scrape_conversation(
        &self,
        contact: &str,
        message_count: NonZeroUsize,
    ) -> Result<Vec<Message>, ScrapeError> {
        if contact.trim().is_empty() {
            return Err(ScrapeError::InvalidInput(
                "Contact name is required".to_string(),
            ));
        }
        self.open_application().await?;
        self.search_contact(contact).await?;
        self.scrape_messages(message_count).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CommandDriver;

    #[test]
    fn test_default_message_count_falls_back() {
        let mut config = Config::default();
        config.extraction.default_message_count = 0;
        let scraper = ChatScraper::new(CommandDriver::new(), config);
        assert_eq!(scraper.default_message_count().get(), 50);
    }

    #[tokio::test]
    async fn test_empty_contact_rejected_before_automation() {
        // The helper does not exist; reaching it would yield a driver error
        let driver = CommandDriver::with_path("/nonexistent/ax-operator".into());
        let scraper = ChatScraper::new(driver, Config::default());

        let err = scraper.search_contact("   ").await.unwrap_err();
        assert!(err.is_client_error());

        let err = scraper
            .scrape_conversation("", NonZeroUsize::new(5).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
