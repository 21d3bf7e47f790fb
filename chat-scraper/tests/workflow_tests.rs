//! Integration tests for the scrape workflows, run against a scripted driver.

mod common;

use chat_scraper::{ChatScraper, ScrapeError, ScrollDirection};
use chat_transcript::Message;
use common::{fast_config, handle, Call, ScriptedDriver};
use std::num::NonZeroUsize;

const CHAT_DUMP: &str = "10:42 AM\nBob:\nhey there\n\n10:45 AM\nhow are you?\n";

fn count(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[tokio::test]
async fn test_open_application_success() {
    let scraper = ChatScraper::new(ScriptedDriver::new(), fast_config());

    scraper.open_application().await.unwrap();
    assert_eq!(scraper.driver().calls(), vec![Call::Open("WhatsApp".into())]);
}

#[tokio::test]
async fn test_open_application_failure_is_server_error() {
    let mut driver = ScriptedDriver::new();
    driver.open_succeeds = false;
    let scraper = ChatScraper::new(driver, fast_config());

    let err = scraper.open_application().await.unwrap_err();
    assert!(matches!(err, ScrapeError::AppLaunchFailed(ref app) if app == "WhatsApp"));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_list_contacts_filters_sidebar() {
    let driver =
        ScriptedDriver::new().with_sidebar_text("Alice Smith\n10:42AM\nHey: got it\nFamily\n");
    let scraper = ChatScraper::new(driver, fast_config());

    let contacts = scraper.list_contacts().await.unwrap();
    assert_eq!(contacts, vec!["Alice Smith", "Family"]);
    assert_eq!(
        scraper.driver().calls(),
        vec![Call::Text(Some("sidebar".into()), 50)]
    );
}

#[tokio::test]
async fn test_list_contacts_empty_when_extraction_fails() {
    let scraper = ChatScraper::new(ScriptedDriver::new(), fast_config());
    assert!(scraper.list_contacts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_contact_clicks_located_field() {
    let scraper = ChatScraper::new(ScriptedDriver::new(), fast_config());

    scraper.search_contact("  Alice Smith ").await.unwrap();
    assert_eq!(
        scraper.driver().calls(),
        vec![
            Call::Locate("AXTextField".into()),
            Call::Click("search-field".into()),
            Call::Key("escape".into()),
            Call::Type("Alice Smith".into()),
            Call::Key("enter".into()),
        ]
    );
}

#[tokio::test]
async fn test_search_contact_falls_back_to_shortcut() {
    let mut driver = ScriptedDriver::new();
    driver.search_field = None;
    let scraper = ChatScraper::new(driver, fast_config());

    scraper.search_contact("Bob").await.unwrap();
    let calls = scraper.driver().calls();
    assert_eq!(calls[1], Call::Key("ctrl+f".into()));
    assert!(!calls.iter().any(|c| matches!(c, Call::Click(_))));
}

#[tokio::test]
async fn test_search_contact_rejects_empty_name_without_automation() {
    let scraper = ChatScraper::new(ScriptedDriver::new(), fast_config());

    let err = scraper.search_contact("").await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "Contact name is required");
    assert!(scraper.driver().calls().is_empty());
}

#[tokio::test]
async fn test_search_contact_driver_failure() {
    let mut driver = ScriptedDriver::new();
    driver.fail_on = Some("type");
    let scraper = ChatScraper::new(driver, fast_config());

    let err = scraper.search_contact("Bob").await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().starts_with("Failed to search for contact"));
    // Nothing after the failing step runs
    assert_eq!(
        scraper.driver().calls().last(),
        Some(&Call::Type("Bob".into()))
    );
}

#[tokio::test]
async fn test_scrape_scrolls_then_extracts_once() {
    let scraper = ChatScraper::new(
        ScriptedDriver::new().with_window_text(CHAT_DUMP),
        fast_config(),
    );

    let messages = scraper.scrape_messages(count(50)).await.unwrap();
    assert_eq!(
        messages,
        vec![
            Message::new("Bob", "10:42 AM", "hey there"),
            Message::new("Bob", "10:45 AM", "how are you?"),
        ]
    );

    let calls = scraper.driver().calls();
    let scrolls: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, Call::Scroll(..)))
        .collect();
    assert_eq!(scrolls.len(), 4);
    assert_eq!(
        scrolls[0],
        &Call::Scroll("chat-scroll".into(), ScrollDirection::Up, 500)
    );

    // Single extraction, after every scroll
    assert_eq!(calls.last(), Some(&Call::Text(None, 100)));
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::Text(..))).count(),
        1
    );
}

#[tokio::test]
async fn test_scrape_uses_page_up_without_container() {
    let mut driver = ScriptedDriver::new().with_window_text(CHAT_DUMP);
    driver.scroll_area = None;
    let scraper = ChatScraper::new(driver, fast_config());

    scraper.scrape_messages(count(16)).await.unwrap();
    let page_ups = scraper
        .driver()
        .calls()
        .into_iter()
        .filter(|c| *c == Call::Key("pageup".into()))
        .count();
    assert_eq!(page_ups, 2);
}

#[tokio::test]
async fn test_scrape_continues_when_scrolling_fails() {
    let mut driver = ScriptedDriver::new().with_window_text(CHAT_DUMP);
    driver.fail_on = Some("scroll");
    let scraper = ChatScraper::new(driver, fast_config());

    let messages = scraper.scrape_messages(count(30)).await.unwrap();
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn test_scrape_truncates_to_requested_count() {
    let scraper = ChatScraper::new(
        ScriptedDriver::new().with_window_text(CHAT_DUMP),
        fast_config(),
    );

    let messages = scraper.scrape_messages(count(1)).await.unwrap();
    assert_eq!(messages, vec![Message::new("Bob", "10:42 AM", "hey there")]);
}

#[tokio::test]
async fn test_scrape_without_text_is_error() {
    let scraper = ChatScraper::new(ScriptedDriver::new(), fast_config());

    let err = scraper.scrape_messages(count(10)).await.unwrap_err();
    assert!(matches!(err, ScrapeError::NoText(_)));
    assert_eq!(err.to_string(), "Failed to extract text from WhatsApp");
}

#[tokio::test]
async fn test_scrape_conversation_runs_full_sequence() {
    let scraper = ChatScraper::new(
        ScriptedDriver::new().with_window_text(CHAT_DUMP),
        fast_config(),
    );

    let messages = scraper
        .scrape_conversation("Bob", count(15))
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);

    let calls = scraper.driver().calls();
    assert_eq!(calls[0], Call::Open("WhatsApp".into()));
    let typed = calls.iter().position(|c| *c == Call::Type("Bob".into())).unwrap();
    let scrolled = calls
        .iter()
        .position(|c| *c == Call::Scroll(handle("chat-scroll").id, ScrollDirection::Up, 500))
        .unwrap();
    assert!(typed < scrolled);
}

#[tokio::test]
async fn test_scrape_conversation_stops_when_app_fails_to_open() {
    let mut driver = ScriptedDriver::new().with_window_text(CHAT_DUMP);
    driver.open_succeeds = false;
    let scraper = ChatScraper::new(driver, fast_config());

    assert!(scraper.scrape_conversation("Bob", count(10)).await.is_err());
    assert_eq!(scraper.driver().calls().len(), 1);
}
