//! Unix socket service exposing the scrape operations.
//!
//! Clients send one JSON request per line and get one JSON response per line:
//!
//! ```text
//! {"action": "open_application"}
//! {"action": "list_contacts"}
//! {"action": "search_contact", "contact": "Alice"}
//! {"action": "scrape_messages", "messageCount": 50}
//! ```
//!
//! Success responses carry `"success": true` plus the payload; failures carry
//! `"error"` and an HTTP-style `"status"` (400 for bad input, 500 otherwise).

use crate::driver::AutomationDriver;
use crate::types::ScrapeError;
use crate::workflow::ChatScraper;
use chat_transcript::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// A request received from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServiceRequest {
    ListContacts,
    OpenApplication,
    SearchContact {
        #[serde(default)]
        contact: Option<String>,
    },
    ScrapeMessages {
        /// Kept as raw JSON so that non-numeric values are reported as a
        /// validation error rather than a parse error
        #[serde(default, rename = "messageCount")]
        message_count: Option<Value>,
    },
}

/// Response sent back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ServiceResponse {
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            contacts: None,
            messages: None,
            error: None,
            status: None,
        }
    }

    pub fn contacts(contacts: Vec<String>) -> Self {
        Self {
            contacts: Some(contacts),
            ..Self::ok()
        }
    }

    pub fn messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Some(messages),
            ..Self::ok()
        }
    }

    pub fn error(message: &str, status: u16) -> Self {
        Self {
            success: None,
            contacts: None,
            messages: None,
            error: Some(message.to_string()),
            status: Some(status),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

impl From<ScrapeError> for ServiceResponse {
    fn from(err: ScrapeError) -> Self {
        ServiceResponse::error(&err.to_string(), err.status_code())
    }
}

/// Validate a `messageCount` value.
///
/// Missing or null means `default`. Positive integers and strings holding a
/// positive integer are accepted; zero, negatives, fractions and anything
/// else are rejected.
pub fn parse_message_count(
    value: Option<&Value>,
    default: NonZeroUsize,
) -> Result<NonZeroUsize, ScrapeError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<usize>().ok(),
        Some(_) => None,
    };

    parsed.and_then(NonZeroUsize::new).ok_or_else(|| {
        ScrapeError::InvalidInput("messageCount must be a positive number".to_string())
    })
}

/// Run one request against the scraper.
///
/// Malformed input is answered without taking the scraper lock, so a bad
/// request never waits behind a scrape that is already running.
pub async fn dispatch<D: AutomationDriver>(
    scraper: &Mutex<ChatScraper<D>>,
    default_count: NonZeroUsize,
    request: ServiceRequest,
) -> ServiceResponse {
    let result = match request {
        ServiceRequest::ListContacts => {
            let scraper = scraper.lock().await;
            scraper.list_contacts().await.map(ServiceResponse::contacts)
        }
        ServiceRequest::OpenApplication => {
            let scraper = scraper.lock().await;
            scraper.open_application().await.map(|()| ServiceResponse::ok())
        }
        ServiceRequest::SearchContact { contact } => {
            match contact.filter(|c| !c.trim().is_empty()) {
                None => Err(ScrapeError::InvalidInput(
                    "Contact name is required".to_string(),
                )),
                Some(contact) => {
                    let scraper = scraper.lock().await;
                    scraper.search_contact(&contact).await.map(|()| ServiceResponse::ok())
                }
            }
        }
        ServiceRequest::ScrapeMessages { message_count } => {
            match parse_message_count(message_count.as_ref(), default_count) {
                Ok(count) => {
                    let scraper = scraper.lock().await;
                    scraper.scrape_messages(count).await.map(ServiceResponse::messages)
                }
                Err(e) => Err(e),
            }
        }
    };

    result.unwrap_or_else(|e| {
        if e.is_client_error() {
            warn!("Rejected request: {}", e);
        } else {
            error!("Request failed: {}", e);
        }
        e.into()
    })
}

/// Line-delimited JSON service over a Unix socket
pub struct ScrapeService<D> {
    socket_path: PathBuf,
    /// Used when a scrape request omits `messageCount`
    default_count: NonZeroUsize,
    scraper: Arc<Mutex<ChatScraper<D>>>,
}

impl<D: AutomationDriver + 'static> ScrapeService<D> {
    pub fn new(scraper: ChatScraper<D>, socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            default_count: scraper.default_message_count(),
            scraper: Arc::new(Mutex::new(scraper)),
        }
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Process a single request (for direct integration without the socket)
    pub async fn process(&self, request: ServiceRequest) -> ServiceResponse {
        dispatch(&self.scraper, self.default_count, request).await
    }

    /// Start the service and listen for connections
    pub async fn run(&self) -> Result<(), ScrapeError> {
        // Remove a stale socket left by a previous run
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("Scrape service listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let scraper = Arc::clone(&self.scraper);
                    let default_count = self.default_count;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, scraper, default_count).await {
                            error!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection
async fn handle_connection<D: AutomationDriver>(
    stream: UnixStream,
    scraper: Arc<Mutex<ChatScraper<D>>>,
    default_count: NonZeroUsize,
) -> Result<(), ScrapeError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        if line.trim().is_empty() {
            line.clear();
            continue;
        }

        let response = match serde_json::from_str::<ServiceRequest>(&line) {
            Ok(request) => {
                info!("Received request: {:?}", request);
                dispatch(&scraper, default_count, request).await
            }
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                ServiceResponse::error(&format!("Invalid request: {}", e), 400)
            }
        };

        let mut response_json = serde_json::to_string(&response)
            .unwrap_or_else(|e| format!(r#"{{"error":"Failed to encode response: {}","status":500}}"#, e));
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;

        line.clear();
    }

    Ok(())
}
