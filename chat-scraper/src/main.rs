//! Chat Scraper - command line entry point.
//!
//! # Usage
//!
//! ```bash
//! # Run the socket service
//! chat-scraper serve
//!
//! # One-shot operations
//! chat-scraper open
//! chat-scraper contacts
//! chat-scraper search "Alice Smith"
//! chat-scraper scrape --contact "Alice Smith" --count 100 --format csv --output ./exports
//!
//! # Reconstruct a transcript from a saved text dump
//! chat-scraper parse dump.txt --limit 20
//! ```

use chat_scraper::config::GeneralConfig;
use chat_scraper::{ChatScraper, CommandDriver, Config, ScrapeError, ScrapeService};
use chat_transcript::{export_file_name, reconstruct, render, ExportFormat, Message};
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "chat-scraper", version, about = "Scrape desktop chat transcripts through accessibility automation")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, env = "CHAT_SCRAPER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve requests on the configured Unix socket
    Serve {
        /// Override the socket path
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Open the chat application
    Open,
    /// List contacts visible in the sidebar
    Contacts,
    /// Open the chat with a contact or group
    Search {
        contact: String,
    },
    /// Scrape messages from the open chat
    Scrape {
        /// Number of messages to scrape
        #[arg(short = 'n', long)]
        count: Option<NonZeroUsize>,
        /// Open the app and search for this contact first
        #[arg(long)]
        contact: Option<String>,
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// Output file, or a directory to write a timestamped file into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reconstruct messages from a saved text dump
    Parse {
        file: PathBuf,
        #[arg(short, long, default_value = "50")]
        limit: NonZeroUsize,
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_config_path);
    let loaded = Config::read_from_path(&config_path);

    // Initialize logging before reporting on the config file
    let log_level = match &loaded {
        Ok(config) => config.general.log_level.clone(),
        Err(_) => GeneralConfig::default().log_level,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or(log_level),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::or_defaults(loaded);
    debug!("Config path: {:?}", config_path);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_scraper(config: &Config) -> ChatScraper<CommandDriver> {
    let driver = CommandDriver::from_config(&config.driver);
    if !driver.is_available() {
        warn!(
            "Automation helper not found at {}",
            driver.binary_path().display()
        );
    }
    ChatScraper::new(driver, config.clone())
}

async fn run(command: Command, config: Config) -> Result<(), ScrapeError> {
    match command {
        Command::Parse {
            file,
            limit,
            format,
        } => {
            let raw = std::fs::read_to_string(&file)?;
            let messages = reconstruct(&raw, limit);
            emit(&messages, format, None, &config.general.app_name, "dump")
        }
        Command::Serve { socket } => {
            let socket = socket.unwrap_or_else(|| config.service.socket_path.clone());
            let service = ScrapeService::new(build_scraper(&config), socket);
            info!("Press Ctrl+C to stop");

            let result = tokio::select! {
                result = service.run() => result,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    Ok(())
                }
            };

            // Clean up socket file
            if service.socket_path().exists() {
                std::fs::remove_file(service.socket_path())?;
            }
            result
        }
        Command::Open => {
            build_scraper(&config).open_application().await?;
            println!("{} is open", config.general.app_name);
            Ok(())
        }
        Command::Contacts => {
            for contact in build_scraper(&config).list_contacts().await? {
                println!("{}", contact);
            }
            Ok(())
        }
        Command::Search { contact } => {
            build_scraper(&config).search_contact(&contact).await?;
            println!("Opened chat for {}", contact.trim());
            Ok(())
        }
        Command::Scrape {
            count,
            contact,
            format,
            output,
        } => {
            let scraper = build_scraper(&config);
            let count = count.unwrap_or_else(|| scraper.default_message_count());
            let messages = match &contact {
                Some(contact) => scraper.scrape_conversation(contact, count).await?,
                None => scraper.scrape_messages(count).await?,
            };
            info!("Scraped {} of {} requested messages", messages.len(), count);
            emit(
                &messages,
                format,
                output.as_deref(),
                &config.general.app_name,
                contact.as_deref().unwrap_or("chat"),
            )
        }
    }
}

/// Print or save a transcript
fn emit(
    messages: &[Message],
    format: ExportFormat,
    output: Option<&Path>,
    app_name: &str,
    contact: &str,
) -> Result<(), ScrapeError> {
    if messages.is_empty() {
        eprintln!("No messages found");
        return Ok(());
    }
    let document = render(messages, format)?;

    match output {
        None => println!("{}", document),
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export_file_name(app_name, contact, format, chrono::Utc::now()))
            } else {
                path.to_path_buf()
            };
            std::fs::write(&path, document)?;
            println!("Exported {} messages to {}", messages.len(), path.display());
        }
    }
    Ok(())
}
