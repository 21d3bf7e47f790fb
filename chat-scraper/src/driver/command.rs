//! Command-bridge automation driver.
//!
//! Each primitive runs the external automation helper once and reads a JSON
//! document from its stdout:
//!
//! | primitive        | invocation                                              | stdout                          |
//! |------------------|---------------------------------------------------------|---------------------------------|
//! | open_application | `open --app <name>`                                     | `{"success": bool}`             |
//! | locate_element   | `locate --app <app> --role <role> [--background]`       | `{"element": {"id": ..} \| null}` |
//! | click            | `click --element <id>`                                  | ignored                         |
//! | scroll           | `scroll --element <id> --direction up --amount <n>`     | ignored                         |
//! | send_keystroke   | `press --key <key>`                                     | ignored                         |
//! | type_text        | `type --text <text>`                                    | ignored                         |
//! | extract_text     | `text --app <app> [--window <root>] --max-depth <n>`    | `{"success": bool, "text": ..}` |

use super::{AutomationDriver, ElementHandle, ElementQuery, ScrollDirection, TextExtraction, TextQuery};
use crate::config::DriverConfig;
use crate::types::DriverError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error};

const DEFAULT_BINARY: &str = "ax-operator";

#[derive(Debug, Deserialize)]
struct OpenResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct LocateResponse {
    #[serde(default)]
    element: Option<ElementHandle>,
}

/// Driver that shells out to an automation helper binary
#[derive(Debug, Clone)]
pub struct CommandDriver {
    /// Path to the helper binary (or interpreter)
    binary_path: PathBuf,
    /// Arguments placed before every sub-command, e.g. a script path
    prefix_args: Vec<String>,
    /// Timeout for a single invocation in seconds
    timeout_secs: u64,
}

impl CommandDriver {
    /// Create a driver with the default binary path
    pub fn new() -> Self {
        Self::with_path(Self::default_binary_path())
    }

    /// Create with a custom binary path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            binary_path: path,
            prefix_args: Vec::new(),
            timeout_secs: 30,
        }
    }

    /// Create from the `[driver]` config section
    pub fn from_config(config: &DriverConfig) -> Self {
        let mut driver = match &config.binary_path {
            Some(path) => Self::with_path(PathBuf::from(path)),
            None => Self::new(),
        };
        driver.prefix_args = config.binary_args.clone();
        driver.timeout_secs = config.timeout_secs;
        driver
    }

    /// Arguments inserted before every sub-command
    pub fn with_prefix_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Get the default binary path
    fn default_binary_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        let paths = [
            // Same directory as the running binary
            exe_dir.join(DEFAULT_BINARY),
            // System paths
            PathBuf::from("/usr/local/bin").join(DEFAULT_BINARY),
        ];

        for path in paths {
            if path.exists() {
                return path;
            }
        }

        // Bare name, resolved through PATH at spawn time
        PathBuf::from(DEFAULT_BINARY)
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Check if the binary is available at an explicit location.
    /// A bare name is assumed to be on PATH.
    pub fn is_available(&self) -> bool {
        if self.binary_path.components().count() == 1 {
            return true;
        }
        let exists = self.binary_path.exists();
        if !exists {
            debug!(
                "Automation helper not found at: {}",
                self.binary_path.display()
            );
        }
        exists
    }

    /// Set the per-invocation timeout
    pub fn set_timeout(&mut self, secs: u64) {
        self.timeout_secs = secs;
    }

    /// Run one sub-command and return its stdout
    async fn execute(&self, args: &[String]) -> Result<String, DriverError> {
        let command_name = args.first().cloned().unwrap_or_default();
        debug!("Running automation command: {}", args.join(" "));

        let child = Command::new(&self.binary_path)
            .args(&self.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(Duration::from_secs(self.timeout_secs), child).await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DriverError::BinaryNotFound(
                    self.binary_path.display().to_string(),
                ));
            }
            Ok(Err(e)) => return Err(DriverError::Io(e)),
            Err(_) => {
                return Err(DriverError::Timeout {
                    command: command_name,
                    secs: self.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Automation command `{}` failed: {}", command_name, stderr);
            return Err(DriverError::CommandFailed {
                command: command_name,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run one sub-command and parse its JSON output
    async fn call<T: DeserializeOwned>(&self, args: &[String]) -> Result<T, DriverError> {
        let stdout = self.execute(args).await?;
        serde_json::from_str(stdout.trim()).map_err(|e| DriverError::InvalidOutput {
            command: args.first().cloned().unwrap_or_default(),
            reason: e.to_string(),
        })
    }
}

impl Default for CommandDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[async_trait::async_trait]
impl AutomationDriver for CommandDriver {
    async fn open_application(&self, name: &str) -> Result<bool, DriverError> {
        let response: OpenResponse = self.call(&args(["open", "--app", name])).await?;
        Ok(response.success)
    }

    async fn locate_element(
        &self,
        query: &ElementQuery,
    ) -> Result<Option<ElementHandle>, DriverError> {
        let mut command = args([
            "locate",
            "--app",
            query.app.as_str(),
            "--role",
            query.role.as_str(),
        ]);
        if query.search_background_windows {
            command.push("--background".to_string());
        }
        let response: LocateResponse = self.call(&command).await?;
        Ok(response.element)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.execute(&args(["click", "--element", element.id.as_str()])).await?;
        Ok(())
    }

    async fn scroll(
        &self,
        element: &ElementHandle,
        direction: ScrollDirection,
        amount: u32,
    ) -> Result<(), DriverError> {
        let amount = amount.to_string();
        self.execute(&args([
            "scroll",
            "--element",
            element.id.as_str(),
            "--direction",
            direction.as_str(),
            "--amount",
            amount.as_str(),
        ]))
        .await?;
        Ok(())
    }

    async fn send_keystroke(&self, key: &str) -> Result<(), DriverError> {
        self.execute(&args(["press", "--key", key])).await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), DriverError> {
        self.execute(&args(["type", "--text", text])).await?;
        Ok(())
    }

    async fn extract_text(&self, query: &TextQuery) -> Result<TextExtraction, DriverError> {
        let mut command = args(["text", "--app", query.app.as_str()]);
        if let Some(root) = &query.subtree_root {
            command.push("--window".to_string());
            command.push(root.clone());
        }
        command.push("--max-depth".to_string());
        command.push(query.max_depth.to_string());
        self.call(&command).await
    }
}
