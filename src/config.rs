//! # Service Configuration
//!
//! The server registry (`servers.json`) names which services run and where.
//! Every section is optional; a service only starts when its section exists.
//!
//! ```json
//! {
//!   "serial": { "host": "127.0.0.1", "port": 9100, "device": "/dev/ttyUSB0" },
//!   "print":  { "host": "127.0.0.1", "port": 19100 },
//!   "http":   { "host": "127.0.0.1", "port": 8080, "root": "./public",
//!               "timeout": 300000, "mime": { ".html": "text/html" } }
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::RelayError;

/// Default job timeout when `http.timeout` is omitted (milliseconds)
const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Serial line speed when `serial.baud` is omitted
const DEFAULT_BAUD: u32 = 9600;

/// Content type used when the MIME table has no `.txt` entry
pub const FALLBACK_CONTENT_TYPE: &str = "text/plain";

/// Top-level server registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesConfig {
    /// Serial-to-TCP bridge
    pub serial: Option<SerialConfig>,
    /// Diagnostic sink (virtual printer)
    pub print: Option<SinkConfig>,
    /// HTTP gateway
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Path to the serial device (e.g., "/dev/ttyUSB0")
    pub device: PathBuf,
    #[serde(default = "default_baud")]
    pub baud: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Directory served for GET requests
    pub root: PathBuf,
    /// Print job timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout: u64,
    /// File extension (with leading dot) to content type
    #[serde(default)]
    pub mime: HashMap<String, String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_baud() -> u32 {
    DEFAULT_BAUD
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ServicesConfig {
    /// Load the registry from a JSON file.
    ///
    /// Unlike the printer registry this is read once at startup, so a missing
    /// or malformed file is fatal.
    pub fn load(path: &Path) -> Result<Self, RelayError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
            .map_err(|e| RelayError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Content type for a request path, by extension.
    ///
    /// Unrecognized extensions get the table's `.txt` entry.
    pub fn content_type(&self, path: &str) -> &str {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e));
        ext.and_then(|e| self.mime.get(&e))
            .or_else(|| self.mime.get(".txt"))
            .map(String::as_str)
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SerialConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SinkConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
