//! # Printer Configuration
//!
//! One entry of the printer registry: where the printer lives and how
//! documents for it are rendered.
//!
//! ## Registry Entry
//!
//! ```json
//! {
//!   "kitchen": { "host": "192.168.1.40", "port": 9100, "cpl": 42, "command": "starprnt" },
//!   "bar":     { "asImage": true }
//! }
//! ```
//!
//! Missing fields take their defaults:
//!
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | host | `127.0.0.1` | Printer address |
//! | port | `19100` | Printer TCP port |
//! | asImage | `false` | Print the whole receipt as one raster image |
//! | cpl | `48` | Characters per line |
//! | command | `escpos` | Command set: `escpos`, `starprnt`, `svg` |
//! | cutting | `true` | Cut paper at `=` rows |

use serde::{Deserialize, Serialize};

/// Default printer host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default printer port (the diagnostic sink's usual port)
pub const DEFAULT_PORT: u16 = 19100;

/// Default characters per line (80mm paper, font A)
pub const DEFAULT_CPL: u16 = 48;

/// Printer command language produced by the transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSet {
    /// Epson ESC/POS
    #[default]
    EscPos,
    /// Star Micronics StarPRNT
    StarPrnt,
    /// SVG preview instead of printer commands
    Svg,
}

impl CommandSet {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "escpos" => Some(Self::EscPos),
            "starprnt" => Some(Self::StarPrnt),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

/// Display options handed to the transformer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Characters per line
    pub cpl: u16,
    pub command: CommandSet,
    /// Whether `=` rows cut the paper (otherwise they only feed)
    pub cutting: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            cpl: DEFAULT_CPL,
            command: CommandSet::default(),
            cutting: true,
        }
    }
}

impl PrintOptions {
    /// Same options, different command set.
    pub fn with_command(&self, command: CommandSet) -> Self {
        Self {
            command,
            ..self.clone()
        }
    }

    /// Printable width in dots (12-dot cells)
    pub fn width_dots(&self) -> u32 {
        self.cpl as u32 * 12
    }
}

/// # Printer Configuration
///
/// Connection parameters plus pass-through print options. Immutable once
/// loaded from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Render through the rasterizer and send the receipt as one image
    #[serde(default)]
    pub as_image: bool,

    #[serde(flatten)]
    pub options: PrintOptions,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            as_image: false,
            options: PrintOptions::default(),
        }
    }
}

impl PrinterConfig {
    /// Printer at `host:port` with default options
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Default::default()
        }
    }

    /// `host:port` string used for connecting and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entry_uses_defaults() {
        let config: PrinterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PrinterConfig::default());
        assert_eq!(config.addr(), "127.0.0.1:19100");
    }

    #[test]
    fn test_full_entry() {
        let config: PrinterConfig = serde_json::from_str(
            r#"{"host": "10.0.0.5", "port": 9100, "asImage": true,
                "cpl": 42, "command": "starprnt", "cutting": false}"#,
        )
        .unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 9100);
        assert!(config.as_image);
        assert_eq!(config.options.cpl, 42);
        assert_eq!(config.options.command, CommandSet::StarPrnt);
        assert!(!config.options.cutting);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config: PrinterConfig =
            serde_json::from_str(r#"{"port": 9100, "upsideDown": true, "spacing": 1}"#).unwrap();
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_with_command_keeps_other_options() {
        let options = PrintOptions {
            cpl: 32,
            command: CommandSet::StarPrnt,
            cutting: false,
        };
        let svg = options.with_command(CommandSet::Svg);
        assert_eq!(svg.command, CommandSet::Svg);
        assert_eq!(svg.cpl, 32);
        assert!(!svg.cutting);
    }

    #[test]
    fn test_command_set_parse() {
        assert_eq!(CommandSet::parse("ESCPOS"), Some(CommandSet::EscPos));
        assert_eq!(CommandSet::parse("svg"), Some(CommandSet::Svg));
        assert_eq!(CommandSet::parse("zpl"), None);
    }
}
