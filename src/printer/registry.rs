//! Printer registry (`printers.json`), re-read for every job submission.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use super::config::PrinterConfig;
use crate::error::RelayError;

/// Printer id to configuration.
#[derive(Debug, Clone, Default)]
pub struct PrinterRegistry {
    printers: HashMap<String, PrinterConfig>,
}

impl PrinterRegistry {
    /// Read the registry from disk.
    ///
    /// An unreadable file is an error. Unparsable content is logged and
    /// yields an empty registry, so every lookup reports "not found".
    pub async fn load(path: &Path) -> Result<Self, RelayError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RelayError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self::parse_lenient(&text, path))
    }

    fn parse_lenient(text: &str, path: &Path) -> Self {
        match serde_json::from_str(text) {
            Ok(printers) => Self { printers },
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "printer registry is malformed, treating it as empty"
                );
                Self::default()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&PrinterConfig> {
        self.printers.get(id)
    }

    pub fn len(&self) -> usize {
        self.printers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }
}

impl FromIterator<(String, PrinterConfig)> for PrinterRegistry {
    fn from_iter<I: IntoIterator<Item = (String, PrinterConfig)>>(iter: I) -> Self {
        Self {
            printers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_registry() {
        let file = registry_file(r#"{"front": {"port": 9100}, "back": {"host": "10.0.0.2"}}"#);
        let registry = PrinterRegistry::load(file.path()).await.unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("front").unwrap().port, 9100);
        assert_eq!(registry.get("back").unwrap().host, "10.0.0.2");
        assert!(registry.get("side").is_none());
    }

    #[tokio::test]
    async fn test_malformed_registry_is_empty() {
        let file = registry_file("{ not json");
        let registry = PrinterRegistry::load(file.path()).await.unwrap();
        assert!(registry.is_empty());
        assert!(registry.get("front").is_none());
    }

    #[tokio::test]
    async fn test_missing_registry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PrinterRegistry::load(&dir.path().join("printers.json")).await;
        assert!(matches!(result, Err(RelayError::Config(_))));
    }
}
