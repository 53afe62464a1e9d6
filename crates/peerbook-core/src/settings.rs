//! Namespaced string settings persistence
//!
//! The registry persists through this narrow seam: string values by
//! namespace and key. The default backend is a TOML file with one table per
//! namespace. A memory-backed store is provided for tests and embedders
//! that manage durability themselves.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Namespaced key/value string store.
///
/// `get_string` returns `None` both for an absent key and for an unreadable
/// backend; mutations report backend failures so callers can log them.
pub trait SettingsStore: Send {
    fn get_string(&self, namespace: &str, key: &str) -> Option<String>;
    fn set_string(&mut self, namespace: &str, key: &str, value: &str)
        -> Result<(), SettingsError>;
    fn erase_key(&mut self, namespace: &str, key: &str) -> Result<(), SettingsError>;
}

/// Namespace tables of string keys, as stored on disk.
type Document = HashMap<String, HashMap<String, String>>;

/// TOML-file-backed settings store.
///
/// Holds no handle to the file and caches nothing: every operation re-reads
/// or rewrites the document, so there is no stale state across calls. A
/// missing file reads as an empty document.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Result<Document, SettingsError> {
        if !self.path.exists() {
            return Ok(Document::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn write_document(&self, document: &Document) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(document)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get_string(&self, namespace: &str, key: &str) -> Option<String> {
        match self.read_document() {
            Ok(document) => document.get(namespace)?.get(key).cloned(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to read settings");
                None
            }
        }
    }

    fn set_string(
        &mut self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        let mut document = self.read_document()?;
        document
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.write_document(&document)
    }

    fn erase_key(&mut self, namespace: &str, key: &str) -> Result<(), SettingsError> {
        let mut document = self.read_document()?;
        let Some(table) = document.get_mut(namespace) else {
            return Ok(());
        };
        if table.remove(key).is_none() {
            return Ok(());
        }
        if table.is_empty() {
            document.remove(namespace);
        }
        self.write_document(&document)
    }
}

/// Memory-backed settings store.
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// registry and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        self.values.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl SettingsStore for MemorySettings {
    fn get_string(&self, namespace: &str, key: &str) -> Option<String> {
        self.lock()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    fn set_string(
        &mut self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        self.lock()
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn erase_key(&mut self, namespace: &str, key: &str) -> Result<(), SettingsError> {
        self.lock()
            .remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }
}
