//! The persistence port: read and write whole JSON documents by key.

use crate::error::{DeskError, DeskResult};
use std::collections::HashMap;

pub trait KeyValuePort: Send {
    /// The stored document for `key`, or `None` if nothing was ever written.
    fn read(&self, key: &str) -> DeskResult<Option<String>>;

    /// Replace the document for `key`.
    fn write(&mut self, key: &str, document: &str) -> DeskResult<()>;
}

/// In-process port. Used in tests and for throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryPort {
    documents: HashMap<String, String>,
    read_only: bool,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, which need not be valid JSON.
    pub fn with_document(mut self, key: &str, document: &str) -> Self {
        self.documents.insert(key.to_string(), document.to_string());
        self
    }

    /// A port whose writes always fail.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn document(&self, key: &str) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }
}

impl KeyValuePort for MemoryPort {
    fn read(&self, key: &str) -> DeskResult<Option<String>> {
        Ok(self.documents.get(key).cloned())
    }

    fn write(&mut self, key: &str, document: &str) -> DeskResult<()> {
        if self.read_only {
            return Err(DeskError::Other(anyhow::anyhow!(
                "memory port is read-only, cannot write '{key}'"
            )));
        }
        self.documents.insert(key.to_string(), document.to_string());
        Ok(())
    }
}
