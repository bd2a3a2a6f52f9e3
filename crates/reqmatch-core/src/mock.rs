//! In-memory text backend and document store for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, TextBackend};
use crate::corpus::DocumentStore;
use crate::CoreError;

/// A hand-rolled mock implementing [`TextBackend`] for tests.
///
/// Documents are keyed by file name (the last path component), so the same
/// mock works with [`MemoryStore`] and with a real [`crate::DirectoryStore`].
/// Unknown documents fail with [`BackendError::OpenError`].
#[derive(Default)]
pub struct MockBackend {
    documents: HashMap<String, Result<String, String>>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, name: &str, text: &str) -> Self {
        self.documents
            .insert(name.to_string(), Ok(text.to_string()));
        self
    }

    /// Make extraction of `name` fail with `message`.
    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.documents
            .insert(name.to_string(), Err(message.to_string()));
        self
    }

    /// Number of `extract_text` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextBackend for MockBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        match self.documents.get(name) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(BackendError::ExtractionError(message.clone())),
            None => Err(BackendError::OpenError(format!("no such document: {name}"))),
        }
    }
}

/// A fixed listing of document names; each resolves to a bare relative path.
pub struct MemoryStore {
    names: Vec<String>,
}

impl MemoryStore {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.names.clone())
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, CoreError> {
        if self.names.iter().any(|n| n == name) {
            Ok(PathBuf::from(name))
        } else {
            Err(CoreError::NotFound(name.to_string()))
        }
    }
}
