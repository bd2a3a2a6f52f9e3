use std::io::Write;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::CoreError;

static FILENAME_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

/// Source of candidate documents for a comparison.
pub trait DocumentStore: Send + Sync {
    /// Document names in the store's enumeration order.
    fn list(&self) -> Result<Vec<String>, CoreError>;

    /// Map a document name to a path the text backend can open.
    fn resolve(&self, name: &str) -> Result<PathBuf, CoreError>;
}

/// Whether `name` carries the given extension (no leading dot), ignoring
/// ASCII case.
pub fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

/// Reduce an uploaded filename to a safe, flat ASCII name.
///
/// Unicode is NFKD-decomposed and non-ASCII dropped, path separators become
/// spaces, whitespace runs collapse to `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed, and leading/trailing `.`/`_` are stripped.
/// The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    FILENAME_STRIP_RE
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// A flat folder of documents on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the folder, creating it if missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            CoreError::io(format!("failed to create {}", root.display()), e)
        })?;
        Ok(Self { root })
    }

    /// Document names carrying `extension`, in listing order.
    pub fn documents(&self, extension: &str) -> Result<Vec<String>, CoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|name| has_extension(name, extension))
            .collect())
    }

    /// Write an uploaded document under its sanitized name and return that
    /// name. An existing document with the same name is replaced.
    pub fn store(&self, filename: &str, data: &[u8]) -> Result<String, CoreError> {
        let name = secure_filename(filename);
        if name.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "unusable filename: {filename:?}"
            )));
        }
        let dest = self.root.join(&name);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| CoreError::io("failed to create temp file", e))?;
        tmp.write_all(data)
            .map_err(|e| CoreError::io(format!("failed to write {name}"), e))?;
        tmp.persist(&dest)
            .map_err(|e| CoreError::io(format!("failed to store {name}"), e.error))?;

        tracing::info!(document = %name, bytes = data.len(), "stored document");
        Ok(name)
    }

    /// Remove a document from the folder.
    pub fn delete(&self, name: &str) -> Result<(), CoreError> {
        let path = self.resolve(name)?;
        std::fs::remove_file(&path)
            .map_err(|e| CoreError::io(format!("failed to delete {name}"), e))?;
        tracing::info!(document = %name, "deleted document");
        Ok(())
    }

    fn check_name(name: &str) -> Result<(), CoreError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(CoreError::InvalidInput(format!(
                "invalid document name: {name:?}"
            )));
        }
        Ok(())
    }
}

impl DocumentStore for DirectoryStore {
    /// Regular files in the folder, sorted by name so repeated runs list
    /// candidates identically.
    fn list(&self) -> Result<Vec<String>, CoreError> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| CoreError::io(format!("failed to list {}", self.root.display()), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| CoreError::io(format!("failed to list {}", self.root.display()), e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::debug!(name = ?raw, "ignoring non-UTF-8 filename");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, CoreError> {
        Self::check_name(name)?;
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(CoreError::NotFound(name.to_string()));
        }
        Ok(path)
    }
}
