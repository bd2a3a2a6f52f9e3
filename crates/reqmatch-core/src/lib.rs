use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod corpus;
pub mod history;
pub mod matching;
pub mod mock;
pub mod orchestrator;
pub mod requirements;

// Re-export for convenience
pub use backend::{BackendError, TextBackend};
pub use corpus::{DirectoryStore, DocumentStore, has_extension, secure_filename};
pub use history::HistoryStore;
pub use matching::{MatchCount, coverage_percentage, match_requirements};
pub use orchestrator::{CompareOptions, Comparator};
pub use requirements::extract_requirements;

/// Coverage of one candidate document against a reference's requirements.
///
/// Serialized with the short field names used by the history file
/// (`filename`, `matched`, `total`, `match_percentage`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(rename = "filename")]
    pub document_name: String,
    #[serde(rename = "matched")]
    pub matched_count: usize,
    #[serde(rename = "total")]
    pub total_requirements: usize,
    pub match_percentage: f64,
}

impl ComparisonResult {
    pub fn new(document_name: impl Into<String>, count: MatchCount) -> Self {
        Self {
            document_name: document_name.into(),
            matched_count: count.matched,
            total_requirements: count.total,
            match_percentage: count.percentage(),
        }
    }
}

/// A candidate that could not be scored because its text was unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub filename: String,
    pub error: String,
}

/// Outcome of comparing one reference document against a corpus.
///
/// `results` keeps the order in which the corpus listed its candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRun {
    pub reference: String,
    pub created_at: DateTime<Utc>,
    /// Requirements extracted from the reference, independent of how many
    /// candidates were scored.
    #[serde(default)]
    pub requirements: usize,
    pub results: Vec<ComparisonResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedCandidate>,
}

impl ComparisonRun {
    pub fn new(
        reference: impl Into<String>,
        requirements: usize,
        results: Vec<ComparisonResult>,
        skipped: Vec<SkippedCandidate>,
    ) -> Self {
        Self {
            reference: reference.into(),
            created_at: Utc::now(),
            requirements,
            results,
            skipped,
        }
    }
}

/// Progress events emitted while a comparison runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        reference: String,
        requirements: usize,
        candidates: usize,
    },
    Checking {
        index: usize,
        total: usize,
        name: String,
    },
    Result {
        index: usize,
        total: usize,
        result: ComparisonResult,
    },
    Skipped {
        index: usize,
        total: usize,
        name: String,
        error: String,
    },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to extract text from {document}: {source}")]
    Extraction {
        document: String,
        #[source]
        source: BackendError,
    },
    #[error("history file {} is corrupt: {source}", path.display())]
    DataCorruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CoreError::Io {
            context: context.into(),
            source,
        }
    }
}

/// What to do when a candidate's text cannot be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the candidate as skipped and keep going.
    #[default]
    Skip,
    /// Fail the whole run.
    Abort,
}

pub const DEFAULT_UPLOAD_DIR: &str = "./uploaded_docs";
pub const DEFAULT_HISTORY_PATH: &str = "./results.json";
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_EXTENSION: &str = "pdf";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub upload_dir: PathBuf,
    pub history_path: PathBuf,
    /// Candidate file extension, without the leading dot.
    pub extension: String,
    pub failure_policy: FailurePolicy,
    /// Whether the reference document is scored against itself when it
    /// lives in the corpus folder.
    pub include_reference: bool,
    pub bind: String,
    /// Append every web comparison to the history file.
    pub auto_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            extension: DEFAULT_EXTENSION.to_string(),
            failure_policy: FailurePolicy::Skip,
            include_reference: true,
            bind: DEFAULT_BIND.to_string(),
            auto_save: true,
        }
    }
}

impl Config {
    /// Resolve configuration: env vars > config file > defaults.
    pub fn resolve(file: &config_file::ConfigFile) -> Self {
        Self::resolve_with(file, |key| std::env::var(key).ok())
    }

    /// Like [`Config::resolve`], with an explicit environment lookup.
    pub fn resolve_with(
        file: &config_file::ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let defaults = Config::default();
        let storage = file.storage.clone().unwrap_or_default();
        let comparison = file.comparison.clone().unwrap_or_default();
        let server = file.server.clone().unwrap_or_default();

        Self {
            upload_dir: env("REQMATCH_UPLOAD_DIR")
                .or(storage.upload_dir)
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            history_path: env("REQMATCH_HISTORY_PATH")
                .or(storage.history_path)
                .map(PathBuf::from)
                .unwrap_or(defaults.history_path),
            extension: comparison
                .extension
                .map(|e| e.trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .unwrap_or(defaults.extension),
            failure_policy: comparison.failure_policy.unwrap_or(defaults.failure_policy),
            include_reference: comparison
                .include_reference
                .unwrap_or(defaults.include_reference),
            bind: env("REQMATCH_BIND")
                .or(server.bind)
                .unwrap_or(defaults.bind),
            auto_save: server.auto_save.unwrap_or(defaults.auto_save),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::{ComparisonConfig, ConfigFile, ServerConfig, StorageConfig};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::resolve_with(&ConfigFile::default(), no_env);
        assert_eq!(config.upload_dir, PathBuf::from("./uploaded_docs"));
        assert_eq!(config.history_path, PathBuf::from("./results.json"));
        assert_eq!(config.extension, "pdf");
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert!(config.include_reference);
        assert!(config.auto_save);
    }

    #[test]
    fn file_values_override_defaults() {
        let file = ConfigFile {
            storage: Some(StorageConfig {
                upload_dir: Some("/srv/docs".into()),
                history_path: None,
            }),
            comparison: Some(ComparisonConfig {
                extension: Some(".PDF".into()),
                failure_policy: Some(FailurePolicy::Abort),
                include_reference: Some(false),
            }),
            server: Some(ServerConfig {
                bind: Some("127.0.0.1:8080".into()),
                auto_save: Some(false),
            }),
        };
        let config = Config::resolve_with(&file, no_env);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/docs"));
        assert_eq!(config.history_path, PathBuf::from("./results.json"));
        assert_eq!(config.extension, "PDF");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(!config.include_reference);
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert!(!config.auto_save);
    }

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            storage: Some(StorageConfig {
                upload_dir: Some("/from/file".into()),
                history_path: Some("/from/file.json".into()),
            }),
            ..Default::default()
        };
        let config = Config::resolve_with(&file, |key| match key {
            "REQMATCH_UPLOAD_DIR" => Some("/from/env".into()),
            _ => None,
        });
        assert_eq!(config.upload_dir, PathBuf::from("/from/env"));
        assert_eq!(config.history_path, PathBuf::from("/from/file.json"));
    }

    #[test]
    fn result_serializes_with_history_field_names() {
        let result = ComparisonResult::new("a.pdf", MatchCount { matched: 1, total: 4 });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["filename"], "a.pdf");
        assert_eq!(json["matched"], 1);
        assert_eq!(json["total"], 4);
        assert_eq!(json["match_percentage"], 25.0);
    }

    #[test]
    fn run_omits_empty_skipped_list() {
        let run = ComparisonRun::new("ref.pdf", 3, vec![], vec![]);
        let json = serde_json::to_value(&run).unwrap();
        assert!(json.get("skipped").is_none());
        assert_eq!(json["requirements"], 3);

        let parsed: ComparisonRun = serde_json::from_value(json).unwrap();
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn run_without_requirement_count_still_loads() {
        let json = r#"{"reference":"ref.pdf","created_at":"2024-05-01T12:00:00Z","results":[]}"#;
        let run: ComparisonRun = serde_json::from_str(json).unwrap();
        assert_eq!(run.requirements, 0);
    }
}
