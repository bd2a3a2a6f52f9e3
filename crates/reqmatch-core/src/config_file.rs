use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::FailurePolicy;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub storage: Option<StorageConfig>,
    pub comparison: Option<ComparisonConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: Option<String>,
    pub history_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub extension: Option<String>,
    pub failure_policy: Option<FailurePolicy>,
    pub include_reference: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub auto_save: Option<bool>,
}

/// Platform config directory path: `<config_dir>/reqmatch/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reqmatch").join("config.toml"))
}

/// Load config by cascading CWD `.reqmatch.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".reqmatch.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_storage = base.storage.unwrap_or_default();
    let over_storage = overlay.storage.unwrap_or_default();
    let base_cmp = base.comparison.unwrap_or_default();
    let over_cmp = overlay.comparison.unwrap_or_default();
    let base_server = base.server.unwrap_or_default();
    let over_server = overlay.server.unwrap_or_default();

    ConfigFile {
        storage: Some(StorageConfig {
            upload_dir: over_storage.upload_dir.or(base_storage.upload_dir),
            history_path: over_storage.history_path.or(base_storage.history_path),
        }),
        comparison: Some(ComparisonConfig {
            extension: over_cmp.extension.or(base_cmp.extension),
            failure_policy: over_cmp.failure_policy.or(base_cmp.failure_policy),
            include_reference: over_cmp.include_reference.or(base_cmp.include_reference),
        }),
        server: Some(ServerConfig {
            bind: over_server.bind.or(base_server.bind),
            auto_save: over_server.auto_save.or(base_server.auto_save),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_toml() {
        let toml_str = "[comparison]\nfailure_policy = \"abort\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert!(parsed.storage.is_none());
        let cmp = parsed.comparison.unwrap();
        assert_eq!(cmp.failure_policy, Some(FailurePolicy::Abort));
        assert!(cmp.extension.is_none());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let toml_str = "[comparison]\nfailure_policy = \"retry\"\n";
        assert!(toml::from_str::<ConfigFile>(toml_str).is_err());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            storage: Some(StorageConfig {
                upload_dir: Some("/base/docs".to_string()),
                history_path: Some("/base/results.json".to_string()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            storage: Some(StorageConfig {
                upload_dir: Some("/overlay/docs".to_string()),
                history_path: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let storage = merged.storage.unwrap();
        assert_eq!(storage.upload_dir.unwrap(), "/overlay/docs");
        assert_eq!(storage.history_path.unwrap(), "/base/results.json");
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            server: Some(ServerConfig {
                bind: Some("127.0.0.1:9000".to_string()),
                auto_save: Some(false),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        let server = merged.server.unwrap();
        assert_eq!(server.bind.unwrap(), "127.0.0.1:9000");
        assert_eq!(server.auto_save, Some(false));
    }

    #[test]
    fn load_from_path_tolerates_missing_and_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[storage\nupload_dir = ").unwrap();
        assert!(load_from_path(&bad).is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[storage]\nupload_dir = \"/docs\"\n").unwrap();
        let cfg = load_from_path(&good).unwrap();
        assert_eq!(cfg.storage.unwrap().upload_dir.unwrap(), "/docs");
    }
}
