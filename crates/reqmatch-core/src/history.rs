use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{ComparisonRun, CoreError};

/// Append-only history of comparison runs, persisted as one JSON file.
///
/// Every save rewrites the whole file: the new history is written to a temp
/// file next to the target and renamed into place, so readers see either the
/// old or the new file and never a partial write.
///
/// Saves hold an exclusive OS lock on a sidecar `<history>.lock` file for the
/// whole load-append-write, so separate stores and separate processes (the
/// web server and the CLI) pointing at one history never drop each other's
/// runs.
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("path", &self.path)
            .finish()
    }
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all saved runs, oldest first. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<ComparisonRun>, CoreError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CoreError::io(
                    format!("failed to open {}", self.path.display()),
                    e,
                ));
            }
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            CoreError::DataCorruption {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Append `run` to the history.
    pub fn save(&self, run: &ComparisonRun) -> Result<(), CoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let dir = self.dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| CoreError::io(format!("failed to create {}", dir.display()), e))?;

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| CoreError::io(format!("failed to open {}", lock_path.display()), e))?;
        let mut file_lock = fd_lock::RwLock::new(lock_file);
        let _file_guard = file_lock
            .write()
            .map_err(|e| CoreError::io(format!("failed to lock {}", lock_path.display()), e))?;

        let mut history = self.load()?;
        history.push(run.clone());
        self.write_all(&history)?;

        tracing::info!(
            path = %self.path.display(),
            reference = %run.reference,
            runs = history.len(),
            "saved comparison run"
        );
        Ok(())
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Caller holds both the in-process and the file lock.
    fn write_all(&self, history: &[ComparisonRun]) -> Result<(), CoreError> {
        let tmp = tempfile::NamedTempFile::new_in(self.dir())
            .map_err(|e| CoreError::io("failed to create temp history file", e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, history).map_err(|e| {
                CoreError::io("failed to serialize history", std::io::Error::other(e))
            })?;
            writer
                .write_all(b"\n")
                .and_then(|_| writer.flush())
                .map_err(|e| CoreError::io("failed to write history", e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| CoreError::io("failed to sync history", e))?;
        tmp.persist(&self.path).map_err(|e| {
            CoreError::io(
                format!("failed to replace {}", self.path.display()),
                e.error,
            )
        })?;
        Ok(())
    }
}
