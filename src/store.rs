use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog;
use crate::config::CatalogFormat;
use crate::error::{Result, TrackerError};
use crate::models::{ProblemRecord, ProgressSet, TaskList, TaskRecord};

/// Persists the to-do list as `tasks.json`.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<TaskList> {
        let Some(text) = read_optional(&self.path)? else {
            return Ok(TaskList::default());
        };
        let records: Vec<TaskRecord> = decode(&self.path, &text)?;
        let list = TaskList::from_records(records);
        debug!(path = %self.path.display(), count = list.len(), "loaded tasks");
        Ok(list)
    }

    pub fn save(&self, list: &TaskList) -> Result<()> {
        write_json_atomic(&self.path, &list.to_records())?;
        debug!(path = %self.path.display(), count = list.len(), "saved tasks");
        Ok(())
    }
}

/// Persists completed problem ids as `user_progress.json`.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<ProgressSet> {
        let Some(text) = read_optional(&self.path)? else {
            return Ok(ProgressSet::new());
        };
        let progress: ProgressSet = decode(&self.path, &text)?;
        debug!(path = %self.path.display(), count = progress.len(), "loaded progress");
        Ok(progress)
    }

    pub fn save(&self, progress: &ProgressSet) -> Result<()> {
        write_json_atomic(&self.path, progress)?;
        debug!(path = %self.path.display(), count = progress.len(), "saved progress");
        Ok(())
    }
}

/// Read-only access to the problem catalog.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    format: CatalogFormat,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>, format: CatalogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<ProblemRecord>> {
        let Some(text) = read_optional(&self.path)? else {
            debug!(path = %self.path.display(), "no catalog file");
            return Ok(Vec::new());
        };
        let problems = match self.format {
            CatalogFormat::Json => catalog::parse_strict(&text)?,
            CatalogFormat::Relaxed => catalog::parse(&text)?,
        };
        debug!(path = %self.path.display(), count = problems.len(), "loaded catalog");
        Ok(problems)
    }
}

// Missing files, and files holding only whitespace, read as None.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(None),
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TrackerError::io(path, e)),
    }
}

fn decode<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        TrackerError::parse(format!("malformed data in {}: {}", path.display(), e), text)
    })
}

/// Write `value` as pretty JSON next to `path`, then rename it into place so
/// readers only ever see the old or the new contents.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value)
        .map_err(|e| TrackerError::parse(format!("failed to serialize: {}", e), ""))?;
    body.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| TrackerError::io(&dir, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let temp_path = dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let written = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(body.as_bytes())?;
            file.sync_all()
        })
        .map_err(|e| TrackerError::io(&temp_path, e))
        .and_then(|_| fs::rename(&temp_path, path).map_err(|e| TrackerError::io(path, e)));

    if written.is_err() {
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
            }
        }
    }
    written
}
