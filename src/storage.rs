use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Fieldwork, Permit, Task};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "LABTRACK_DATA_DIR";

const TASKS_FILE: &str = "tasks.json";
const PERMITS_FILE: &str = "permits.json";
const FIELDWORK_FILE: &str = "fieldwork.json";

/// JSON files holding tasks, permits and fieldwork, all in one directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens the store in the default data directory.
    ///
    /// The directory is determined in the following order:
    /// 1. `LABTRACK_DATA_DIR` environment variable.
    /// 2. `~/.local/share/labtrack` (on Linux).
    /// 3. `./labtrack` (fallback).
    pub fn open_default() -> Self {
        let dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("labtrack")
            });
        Self::at(dir)
    }

    /// Opens a store rooted at `dir`. Nothing is created until the first save.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads all tasks. A missing file is an empty list.
    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        load_records(&self.dir.join(TASKS_FILE))
    }

    /// Overwrites the task file with `tasks`.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        save_records(&self.dir, TASKS_FILE, tasks)
    }

    /// Loads a single task by its ID.
    pub fn load_task(&self, id: u64) -> Result<Task> {
        self.load_tasks()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound { kind: "task", id })
    }

    pub fn load_permits(&self) -> Result<Vec<Permit>> {
        load_records(&self.dir.join(PERMITS_FILE))
    }

    pub fn save_permits(&self, permits: &[Permit]) -> Result<()> {
        save_records(&self.dir, PERMITS_FILE, permits)
    }

    pub fn load_fieldwork(&self) -> Result<Vec<Fieldwork>> {
        load_records(&self.dir.join(FIELDWORK_FILE))
    }

    pub fn save_fieldwork(&self, trips: &[Fieldwork]) -> Result<()> {
        save_records(&self.dir, FIELDWORK_FILE, trips)
    }
}

/// Next free id: one past the largest in use.
pub fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no data file yet");
        return Ok(Vec::new());
    }
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut f = OpenOptions::new().read(true).open(path).map_err(io_err)?;
    let mut s = String::new();
    f.read_to_string(&mut s).map_err(io_err)?;
    let records: Vec<T> = serde_json::from_str(&s).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), count = records.len(), "loaded records");
    Ok(records)
}

fn save_records<T: Serialize>(dir: &Path, file: &str, records: &[T]) -> Result<()> {
    let path = dir.join(file);
    let io_err = |source| Error::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    let s = serde_json::to_string_pretty(records).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .map_err(io_err)?;
    f.write_all(s.as_bytes()).map_err(io_err)?;
    tracing::debug!(path = %path.display(), count = records.len(), "saved records");
    Ok(())
}
