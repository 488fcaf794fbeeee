// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed session token store.
//!
//! The store holds exactly one key, `jwtToken`. Writes go through a temp
//! file and an atomic rename so a crash never leaves a half-written record.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::StoragePaths;
use crate::models::SessionToken;

/// Error type for session file operations.
///
/// Only used internally and in diagnostics: the public `read`/`write`
/// surface never fails.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations
    Io(io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// Probe data did not round-trip
    ProbeMismatch,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Json(e) => write!(f, "JSON error: {e}"),
            StorageError::ProbeMismatch => write!(f, "probe data mismatch"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Json(e) => Some(e),
            StorageError::ProbeMismatch => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// On-disk record.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(rename = "jwtToken", default, skip_serializing_if = "Option::is_none")]
    jwt_token: Option<String>,
}

/// Persisted session token storage.
///
/// Cheap to clone; clones share the same directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    paths: Option<StoragePaths>,
}

impl SessionStore {
    /// Open the store at `dir`, probing it for read/write access.
    ///
    /// Returns an unavailable store when the probe fails.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let paths = StoragePaths::new(dir);
        match probe(&paths) {
            Ok(()) => {
                debug!(dir = %paths.root().display(), "Session storage available");
                Self { paths: Some(paths) }
            }
            Err(e) => {
                warn!(
                    dir = %paths.root().display(),
                    error = %e,
                    "Session storage unavailable, running without persistence"
                );
                Self::unavailable()
            }
        }
    }

    /// Open the configured directory, or an unavailable store if none.
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::open(dir),
            None => Self::unavailable(),
        }
    }

    /// A store without persistence: reads are empty, writes are dropped.
    pub fn unavailable() -> Self {
        Self { paths: None }
    }

    pub fn is_available(&self) -> bool {
        self.paths.is_some()
    }

    /// Read the persisted token, if any.
    pub fn read(&self) -> Option<SessionToken> {
        let paths = self.paths.as_ref()?;
        let path = paths.session_file();
        match read_record(&path) {
            Ok(record) => record.jwt_token.and_then(SessionToken::new),
            Err(StorageError::Io(e)) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    /// Persist `token`, replacing any previous one.
    pub fn write(&self, token: &SessionToken) {
        let Some(paths) = self.paths.as_ref() else {
            return;
        };
        let record = SessionRecord {
            jwt_token: Some(token.as_str().to_string()),
        };
        if let Err(e) = write_record(&paths.session_file(), &record) {
            warn!(error = %e, "Failed to persist session token");
        }
    }
}

/// Write/read/delete round trip on the probe file.
fn probe(paths: &StoragePaths) -> StorageResult<()> {
    fs::create_dir_all(paths.root())?;

    let probe_file = paths.probe_file();
    let probe_data = b"notus-session-probe";
    fs::write(&probe_file, probe_data)?;
    let read_back = fs::read(&probe_file)?;
    fs::remove_file(&probe_file)?;

    if read_back != probe_data {
        return Err(StorageError::ProbeMismatch);
    }
    Ok(())
}

fn read_record(path: &Path) -> StorageResult<SessionRecord> {
    let file = File::open(path)?;
    let record = serde_json::from_reader(BufReader::new(file))?;
    Ok(record)
}

fn write_record(path: &Path, record: &SessionRecord) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record)?;
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
