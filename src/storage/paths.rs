// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the session directory layout.

use std::path::{Path, PathBuf};

/// File name of the persisted session record.
pub const SESSION_FILE: &str = "session.json";

/// File used by the write/read/delete capability probe.
const PROBE_FILE: &str = ".probe";

/// Storage path utilities for the session directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root of the session directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the persisted session record.
    pub fn session_file(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    pub fn probe_file(&self) -> PathBuf {
        self.root.join(PROBE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_paths_live_under_root() {
        let paths = StoragePaths::new("/tmp/notus");
        assert_eq!(paths.root(), Path::new("/tmp/notus"));
        assert_eq!(paths.session_file(), PathBuf::from("/tmp/notus/session.json"));
        assert_eq!(paths.probe_file(), PathBuf::from("/tmp/notus/.probe"));
    }
}
