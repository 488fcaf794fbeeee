// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Storage
//!
//! Persists the session token between runs. The store lives in a single
//! directory (see [`crate::config::SESSION_DIR_ENV`]):
//!
//! ```text
//! <session_dir>/
//!   session.json   # {"jwtToken": "..."}
//! ```
//!
//! ## Availability
//!
//! The directory is probed once, when the store is opened. If no directory
//! is configured or the probe fails (read-only mount, permissions), the
//! store is *unavailable*: every read yields `None` and every write is a
//! no-op. Unavailability is a capability, not an error, and is never
//! surfaced to callers.

pub mod paths;
pub mod session_store;

pub use paths::StoragePaths;
pub use session_store::{SessionStore, StorageError, StorageResult};
