// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Models
//!
//! Data structures exchanged with the Notus REST API and written into the
//! local cache. Fields the client does not interpret are kept in `extra` so
//! the cache records stay a faithful projection of the API response.
//!
//! ## Model Categories
//!
//! - **Session**: the bearer token identifying the signed-in user
//! - **Users**: the current user's profile
//! - **Dapp Users**: end users registered against a dapp

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Session Token
// =============================================================================

/// Opaque bearer credential returned by sign-in and confirmation.
///
/// `Debug` redacts the value so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token. Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(SessionToken(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// =============================================================================
// Users
// =============================================================================

/// Cache type discriminator for the current user.
pub const USER_TYPENAME: &str = "User";

/// Cache type discriminator for dapp users.
pub const DAPP_USER_TYPENAME: &str = "DappUser";

/// Profile of the signed-in user as returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Value,
    #[serde(default)]
    pub email: Option<String>,
    /// When the user confirmed their account, if they have.
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dapp user as returned by `GET /dapp-users/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DappUser {
    pub id: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Render an id the way the cache keys it: strings verbatim, numbers in
/// their JSON form.
pub fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
