// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use super::{Link, LinkOperation};
use crate::storage::SessionStore;

/// Attaches the persisted session token as `authorization`.
///
/// The store is read on every request, so a token written by a resolver is
/// picked up by the next operation. Without a token the header is sent
/// empty.
#[derive(Debug, Clone)]
pub struct AuthLink {
    session: SessionStore,
}

impl AuthLink {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl Link for AuthLink {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn prepare(&self, operation: &mut LinkOperation) {
        let value = self
            .session
            .read()
            .map(|token| token.bearer())
            .unwrap_or_default();
        operation
            .headers
            .insert("authorization".to_string(), value);
    }
}
