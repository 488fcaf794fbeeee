// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Two-stage session hydration.
//!
//! ```text
//! token ──authenticate──▶ Authenticated(token) ──hydrate──▶ Hydrated(profile)
//! ```
//!
//! `authenticate` mirrors the token into the cache (`jwtToken`), the
//! session store and the gateway's default header, in that order, before
//! any profile request is made. `hydrate` fetches `GET /users` and writes
//! the profile as `currentUser`. When the profile stage fails the error
//! carries the `Authenticated` stage: the token is in place, the profile
//! is not.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::documents::{CURRENT_USER_QUERY, JWT_TOKEN_FIELD};
use super::CacheBridge;
use crate::cache::TYPENAME;
use crate::error::ResolveError;
use crate::gateway::GatewayResponse;
use crate::models::{id_key, SessionToken, UserProfile, USER_TYPENAME};

#[derive(Debug, Clone, PartialEq)]
pub enum HydrationStage {
    /// Token stored and mirrored; profile not loaded yet.
    Authenticated(SessionToken),
    /// Profile loaded and written as the current user.
    Hydrated(UserProfile),
}

impl HydrationStage {
    pub fn token(&self) -> Option<&SessionToken> {
        match self {
            HydrationStage::Authenticated(token) => Some(token),
            HydrationStage::Hydrated(_) => None,
        }
    }
}

impl CacheBridge {
    /// Stage one: make `token` the active session token.
    pub fn authenticate(&self, token: SessionToken) -> HydrationStage {
        let mut data = Map::new();
        data.insert(
            JWT_TOKEN_FIELD.to_string(),
            Value::String(token.as_str().to_string()),
        );
        self.cache.write_data(data);
        self.session.write(&token);
        self.gateway.set_auth_header(Some(&token));

        debug!("Session token updated");
        HydrationStage::Authenticated(token)
    }

    /// Stage two: load the profile for an authenticated session.
    pub async fn hydrate(&self, stage: HydrationStage) -> Result<UserProfile, ResolveError> {
        let token = match stage {
            HydrationStage::Hydrated(profile) => return Ok(profile),
            HydrationStage::Authenticated(token) => token,
        };

        match self.load_current_user().await {
            Ok(profile) => {
                info!(user_id = %profile.id, "Current user hydrated");
                Ok(profile)
            }
            Err(source) => Err(ResolveError::Hydration {
                stage: HydrationStage::Authenticated(token),
                source: Box::new(source),
            }),
        }
    }

    /// Both stages, starting from a sign-in or confirmation response.
    pub(crate) async fn establish_session(
        &self,
        response: GatewayResponse,
    ) -> Result<UserProfile, ResolveError> {
        let token = token_from(response.data)?;
        let stage = self.authenticate(token);
        self.hydrate(stage).await
    }

    async fn load_current_user(&self) -> Result<UserProfile, ResolveError> {
        let response = self.gateway.get(&["users"], &[]).await?;
        self.write_current_user(response.data)
    }

    /// Write `data` as the current user, replacing the previous one.
    fn write_current_user(&self, data: Value) -> Result<UserProfile, ResolveError> {
        let Value::Object(mut record) = data else {
            return Err(ResolveError::InvalidResponse(
                "user profile is not an object".to_string(),
            ));
        };
        record.insert(
            TYPENAME.to_string(),
            Value::String(USER_TYPENAME.to_string()),
        );

        let profile: UserProfile = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|e| ResolveError::InvalidResponse(format!("user profile: {e}")))?;
        if id_key(&profile.id).is_none() {
            return Err(ResolveError::InvalidResponse(
                "user profile has no id".to_string(),
            ));
        }

        let previous = self.cache.root_reference(CURRENT_USER_QUERY.root_field);
        let mut data = Map::new();
        data.insert(
            CURRENT_USER_QUERY.root_field.to_string(),
            Value::Object(record),
        );
        self.cache
            .write_query(&CURRENT_USER_QUERY, Value::Object(data))?;
        let current = self.cache.root_reference(CURRENT_USER_QUERY.root_field);

        if let Some(previous) = previous {
            if current.as_deref() != Some(previous.as_str()) {
                self.cache.evict(&previous);
            }
        }

        Ok(profile)
    }
}

/// Token carried by a sign-in or confirmation response body.
fn token_from(data: Value) -> Result<SessionToken, ResolveError> {
    match data {
        Value::String(raw) => SessionToken::new(raw),
        _ => None,
    }
    .ok_or_else(|| ResolveError::InvalidResponse("response did not contain a token".to_string()))
}
