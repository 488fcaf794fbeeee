// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Assembly
//!
//! [`NotusClient::assemble`] wires every component together and restores a
//! persisted session before returning, so the first caller never sees a
//! signed-out client for a session that is still valid.
//!
//! ## Assembly order
//!
//! 1. cache and REST gateway
//! 2. resolver table (metadata + notus groups, collisions rejected)
//! 3. session store (capability probe)
//! 4. link chain: error -> auth -> HTTP transport (`<API_BASE>/graphql`)
//! 5. rehydration from the stored token, if any

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::cache::Cache;
use crate::config::ClientConfig;
use crate::error::{ClientError, ResolveError};
use crate::gateway::{GatewayResponse, RestGateway};
use crate::link::{
    AuthLink, ErrorLink, GraphqlRequest, GraphqlResponse, HttpTransport, LinkChain, LinkError,
};
use crate::models::{DappUser, UserProfile};
use crate::resolvers::{CacheBridge, OperationRequest, ResolverTable};
use crate::storage::SessionStore;

/// Outcome of the startup rehydration.
#[derive(Debug, Clone, PartialEq)]
pub enum Rehydration {
    /// No token was stored.
    ColdStart,
    /// The stored token was valid and the profile is cached.
    Restored(UserProfile),
    /// The stored token could not be used; the client starts signed out.
    Failed,
}

/// Assembled client. Cheap to clone; clones share every component.
#[derive(Debug, Clone)]
pub struct NotusClient {
    bridge: CacheBridge,
    resolvers: Arc<ResolverTable>,
    links: Arc<LinkChain>,
    rehydration: Rehydration,
}

impl NotusClient {
    pub async fn assemble(config: ClientConfig) -> Result<Self, ClientError> {
        let cache = Cache::new();
        let gateway = RestGateway::new(config.api_uri.as_str(), config.http_timeout)?;
        let resolvers = ResolverTable::standard()?;
        let session = SessionStore::from_dir(config.session_dir.as_deref());

        let transport = HttpTransport::new(
            gateway.http().clone(),
            gateway.endpoint(&["graphql"])?.as_str(),
        );
        let links = LinkChain::new(transport)
            .with(ErrorLink)
            .with(AuthLink::new(session.clone()));

        let bridge = CacheBridge::new(cache, gateway, session);
        let rehydration = rehydrate(&bridge).await;

        info!(
            api_uri = %config.api_uri,
            persistent_session = bridge.session().is_available(),
            resolvers = resolvers.len(),
            "Notus client assembled"
        );

        Ok(Self {
            bridge,
            resolvers: Arc::new(resolvers),
            links: Arc::new(links),
            rehydration,
        })
    }

    /// Assemble from the `NOTUS_*` environment variables.
    pub async fn from_env() -> Result<Self, ClientError> {
        let config = ClientConfig::from_env()?;
        Self::assemble(config).await
    }

    pub fn rehydration(&self) -> &Rehydration {
        &self.rehydration
    }

    pub fn bridge(&self) -> &CacheBridge {
        &self.bridge
    }

    pub fn cache(&self) -> &Cache {
        self.bridge.cache()
    }

    pub fn gateway(&self) -> &RestGateway {
        self.bridge.gateway()
    }

    pub fn session(&self) -> &SessionStore {
        self.bridge.session()
    }

    pub fn resolvers(&self) -> &ResolverTable {
        &self.resolvers
    }

    /// Resolve a named local operation.
    pub async fn execute(&self, request: OperationRequest) -> Result<Value, ResolveError> {
        let operation = self.resolvers.resolve(&request)?;
        self.bridge.execute(operation).await
    }

    /// Send a server-side GraphQL operation through the link chain.
    pub async fn query_remote(&self, request: GraphqlRequest) -> Result<GraphqlResponse, LinkError> {
        self.links.execute(request).await
    }

    pub fn current_user(&self) -> Option<Value> {
        self.bridge.current_user()
    }

    pub fn jwt_token(&self) -> Option<String> {
        self.bridge.jwt_token()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, ResolveError> {
        self.bridge.sign_in(email, password).await
    }

    pub async fn confirm_user(
        &self,
        one_time_key: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, ResolveError> {
        self.bridge.confirm_user(one_time_key, password).await
    }

    pub async fn confirm_dapp_user(
        &self,
        request_key: &str,
    ) -> Result<GatewayResponse, ResolveError> {
        self.bridge.confirm_dapp_user(request_key).await
    }

    pub async fn dapp_user(&self, dapp_user_id: &str) -> Result<DappUser, ResolveError> {
        self.bridge.dapp_user(dapp_user_id).await
    }
}

/// Restore the stored session. A failure leaves the client in the same
/// state as a cold start; the stored token is left for the next sign-in to
/// overwrite.
async fn rehydrate(bridge: &CacheBridge) -> Rehydration {
    let Some(token) = bridge.session().read() else {
        return Rehydration::ColdStart;
    };

    let stage = bridge.authenticate(token);
    match bridge.hydrate(stage).await {
        Ok(profile) => {
            info!(user_id = %profile.id, "Session restored from storage");
            Rehydration::Restored(profile)
        }
        Err(e) => {
            warn!(error = %e, "Stored session could not be restored");
            bridge.cache().reset();
            bridge.gateway().set_auth_header(None);
            Rehydration::Failed
        }
    }
}
