// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error types of the resolver layer and client assembly.

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::gateway::GatewayError;
use crate::resolvers::{HydrationStage, OperationKind};

/// A required operation argument was missing or empty.
///
/// Raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub operation: &'static str,
    pub argument: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub const fn missing(
        operation: &'static str,
        argument: &'static str,
        message: &'static str,
    ) -> Self {
        Self {
            operation,
            argument,
            message,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("no resolver for {kind} '{name}'")]
    UnknownOperation { kind: OperationKind, name: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// The token was obtained and stored but the profile could not be
    /// loaded. `stage` is the last stage reached.
    #[error("session hydration failed: {source}")]
    Hydration {
        stage: HydrationStage,
        #[source]
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ResolveError::Validation(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("resolver groups '{first}' and '{second}' both define {kind} '{name}'")]
    ResolverCollision {
        kind: OperationKind,
        name: &'static str,
        first: &'static str,
        second: &'static str,
    },
}
