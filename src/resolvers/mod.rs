// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Cache Bridge
//!
//! Local operations resolved against the Notus REST API and written into
//! the normalized cache.
//!
//! ## Dispatch
//!
//! Callers either build an [`Operation`] directly (its constructors
//! validate arguments) or send a named [`OperationRequest`], which the
//! [`ResolverTable`] turns into an `Operation`. Execution is one exhaustive
//! `match` in [`CacheBridge::execute`].
//!
//! ## Operations
//!
//! | Name | Kind | REST calls |
//! |------|------|------------|
//! | `currentUser` | Query | none (cache read) |
//! | `jwtToken` | Query | none (cache read) |
//! | `dappUser` | Query | `GET /dapp-users/:id` |
//! | `signIn` | Mutation | `GET /sign-in`, `GET /users` |
//! | `confirmUser` | Mutation | `POST /users/confirm`, `GET /users` |
//! | `confirmDappUser` | Mutation | `POST /dapp-users/confirm` |

pub mod bridge;
pub mod documents;
pub mod hydration;
pub mod operation;

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{ClientError, ResolveError};

pub use bridge::CacheBridge;
pub use hydration::HydrationStage;
pub use operation::{Operation, OperationKind, OperationName};

/// A named group of operations merged into the resolver table.
#[derive(Debug, Clone, Copy)]
pub struct ResolverGroup {
    pub name: &'static str,
    pub operations: &'static [OperationName],
}

/// Client-only reads of session metadata.
pub const METADATA_RESOLVERS: ResolverGroup = ResolverGroup {
    name: "metadata",
    operations: &[OperationName::CurrentUser, OperationName::JwtToken],
};

/// Operations backed by the Notus REST API.
pub const NOTUS_RESOLVERS: ResolverGroup = ResolverGroup {
    name: "notus",
    operations: &[
        OperationName::DappUser,
        OperationName::SignIn,
        OperationName::ConfirmUser,
        OperationName::ConfirmDappUser,
    ],
};

/// A named operation as issued by a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl OperationRequest {
    pub fn query(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            kind: OperationKind::Query,
            name: name.into(),
            arguments,
        }
    }

    pub fn mutation(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            kind: OperationKind::Mutation,
            name: name.into(),
            arguments,
        }
    }
}

/// Immutable `(kind, name) -> operation` lookup built once at assembly.
#[derive(Debug, Clone)]
pub struct ResolverTable {
    entries: HashMap<(OperationKind, &'static str), (OperationName, &'static str)>,
}

impl ResolverTable {
    /// Merge `groups`, rejecting any `(kind, name)` defined twice.
    pub fn merge(groups: &[ResolverGroup]) -> Result<Self, ClientError> {
        let mut entries = HashMap::new();
        for group in groups {
            for &operation in group.operations {
                let key = (operation.kind(), operation.as_str());
                if let Some((_, first)) = entries.insert(key, (operation, group.name)) {
                    return Err(ClientError::ResolverCollision {
                        kind: key.0,
                        name: key.1,
                        first,
                        second: group.name,
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    /// The table every client uses.
    pub fn standard() -> Result<Self, ClientError> {
        Self::merge(&[METADATA_RESOLVERS, NOTUS_RESOLVERS])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, kind: OperationKind, name: &str) -> Option<OperationName> {
        self.entries.get(&(kind, name)).map(|(op, _)| *op)
    }

    /// Resolve and validate a named request.
    pub fn resolve(&self, request: &OperationRequest) -> Result<Operation, ResolveError> {
        let name = self.lookup(request.kind, &request.name).ok_or_else(|| {
            ResolveError::UnknownOperation {
                kind: request.kind,
                name: request.name.clone(),
            }
        })?;
        Ok(name.with_args(&request.arguments)?)
    }
}
