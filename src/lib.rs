// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Notus Client - Cache/Resolver Bridge
//!
//! Client-side core of Notus, a service that watches Ethereum contract
//! events and notifies users. Local operations (`signIn`, `dappUser`, ...)
//! are resolved against the Notus REST API and written into a normalized
//! in-memory cache; the session token is persisted between runs.
//!
//! ## Modules
//!
//! - `storage` - Persisted session token (capability-probed)
//! - `gateway` - Shared REST client with a process-wide auth header
//! - `cache` - Normalized entity cache
//! - `resolvers` - Operations, resolver table and session hydration
//! - `link` - GraphQL link chain for server-side operations
//! - `client` - Assembly and startup rehydration

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod link;
pub mod logging;
pub mod models;
pub mod resolvers;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use client::{NotusClient, Rehydration};
pub use config::ClientConfig;
pub use error::{ClientError, ResolveError, ValidationError};
pub use resolvers::{Operation, OperationKind, OperationRequest};
