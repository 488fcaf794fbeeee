// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # GraphQL Link Chain
//!
//! Server-side GraphQL operations go through an ordered chain of links in
//! front of the HTTP transport:
//!
//! ```text
//! ErrorLink ─▶ AuthLink ─▶ HttpTransport ─▶ POST <API_BASE>/graphql
//! ```
//!
//! Links see the operation on the way out (`prepare`, in chain order) and
//! the outcome on the way back (`observe`, in reverse order). Only the
//! transport performs I/O.

mod auth;
mod error_link;
mod http;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use auth::AuthLink;
pub use error_link::ErrorLink;
pub use http::HttpTransport;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("GraphQL request failed: {0}")]
    Request(String),

    #[error("GraphQL endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL response was invalid: {0}")]
    Decode(String),
}

/// A server-side GraphQL operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    pub query: String,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            operation_name: None,
            query: query.into(),
            variables: Value::Object(Default::default()),
        }
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

/// An operation in flight, with the headers links have attached.
#[derive(Debug, Clone)]
pub struct LinkOperation {
    pub request: GraphqlRequest,
    pub headers: BTreeMap<String, String>,
}

pub trait Link: Send + Sync {
    fn name(&self) -> &'static str;

    fn prepare(&self, _operation: &mut LinkOperation) {}

    fn observe(&self, _operation: &LinkOperation, _outcome: &Result<GraphqlResponse, LinkError>) {}
}

/// Links followed by the terminating transport.
pub struct LinkChain {
    links: Vec<Box<dyn Link>>,
    transport: HttpTransport,
}

impl std::fmt::Debug for LinkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkChain")
            .field("links", &self.link_names())
            .field("transport", &self.transport)
            .finish()
    }
}

impl LinkChain {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            links: Vec::new(),
            transport,
        }
    }

    /// Append `link`; links run in the order they are added.
    pub fn with(mut self, link: impl Link + 'static) -> Self {
        self.links.push(Box::new(link));
        self
    }

    pub fn link_names(&self) -> Vec<&'static str> {
        self.links.iter().map(|link| link.name()).collect()
    }

    pub async fn execute(&self, request: GraphqlRequest) -> Result<GraphqlResponse, LinkError> {
        let mut operation = LinkOperation {
            request,
            headers: BTreeMap::new(),
        };
        for link in &self.links {
            link.prepare(&mut operation);
        }

        let outcome = self.transport.send(&operation).await;

        for link in self.links.iter().rev() {
            link.observe(&operation, &outcome);
        }
        outcome
    }
}
