// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! REST gateway client for the Notus API.
//!
//! One [`RestGateway`] is built per client and cloned wherever API access is
//! needed. All clones share the same connection pool and the same default
//! `Authorization` header.
//!
//! ## Default auth header
//!
//! [`RestGateway::set_auth_header`] replaces the header for every request
//! built afterwards, through any clone, for the rest of the process. A
//! request already sent keeps the header it was built with. Two tasks that
//! update the header concurrently race and either value may win; no
//! ordering beyond that is provided.
//!
//! ## Paths
//!
//! Requests take path segments, not a path string. Each segment is
//! percent-encoded on its own, so caller data such as an id can never add
//! segments, a query string or a fragment.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::models::SessionToken;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("path segment '{0}' is not allowed")]
    InvalidSegment(String),

    #[error("{method} {path} failed: {reason}")]
    Request {
        method: &'static str,
        path: String,
        reason: String,
    },

    #[error("{method} {path} returned {status}: {body}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },
}

impl GatewayError {
    /// HTTP status of a non-success response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Response of a successful (2xx) gateway call.
///
/// `data` is the decoded JSON body; a non-JSON body is kept as a JSON
/// string and an empty body is `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct RestGateway {
    base: Url,
    http: Client,
    default_auth: Arc<RwLock<Option<String>>>,
}

impl RestGateway {
    pub fn new(base_uri: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        let base = Url::parse(base_uri)
            .map_err(|e| GatewayError::Client(format!("invalid base URI '{base_uri}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Client(format!(
                "base URI '{base_uri}' cannot carry a path"
            )));
        }

        Ok(Self {
            base,
            http,
            default_auth: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_uri(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Underlying HTTP client, shared with the GraphQL transport.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Absolute URL of `segments` under the base URI.
    ///
    /// `.` and `..` are rejected: they would otherwise be dropped from the
    /// path instead of encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(GatewayError::InvalidSegment(dot.to_string()));
        }
        let mut url = self.base.clone();
        // Always Ok: `new` rejects cannot-be-a-base URIs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Replace the default `Authorization` header (`None` removes it).
    pub fn set_auth_header(&self, token: Option<&SessionToken>) {
        let value = token.map(SessionToken::bearer);
        match self.default_auth.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// Current default `Authorization` header value.
    pub fn auth_header(&self) -> Option<String> {
        match self.default_auth.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub async fn get(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send("GET", &path, request, None).await
    }

    /// POST a JSON body. `bearer` overrides the default auth header for this
    /// request only.
    pub async fn post(
        &self,
        segments: &[&str],
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let request = self.http.post(url).json(body);
        self.send("POST", &path, request, bearer).await
    }

    async fn send(
        &self,
        method: &'static str,
        path: &str,
        request: RequestBuilder,
        bearer: Option<&str>,
    ) -> Result<GatewayResponse, GatewayError> {
        let auth = match bearer {
            Some(token) => Some(format!("Bearer {token}")),
            None => self.auth_header(),
        };
        let request = match auth {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        };

        debug!(method, path, "Notus API request");

        let response = request.send().await.map_err(|e| GatewayError::Request {
            method,
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GatewayError::Request {
            method,
            path: path.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;

        debug!(method, path, status = status.as_u16(), "Notus API response");

        if !status.is_success() {
            return Err(GatewayError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(GatewayResponse {
            status: status.as_u16(),
            data: decode_body(&body),
        })
    }
}

fn decode_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
