// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process mock of the Notus REST API used by unit tests.
//!
//! Routes are matched on exact `(method, path)`; unmatched requests get a
//! 404. Every request is recorded, optionally with a snapshot of a watched
//! file taken at the moment the request arrived.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
    /// Contents of the watched file when the request arrived.
    pub watched: Option<String>,
}

impl RecordedRequest {
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(String, String), (StatusCode, Value)>,
    requests: Vec<RecordedRequest>,
    watch: Option<PathBuf>,
}

type Shared = Arc<Mutex<MockState>>;

#[derive(Clone)]
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
}

impl MockApi {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_uri(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `method path` with `status` and a JSON body, replacing any
    /// previous answer for that route.
    pub fn respond(&self, method: &str, path: &str, status: StatusCode, body: Value) {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    /// Snapshot `path` into every recorded request from now on.
    pub fn watch_file(&self, path: impl Into<PathBuf>) {
        self.state.lock().unwrap().watch = Some(path.into());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = state.lock().unwrap();

    let watched = state
        .watch
        .as_ref()
        .and_then(|path| std::fs::read_to_string(path).ok());
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
        watched,
    });

    match state
        .routes
        .get(&(method.to_string(), uri.path().to_string()))
    {
        Some((status, body)) => (*status, Json(body.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no mock route" })),
        )
            .into_response(),
    }
}
