// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use reqwest::Client;

use super::{GraphqlResponse, LinkError, LinkOperation};

/// Terminating link: POSTs the operation as JSON.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    uri: String,
}

impl HttpTransport {
    pub fn new(http: Client, uri: &str) -> Self {
        Self {
            http,
            uri: uri.to_string(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub async fn send(&self, operation: &LinkOperation) -> Result<GraphqlResponse, LinkError> {
        let mut request = self.http.post(&self.uri).json(&operation.request);
        for (name, value) in &operation.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| LinkError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LinkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LinkError::Decode(e.to_string()))
    }
}
