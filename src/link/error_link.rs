// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use tracing::{error, warn};

use super::{GraphqlResponse, Link, LinkError, LinkOperation};

/// Logs GraphQL and network errors. Never changes the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLink;

impl Link for ErrorLink {
    fn name(&self) -> &'static str {
        "error"
    }

    fn observe(&self, operation: &LinkOperation, outcome: &Result<GraphqlResponse, LinkError>) {
        let operation_name = operation
            .request
            .operation_name
            .as_deref()
            .unwrap_or("anonymous");

        match outcome {
            Ok(response) => {
                for e in &response.errors {
                    warn!(
                        operation = operation_name,
                        message = %e.message,
                        locations = ?e.locations,
                        path = ?e.path,
                        "GraphQL error"
                    );
                }
            }
            Err(e) => {
                error!(operation = operation_name, error = %e, "Network error");
            }
        }
    }
}
