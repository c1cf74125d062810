// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! GraphQL transport abstraction layer.
//!
//! This module provides the abstract transport trait for GraphQL-over-HTTP
//! communication, enabling testability and flexible backend implementations,
//! together with the reqwest-backed implementation used in production.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use winccua_core::error::{WinccError, WinccResult};

use crate::config::ClientConfig;

// =============================================================================
// GraphqlTransport Trait
// =============================================================================

/// Abstract transport for GraphQL-over-HTTP communication.
///
/// The transport executes an HTTP POST of a JSON body to a fixed endpoint
/// with `Content-Type: application/json` and returns the raw response body.
/// Custom headers (notably `Authorization`) are additive and persist for
/// the lifetime of the transport once set.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow concurrent access from
/// multiple tasks.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Posts a JSON body to the GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the request cannot be executed or the
    /// server answers with a non-success HTTP status.
    async fn post(&self, body: &[u8]) -> WinccResult<Vec<u8>>;

    /// Sets a custom header for all subsequent requests.
    ///
    /// Setting a header that already exists replaces its value.
    fn set_header(&self, name: &str, value: &str);

    /// Removes a previously set custom header.
    fn remove_header(&self, name: &str);
}

// =============================================================================
// HttpTransport
// =============================================================================

/// The reqwest-backed production transport.
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
    headers: RwLock<HashMap<String, String>>,
}

impl HttpTransport {
    /// Creates a transport from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the underlying HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &ClientConfig) -> WinccResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| WinccError::connection(e.to_string()))?;

        Ok(Self {
            url: config.graphql_url(),
            client,
            headers: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn post(&self, body: &[u8]) -> WinccResult<Vec<u8>> {
        let mut request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec());

        for (name, value) in self.headers.read().iter() {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(url = %self.url, bytes = body.len(), "executing GraphQL request");

        let response = request
            .send()
            .await
            .map_err(|e| WinccError::connection(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| WinccError::connection(e.to_string()))?;

        if !status.is_success() {
            return Err(WinccError::connection(format!(
                "HTTP status {} from {}",
                status, self.url
            )));
        }

        debug!(bytes = bytes.len(), "GraphQL response received");

        Ok(bytes.to_vec())
    }

    fn set_header(&self, name: &str, value: &str) {
        debug!(header = name, "setting transport header");
        self.headers
            .write()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_header(&self, name: &str) {
        self.headers.write().remove(name);
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ClientConfig {
        ClientConfig::new("http://localhost:4000", "user", "pw")
    }

    #[test]
    fn test_transport_url_from_config() {
        let transport = HttpTransport::from_config(&test_config()).unwrap();
        assert_eq!(transport.url(), "http://localhost:4000/graphql");
    }

    #[test]
    fn test_header_replacement() {
        let transport = HttpTransport::from_config(&test_config()).unwrap();

        transport.set_header("Authorization", "Bearer first");
        transport.set_header("Authorization", "Bearer second");

        let headers = transport.headers.read();
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Bearer second")
        );
    }

    #[test]
    fn test_header_removal() {
        let transport = HttpTransport::from_config(&test_config()).unwrap();

        transport.set_header("Authorization", "Bearer token");
        transport.remove_header("Authorization");

        assert!(transport.headers.read().is_empty());
        // Removing again is harmless.
        transport.remove_header("Authorization");
    }
}
