// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client configuration.
//!
//! Credentials and connection settings are fixed at construction time; the
//! client never mutates them afterwards.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use winccua_core::error::{WinccError, WinccResult};

// =============================================================================
// SchemaGeneration
// =============================================================================

/// Which backend schema generation the server speaks.
///
/// The two generations expose the same functionality behind divergent
/// GraphQL shapes. The generation is selected here, at construction time;
/// there is no runtime auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaGeneration {
    /// Legacy generation (`ReadTags`, `Browse`, `GetActiveAlarms`, ...).
    Classic,

    /// Current generation (`tagValues`, `browse`, `activeAlarms`, ...).
    #[default]
    Unified,
}

impl SchemaGeneration {
    /// Returns the generation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Unified => "unified",
        }
    }
}

impl fmt::Display for SchemaGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ClientConfig
// =============================================================================

/// Client connection configuration.
///
/// # Examples
///
/// ```
/// use winccua_client::config::{ClientConfig, SchemaGeneration};
///
/// let config = ClientConfig::builder()
///     .base_url("https://hmi-server:4443")
///     .credentials("operator", "secret")
///     .generation(SchemaGeneration::Unified)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.graphql_url(), "https://hmi-server:4443/graphql");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server base URL (e.g. "https://hmi-server:4443").
    pub base_url: String,

    /// Login user name.
    pub username: String,

    /// Login password.
    pub password: String,

    /// Backend schema generation.
    #[serde(default)]
    pub generation: SchemaGeneration,

    /// Path of the GraphQL endpoint under the base URL.
    #[serde(default = "default_graphql_path")]
    pub graphql_path: String,

    /// Request timeout for a single round trip.
    ///
    /// This is the only timeout policy the client defines; cancellation is
    /// otherwise delegated to the transport.
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_graphql_path() -> String {
    "/graphql".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Creates a configuration with default settings.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            generation: SchemaGeneration::default(),
            graphql_path: default_graphql_path(),
            request_timeout: default_request_timeout(),
        }
    }

    /// Validates this configuration.
    pub fn validate(&self) -> WinccResult<()> {
        if self.base_url.is_empty() {
            return Err(WinccError::validation("base_url must not be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(WinccError::validation(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(WinccError::validation(format!(
                "base_url '{}' is not a valid URL",
                self.base_url
            )));
        }

        if self.username.is_empty() {
            return Err(WinccError::validation("username must not be empty"));
        }

        if self.request_timeout.is_zero() {
            return Err(WinccError::validation(
                "request_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Returns the full GraphQL endpoint URL.
    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.graphql_path)
    }
}

// =============================================================================
// ClientConfigBuilder
// =============================================================================

/// Builder for `ClientConfig`.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    generation: Option<SchemaGeneration>,
    graphql_path: Option<String>,
    request_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Sets the server base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the login credentials.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the backend schema generation.
    pub fn generation(mut self, generation: SchemaGeneration) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Sets the GraphQL endpoint path.
    pub fn graphql_path(mut self, path: impl Into<String>) -> Self {
        self.graphql_path = Some(path.into());
        self
    }

    /// Sets the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> WinccResult<ClientConfig> {
        let config = ClientConfig {
            base_url: self
                .base_url
                .ok_or_else(|| WinccError::validation("base_url is required"))?,
            username: self
                .username
                .ok_or_else(|| WinccError::validation("username is required"))?,
            password: self.password.unwrap_or_default(),
            generation: self.generation.unwrap_or_default(),
            graphql_path: self.graphql_path.unwrap_or_else(default_graphql_path),
            request_timeout: self.request_timeout.unwrap_or_else(default_request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_simple() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:4000")
            .credentials("admin", "admin")
            .build()
            .unwrap();

        assert_eq!(config.base_url, "http://localhost:4000");
        assert_eq!(config.generation, SchemaGeneration::Unified);
        assert_eq!(config.graphql_url(), "http://localhost:4000/graphql");
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:4000/")
            .credentials("admin", "admin")
            .build()
            .unwrap();

        assert_eq!(config.graphql_url(), "http://localhost:4000/graphql");
    }

    #[test]
    fn test_missing_base_url_rejected() {
        let result = ClientConfig::builder().credentials("a", "b").build();
        assert!(matches!(result, Err(WinccError::Validation { .. })));
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let result = ClientConfig::builder()
            .base_url("opc.tcp://localhost:4840")
            .credentials("a", "b")
            .build();
        assert!(matches!(result, Err(WinccError::Validation { .. })));
    }

    #[test]
    fn test_empty_username_rejected() {
        let result = ClientConfig::builder()
            .base_url("http://localhost:4000")
            .credentials("", "pw")
            .build();
        assert!(matches!(result, Err(WinccError::Validation { .. })));
    }

    #[test]
    fn test_generation_selection() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:4000")
            .credentials("a", "b")
            .generation(SchemaGeneration::Classic)
            .build()
            .unwrap();

        assert_eq!(config.generation, SchemaGeneration::Classic);
        assert_eq!(config.generation.as_str(), "classic");
    }
}
