// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for the WinCC Unified client.
//!
//! This module defines the error model shared by every operation:
//!
//! - A single root type, [`WinccError`], returned as a value from every
//!   fallible call; nothing panics across the API boundary
//! - The server's uniform `{code, description}` error object,
//!   [`ServerError`], reused at top level and nested per item
//! - Distinction between retryable (transport) and non-retryable errors
//!
//! # Error Categories
//!
//! ```text
//! WinccError
//! ├── Connection  - Transport failed or returned nothing
//! ├── Parse       - Response body is not valid JSON
//! ├── Server      - Well-formed response carrying an error object
//! └── Validation  - Caller supplied empty/invalid arguments
//! ```
//!
//! # Examples
//!
//! ```
//! use winccua_core::error::{ServerError, WinccError};
//!
//! let error = WinccError::server(ServerError::new("101", "Tag not found"));
//! assert_eq!(error.category(), "server");
//! assert!(!error.is_retryable());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A specialized `Result` type for WinCC Unified operations.
pub type WinccResult<T> = Result<T, WinccError>;

// =============================================================================
// ServerError - Wire Error Object
// =============================================================================

/// The server's uniform error object.
///
/// Both schema generations attach this shape at the operation level and on
/// individual result items. Its presence always means failure: an object
/// with empty `code` and `description` is a degenerate "unknown error"
/// placeholder, not a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerError {
    /// Vendor error code (may be empty).
    #[serde(default)]
    pub code: String,

    /// Human-readable description (may be empty).
    #[serde(default)]
    pub description: String,
}

impl ServerError {
    /// Creates a new server error.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Creates the degenerate "unknown error" placeholder.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Returns `true` if both fields are empty.
    ///
    /// The error is still a failure; this only identifies the placeholder.
    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.code.is_empty() && self.description.is_empty()
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown error")
        } else {
            write!(f, "{}: {}", self.code, self.description)
        }
    }
}

// =============================================================================
// WinccError - Root Error Type
// =============================================================================

/// The root error type for WinCC Unified operations.
///
/// Top-level failures return this type; per-item failures inside a batch
/// result carry a [`ServerError`] on the item instead and never abort the
/// surrounding call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WinccError {
    /// Transport failed or returned nothing.
    #[error("Connection error: {message}")]
    Connection {
        /// What went wrong at the transport level.
        message: String,
    },

    /// Response body is not valid JSON.
    #[error("Parse error: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },

    /// Well-formed response carrying a server error object.
    #[error("Server error: {0}")]
    Server(ServerError),

    /// Caller supplied empty or invalid arguments.
    #[error("Validation error: {message}")]
    Validation {
        /// What was rejected and why.
        message: String,
    },
}

impl WinccError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a server error.
    #[inline]
    pub fn server(error: ServerError) -> Self {
        Self::Server(error)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if this error is retryable.
    ///
    /// Only transport failures are transient; server, parse, and validation
    /// errors will not succeed on a repeated attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns the error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Parse { .. } => "parse",
            Self::Server(_) => "server",
            Self::Validation { .. } => "validation",
        }
    }

    /// Returns the nested server error, if any.
    pub fn as_server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Server(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// This message is suitable for display to operators and avoids
    /// exposing internal implementation details.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection { .. } => "서버 연결 오류".to_string(),
            Self::Parse { .. } => "서버 응답 해석 오류".to_string(),
            Self::Server(e) => format!("서버 오류: {}", e),
            Self::Validation { message } => format!("입력 값 오류: {}", message),
        }
    }
}

impl From<ServerError> for WinccError {
    fn from(error: ServerError) -> Self {
        Self::Server(error)
    }
}

// =============================================================================
// Tests
// =============================================================================
