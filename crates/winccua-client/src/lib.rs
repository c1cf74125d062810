// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! GraphQL-over-HTTP client for WinCC Unified SCADA/HMI servers.
//!
//! This crate translates typed requests into GraphQL queries/mutations,
//! executes them over HTTP, and parses JSON responses back into typed
//! results, including per-item and whole-call error reporting.
//!
//! # Features
//!
//! - Session management (login, best-effort logout, session extension)
//! - Tag read/write with partial per-item failure semantics
//! - Namespace browsing and logged value history
//! - Active/logged alarm queries, acknowledge and reset
//! - Two interchangeable backend schema generations behind one API
//!
//! # Architecture
//!
//! ```text
//! WinccClient
//! ├── ClientConfig      - Credentials and endpoint, fixed at construction
//! ├── GraphqlTransport  - HTTP POST with persistent custom headers
//! ├── SchemaMapper      - build_*/parse_* per operation, one impl per
//! │                       schema generation (classic / unified)
//! └── SessionManager    - Bearer token lifecycle
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use winccua_client::{ClientConfig, WinccClient};
//! use winccua_core::types::TagName;
//!
//! let config = ClientConfig::builder()
//!     .base_url("https://hmi-server:4443")
//!     .credentials("operator", "secret")
//!     .build()?;
//!
//! let client = WinccClient::new(config)?;
//! client.connect().await?;
//! let values = client.read_tags(&[TagName::new("Motor_1.Speed")]).await?;
//! client.disconnect().await;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod request;
pub mod response;
pub mod schema;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use client::{ClientStats, WinccClient};
pub use config::{ClientConfig, ClientConfigBuilder, SchemaGeneration};
pub use request::{escape_json_string, GraphqlRequest};
pub use response::ResponseEnvelope;
pub use schema::{ClassicSchema, SchemaMapper, UnifiedSchema};
pub use session::{Session, SessionManager, SessionState, SessionStats};
pub use transport::{GraphqlTransport, HttpTransport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
