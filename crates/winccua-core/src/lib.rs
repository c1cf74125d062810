// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # winccua-core
//!
//! Core abstractions and shared types for the WinCC Unified GraphQL client.
//!
//! This crate provides the foundational types used across the client:
//!
//! - **Types**: Domain types like `TagName`, `TagValue`, `BrowseItem`, `Alarm`
//! - **Error**: Unified error hierarchy with the server's `{code, description}` shape
//! - **Convert**: Normalization of heterogeneous JSON values into canonical strings
//!
//! ## Example
//!
//! ```rust
//! use winccua_core::types::{TagName, AlarmIdentifier};
//!
//! let tag = TagName::new("Motor_1.Speed");
//! assert_eq!(tag.as_str(), "Motor_1.Speed");
//!
//! // Identifiers that parse fully as integers address alarms by instance id.
//! assert_eq!(AlarmIdentifier::parse("42"), AlarmIdentifier::InstanceId(42));
//! assert_eq!(
//!     AlarmIdentifier::parse("Tank_High"),
//!     AlarmIdentifier::Name("Tank_High".to_string())
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod convert;
pub mod error;
pub mod types;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use convert::{format_instance_id, normalize_value, parse_timestamp};
pub use error::{ServerError, WinccError, WinccResult};
pub use types::{
    Alarm, AlarmIdentifier, BrowseItem, LoggedValue, TagHistory, TagName, TagValue, TagWrite,
    WriteOutcome,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
