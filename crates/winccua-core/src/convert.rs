// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Normalization of heterogeneous JSON values into canonical strings.
//!
//! Tag values arrive from the server as JSON strings, numbers, or booleans
//! depending on the underlying tag type and schema generation. The domain
//! API always reports values as strings, so every shape is normalized here:
//!
//! - strings pass through unchanged
//! - integer-valued numbers render without a fractional part (`3.0` → `"3"`)
//! - booleans render as the literals `"true"` / `"false"`
//!
//! # Examples
//!
//! ```
//! use winccua_core::convert::normalize_value;
//! use serde_json::json;
//!
//! assert_eq!(normalize_value(&json!(3.0)), Some("3".to_string()));
//! assert_eq!(normalize_value(&json!(true)), Some("true".to_string()));
//! assert_eq!(normalize_value(&json!("on")), Some("on".to_string()));
//! assert_eq!(normalize_value(&json!(null)), None);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

// =============================================================================
// Value Normalization
// =============================================================================

/// Normalizes a JSON value into its canonical string rendering.
///
/// Returns `None` for JSON `null`. Arrays and objects are rendered as
/// compact JSON text.
pub fn normalize_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        Value::Number(n) => Some(normalize_number(n)),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn normalize_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

// =============================================================================
// Identifier Formatting
// =============================================================================

/// Formats a numeric or string identifier field into a string id.
///
/// Alarm instance ids arrive as JSON numbers in the current schema
/// generation and as strings in the legacy one.
pub fn format_instance_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(normalize_number(n)),
        _ => None,
    }
}

// =============================================================================
// Timestamp Parsing
// =============================================================================

/// Parses a wire timestamp into a UTC datetime.
///
/// Accepts RFC 3339 strings (both generations) and Unix epoch seconds
/// (legacy alarm times). Anything else yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let secs = n.as_i64()?;
            Utc.timestamp_opt(secs, 0).single()
        }
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
