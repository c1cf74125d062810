// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! GraphQL response envelope parsing.
//!
//! The response mapper locates an operation's result inside the
//! `{"data": {...}}` envelope and tolerates `null`/absence at every nesting
//! level: a missing `data` object or operation field means "no results",
//! never a crash. Per-item error objects mark individual items as failed
//! without aborting their siblings.

use serde_json::Value;

use winccua_core::error::{ServerError, WinccError, WinccResult};

// =============================================================================
// ResponseEnvelope
// =============================================================================

/// A parsed GraphQL response envelope.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    root: Value,
}

impl ResponseEnvelope {
    /// Parses raw response bytes.
    ///
    /// # Errors
    ///
    /// Returns a parse error when the body is not valid JSON. The error is
    /// returned as a value; nothing is thrown across the API boundary.
    pub fn parse(bytes: &[u8]) -> WinccResult<Self> {
        let root: Value =
            serde_json::from_slice(bytes).map_err(|e| WinccError::parse(e.to_string()))?;
        Ok(Self { root })
    }

    /// Returns the top-level `data` object, if present.
    pub fn data(&self) -> Option<&Value> {
        match self.root.get("data") {
            Some(Value::Null) | None => None,
            Some(data) => Some(data),
        }
    }

    /// Returns the named operation's result field, if present.
    pub fn operation(&self, name: &str) -> Option<&Value> {
        match self.data()?.get(name) {
            Some(Value::Null) | None => None,
            Some(field) => Some(field),
        }
    }

    /// Returns the named operation's result as an array.
    ///
    /// A missing or `null` field yields an empty slice: absent results are
    /// "no results", not an error.
    pub fn operation_items(&self, name: &str) -> &[Value] {
        self.operation(name)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Maps the top-level GraphQL `errors` array into a server error.
    ///
    /// Returns `Ok(())` when the array is absent or empty.
    pub fn ensure_no_graphql_errors(&self) -> WinccResult<()> {
        let Some(errors) = self.root.get("errors").and_then(Value::as_array) else {
            return Ok(());
        };
        if errors.is_empty() {
            return Ok(());
        }

        let messages: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(Value::as_str))
            .collect();

        Err(WinccError::server(ServerError::new(
            "GRAPHQL_ERROR",
            messages.join("; "),
        )))
    }
}

// =============================================================================
// Item Helpers
// =============================================================================

/// Extracts a nested `error` object from a result item.
///
/// Any present (non-`null`) error object marks the item as failed, even
/// when both of its fields are empty.
pub fn item_error(item: &Value) -> Option<ServerError> {
    match item.get("error") {
        Some(error @ Value::Object(_)) => Some(
            serde_json::from_value(error.clone()).unwrap_or_else(|_| ServerError::unknown()),
        ),
        _ => None,
    }
}

/// Reads a string field from a result item.
pub fn str_field(item: &Value, name: &str) -> Option<String> {
    item.get(name).and_then(Value::as_str).map(str::to_string)
}

/// Reads a string field, defaulting to the empty string.
pub fn str_field_or_default(item: &Value, name: &str) -> String {
    str_field(item, name).unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> ResponseEnvelope {
        ResponseEnvelope::parse(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = ResponseEnvelope::parse(b"not json at all");
        assert!(matches!(result, Err(WinccError::Parse { .. })));
    }

    #[test]
    fn test_missing_data_yields_no_results() {
        let env = envelope(json!({}));
        assert!(env.data().is_none());
        assert!(env.operation("ReadTags").is_none());
        assert!(env.operation_items("ReadTags").is_empty());
    }

    #[test]
    fn test_null_data_yields_no_results() {
        let env = envelope(json!({"data": null}));
        assert!(env.data().is_none());

        let env = envelope(json!({"data": {"ReadTags": null}}));
        assert!(env.operation("ReadTags").is_none());
        assert!(env.operation_items("ReadTags").is_empty());
    }

    #[test]
    fn test_operation_items() {
        let env = envelope(json!({"data": {"ReadTags": [{"name": "A"}, {"name": "B"}]}}));
        assert_eq!(env.operation_items("ReadTags").len(), 2);
    }

    #[test]
    fn test_graphql_errors_map_to_server_error() {
        let env = envelope(json!({
            "errors": [{"message": "field unknown"}, {"message": "denied"}]
        }));

        let error = env.ensure_no_graphql_errors().unwrap_err();
        let server = error.as_server_error().unwrap();
        assert_eq!(server.code, "GRAPHQL_ERROR");
        assert_eq!(server.description, "field unknown; denied");
    }

    #[test]
    fn test_empty_errors_array_is_ok() {
        let env = envelope(json!({"errors": [], "data": {}}));
        assert!(env.ensure_no_graphql_errors().is_ok());
    }

    #[test]
    fn test_item_error_extraction() {
        let item = json!({"name": "A", "error": {"code": "2", "description": "denied"}});
        let error = item_error(&item).unwrap();
        assert_eq!(error.code, "2");

        // A null error field means success.
        assert!(item_error(&json!({"name": "A", "error": null})).is_none());
        assert!(item_error(&json!({"name": "A"})).is_none());
    }

    #[test]
    fn test_empty_item_error_is_still_failure() {
        let item = json!({"name": "A", "error": {}});
        let error = item_error(&item).unwrap();
        assert!(error.is_unknown());
    }

    #[test]
    fn test_str_field_helpers() {
        let item = json!({"name": "A", "count": 3});
        assert_eq!(str_field(&item, "name"), Some("A".to_string()));
        assert_eq!(str_field(&item, "count"), None);
        assert_eq!(str_field_or_default(&item, "missing"), "");
    }
}
