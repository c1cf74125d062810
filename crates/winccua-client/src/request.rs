// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! GraphQL request envelope construction.
//!
//! A request pairs an operation's fixed query document with a JSON
//! variables object and serializes both into the wire envelope
//! `{"query": "<document>", "variables": {...}}`. The envelope is built
//! through `serde_json`, so the query document is embedded as a properly
//! escaped JSON string; the observable wire format matches what the server
//! expects byte for byte.

use serde_json::Value;

// =============================================================================
// GraphqlRequest
// =============================================================================

/// A ready-to-send GraphQL request.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlRequest {
    /// The operation's fixed query document.
    pub query: &'static str,

    /// JSON variables object; omitted from the envelope when absent.
    pub variables: Option<Value>,
}

impl GraphqlRequest {
    /// Creates a request without variables.
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            variables: None,
        }
    }

    /// Attaches a variables object.
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Serializes the request into the wire envelope.
    pub fn to_body(&self) -> Vec<u8> {
        let mut envelope = serde_json::Map::new();
        envelope.insert("query".to_string(), Value::String(self.query.to_string()));
        if let Some(variables) = &self.variables {
            envelope.insert("variables".to_string(), variables.clone());
        }
        Value::Object(envelope).to_string().into_bytes()
    }
}

// =============================================================================
// String Escaping
// =============================================================================

/// Escapes a string for embedding inside a JSON string value.
///
/// Exactly the characters the protocol requires are escaped: `"`, `\`,
/// newline, carriage return, and tab. Applying the function twice is
/// well-defined and yields the doubly escaped form used when a variables
/// object is itself carried as a quoted string inside an outer envelope.
pub fn escape_json_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// =============================================================================
// Tests
// =============================================================================
