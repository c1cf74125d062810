// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client integration tests.
//!
//! These tests drive the full client stack (domain API → schema mapper →
//! envelope → transport) against a scripted mock transport, verifying both
//! the constructed request payloads and the typed results.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};

use winccua_client::{
    ClientConfig, GraphqlTransport, SchemaGeneration, SessionState, WinccClient,
};
use winccua_core::error::{WinccError, WinccResult};
use winccua_core::types::{TagName, TagWrite};

// =============================================================================
// Mock Transport
// =============================================================================

#[derive(Default)]
struct MockState {
    responses: Mutex<VecDeque<WinccResult<Vec<u8>>>>,
    requests: Mutex<Vec<Value>>,
    headers: RwLock<HashMap<String, String>>,
}

/// Scripted transport: pops one canned response per request and records
/// every request body and header mutation for verification.
#[derive(Clone, Default)]
struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    fn new() -> Self {
        Self::default()
    }

    fn push_response(&self, body: Value) {
        self.state
            .responses
            .lock()
            .push_back(Ok(body.to_string().into_bytes()));
    }

    fn push_raw_response(&self, bytes: &[u8]) {
        self.state.responses.lock().push_back(Ok(bytes.to_vec()));
    }

    fn push_error(&self, error: WinccError) {
        self.state.responses.lock().push_back(Err(error));
    }

    fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().clone()
    }

    fn request_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.state.headers.read().get(name).cloned()
    }
}

#[async_trait]
impl GraphqlTransport for MockTransport {
    async fn post(&self, body: &[u8]) -> WinccResult<Vec<u8>> {
        let parsed: Value = serde_json::from_slice(body).expect("request body must be JSON");
        self.state.requests.lock().push(parsed);
        self.state
            .responses
            .lock()
            .pop_front()
            .expect("no scripted response left")
    }

    fn set_header(&self, name: &str, value: &str) {
        self.state
            .headers
            .write()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_header(&self, name: &str) {
        self.state.headers.write().remove(name);
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn client_with(generation: SchemaGeneration) -> (WinccClient, MockTransport) {
    let config = ClientConfig::builder()
        .base_url("http://localhost:4000")
        .credentials("operator", "secret")
        .generation(generation)
        .build()
        .unwrap();

    let mock = MockTransport::new();
    let client = WinccClient::with_transport(config, Box::new(mock.clone())).unwrap();
    (client, mock)
}

fn unified_client() -> (WinccClient, MockTransport) {
    client_with(SchemaGeneration::Unified)
}

fn classic_client() -> (WinccClient, MockTransport) {
    client_with(SchemaGeneration::Classic)
}

fn unified_login_response(token: &str) -> Value {
    json!({"data": {"login": {"token": token}}})
}

// =============================================================================
// Session Lifecycle
// =============================================================================

#[tokio::test]
async fn connect_sets_bearer_header() {
    let (client, mock) = unified_client();
    mock.push_response(unified_login_response("tok123"));

    client.connect().await.unwrap();

    assert_eq!(client.state(), SessionState::Connected);
    assert_eq!(
        mock.header("Authorization").as_deref(),
        Some("Bearer tok123")
    );

    // The login request carried the credentials as variables.
    let requests = mock.requests();
    assert_eq!(requests[0]["variables"]["username"], "operator");
    assert_eq!(requests[0]["variables"]["password"], "secret");
}

#[tokio::test]
async fn connect_with_wrong_credentials_stays_disconnected() {
    let (client, mock) = unified_client();
    mock.push_response(json!({
        "data": {"login": {"error": {"code": "401", "description": "bad credentials"}}}
    }));

    let error = client.connect().await.unwrap_err();
    assert_eq!(error.category(), "server");
    assert_eq!(client.state(), SessionState::Disconnected);
    assert!(mock.header("Authorization").is_none());
    assert_eq!(client.session_stats().failures(), 1);
}

#[tokio::test]
async fn connect_transport_failure_stays_disconnected() {
    let (client, mock) = unified_client();
    mock.push_error(WinccError::connection("connection refused"));

    let error = client.connect().await.unwrap_err();
    assert!(error.is_retryable());
    assert_eq!(client.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn reconnect_overwrites_prior_session() {
    let (client, mock) = unified_client();
    mock.push_response(unified_login_response("first"));
    mock.push_response(unified_login_response("second"));

    client.connect().await.unwrap();
    client.connect().await.unwrap();

    assert_eq!(client.state(), SessionState::Connected);
    assert_eq!(
        mock.header("Authorization").as_deref(),
        Some("Bearer second")
    );
    assert_eq!(client.session_stats().logins(), 2);
}

#[tokio::test]
async fn disconnect_is_best_effort_and_idempotent() {
    let (client, mock) = unified_client();
    mock.push_response(unified_login_response("tok"));
    client.connect().await.unwrap();

    // Logout transport failure is swallowed; local state clears anyway.
    mock.push_error(WinccError::connection("server gone"));
    client.disconnect().await;
    assert_eq!(client.state(), SessionState::Disconnected);
    assert!(mock.header("Authorization").is_none());

    // Second disconnect sends nothing and does not error.
    let requests_before = mock.request_count();
    client.disconnect().await;
    assert_eq!(mock.request_count(), requests_before);
}

#[tokio::test]
async fn classic_logout_carries_session_id() {
    let (client, mock) = classic_client();
    mock.push_response(json!({
        "data": {"Login": {"token": "tok", "sessionId": "sess42"}}
    }));
    client.connect().await.unwrap();

    mock.push_response(json!({"data": {"Logout": {}}}));
    client.disconnect().await;

    let requests = mock.requests();
    assert_eq!(requests[1]["variables"]["sessionId"], "sess42");
    assert_eq!(client.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn extend_session_replaces_token_on_unified() {
    let (client, mock) = unified_client();
    mock.push_response(unified_login_response("old"));
    client.connect().await.unwrap();

    mock.push_response(json!({"data": {"extendSession": {"token": "new"}}}));
    client.extend_session().await.unwrap();

    assert_eq!(mock.header("Authorization").as_deref(), Some("Bearer new"));
}

#[tokio::test]
async fn extend_session_without_session_is_validation_error() {
    let (client, _mock) = unified_client();
    let error = client.extend_session().await.unwrap_err();
    assert_eq!(error.category(), "validation");
}

// =============================================================================
// Tag Operations
// =============================================================================

#[tokio::test]
async fn read_tags_batch_partial_failure() {
    let (client, mock) = classic_client();
    mock.push_response(json!({
        "data": {"ReadTags": [
            {"name": "T1", "value": "10", "quality": "GOOD", "timestamp": "2025-06-01T00:00:00Z"},
            {"name": "T2", "error": {"code": "101", "description": "not found"}},
            {"name": "T3", "value": "30", "quality": "GOOD", "timestamp": "2025-06-01T00:00:00Z"},
        ]}
    }));

    let names = [TagName::new("T1"), TagName::new("T2"), TagName::new("T3")];
    let results = client.read_tags(&names).await.unwrap();

    assert_eq!(results.len(), 3);

    assert!(results[0].is_good());
    assert_eq!(results[0].value.as_deref(), Some("10"));

    assert!(results[1].error.is_some());
    assert!(results[1].value.is_none());

    assert!(results[2].is_good());
    assert_eq!(results[2].value.as_deref(), Some("30"));

    // No result carries both a value and an error.
    for result in &results {
        assert!(result.value.is_none() || result.error.is_none());
    }
}

#[tokio::test]
async fn read_tags_normalizes_values_to_strings() {
    let (client, mock) = unified_client();
    mock.push_response(json!({
        "data": {"tagValues": [
            {"name": "F", "value": {"value": 3.0, "quality": {"quality": "GOOD"}}},
            {"name": "B", "value": {"value": true, "quality": {"quality": "GOOD"}}},
            {"name": "S", "value": {"value": "ready", "quality": {"quality": "GOOD"}}},
        ]}
    }));

    let names = [TagName::new("F"), TagName::new("B"), TagName::new("S")];
    let results = client.read_tags(&names).await.unwrap();

    assert_eq!(results[0].value.as_deref(), Some("3"));
    assert_eq!(results[1].value.as_deref(), Some("true"));
    assert_eq!(results[2].value.as_deref(), Some("ready"));
}

#[tokio::test]
async fn read_tags_empty_list_builds_no_request() {
    let (client, mock) = unified_client();

    let error = client.read_tags(&[]).await.unwrap_err();
    assert_eq!(error.category(), "validation");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn write_tags_follows_server_order() {
    let (client, mock) = unified_client();
    mock.push_response(json!({
        "data": {"writeTagValues": [
            {"name": "B"},
            {"name": "A", "error": {"code": "5", "description": "read only"}},
        ]}
    }));

    let writes = [TagWrite::new("A", "1"), TagWrite::new("B", "2")];
    let outcomes = client.write_tags(&writes).await.unwrap();

    // The server answered in its own order; the mapper preserves it.
    assert_eq!(outcomes[0].name.as_str(), "B");
    assert!(outcomes[0].is_good());
    assert_eq!(outcomes[1].name.as_str(), "A");
    assert!(!outcomes[1].is_good());
}

#[tokio::test]
async fn write_tags_empty_list_is_rejected() {
    let (client, mock) = unified_client();
    let error = client.write_tags(&[]).await.unwrap_err();
    assert_eq!(error.category(), "validation");
    assert_eq!(mock.request_count(), 0);
}

// =============================================================================
// Response Mapping Edge Cases
// =============================================================================

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let (client, mock) = unified_client();
    mock.push_raw_response(b"<html>proxy error</html>");

    let error = client.read_tags(&[TagName::new("T")]).await.unwrap_err();
    assert_eq!(error.category(), "parse");
    assert_eq!(client.stats().errors(), 1);
}

#[tokio::test]
async fn missing_data_yields_empty_results() {
    let (client, mock) = unified_client();
    mock.push_response(json!({}));

    let results = client.read_tags(&[TagName::new("T")]).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn top_level_graphql_errors_map_to_server_error() {
    let (client, mock) = unified_client();
    mock.push_response(json!({
        "errors": [{"message": "Cannot query field \"tagValues\""}]
    }));

    let error = client.read_tags(&[TagName::new("T")]).await.unwrap_err();
    let server = error.as_server_error().unwrap();
    assert_eq!(server.code, "GRAPHQL_ERROR");
}

// =============================================================================
// Browse
// =============================================================================

#[tokio::test]
async fn classic_browse_top_level_error_fails_call() {
    let (client, mock) = classic_client();
    mock.push_response(json!({
        "data": {"Browse": {
            "items": [{"name": "N", "type": "Tag", "address": "HMI/N"}],
            "error": {"code": "7", "description": "path rejected"}
        }}
    }));

    let error = client.browse(Some("HMI/")).await.unwrap_err();
    assert_eq!(error.as_server_error().unwrap().code, "7");
}

#[tokio::test]
async fn browse_path_filter_reaches_variables() {
    let (client, mock) = classic_client();
    mock.push_response(json!({"data": {"Browse": {"items": []}}}));
    client.browse(Some("HMI/Motors")).await.unwrap();

    let (client, unified_mock) = unified_client();
    unified_mock.push_response(json!({"data": {"browse": []}}));
    client.browse(Some("HMI/Motors")).await.unwrap();

    assert_eq!(mock.requests()[0]["variables"]["path"], "HMI/Motors");
    assert_eq!(
        unified_mock.requests()[0]["variables"]["nameFilters"],
        json!(["HMI/Motors"])
    );
}

// =============================================================================
// Alarm Operations
// =============================================================================

#[tokio::test]
async fn acknowledge_numeric_identifier_uses_instance_id_mode() {
    let (client, mock) = unified_client();
    mock.push_response(json!({"data": {"acknowledgeAlarms": [{"alarmInstanceID": 42}]}}));

    client.acknowledge_alarm("42").await.unwrap();

    let input = &mock.requests()[0]["variables"]["input"][0];
    assert_eq!(input["instanceID"], 42);
    assert!(input.get("name").is_none());
}

#[tokio::test]
async fn acknowledge_symbolic_identifier_uses_name_mode() {
    let (client, mock) = unified_client();
    mock.push_response(json!({"data": {"acknowledgeAlarms": [{"alarmName": "Tag_X"}]}}));

    client.acknowledge_alarm("Tag_X").await.unwrap();

    let input = &mock.requests()[0]["variables"]["input"][0];
    assert_eq!(input["name"], "Tag_X");
    assert!(input.get("instanceID").is_none());
}

#[tokio::test]
async fn acknowledge_empty_identifier_is_rejected() {
    let (client, mock) = unified_client();
    let error = client.acknowledge_alarm("").await.unwrap_err();
    assert_eq!(error.category(), "validation");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn active_alarms_map_instance_ids_to_strings() {
    let (client, mock) = unified_client();
    mock.push_response(json!({
        "data": {"activeAlarms": [{
            "name": "Tank_High",
            "instanceID": 7,
            "state": "RAISED",
            "eventText": ["level high"],
            "alarmClassName": "Warning",
            "raiseTime": "2025-06-01T12:30:00Z"
        }]}
    }));

    let alarms = client.active_alarms().await.unwrap();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].id, "7");
    assert_eq!(alarms[0].class_name, "Warning");
    assert!(alarms[0].come_time.is_some());
    assert!(alarms[0].go_time.is_none());
}

#[tokio::test]
async fn reset_alarm_classic_passes_identifier_through() {
    let (client, mock) = classic_client();
    mock.push_response(json!({"data": {"ResetAlarm": {}}}));

    client.reset_alarm("Tank_High").await.unwrap();
    assert_eq!(mock.requests()[0]["variables"]["alarmId"], "Tank_High");
}

// =============================================================================
// Wire Format
// =============================================================================

#[tokio::test]
async fn request_envelope_has_query_and_variables() {
    let (client, mock) = unified_client();
    mock.push_response(json!({"data": {"tagValues": []}}));

    client.read_tags(&[TagName::new("T")]).await.unwrap();

    let request = &mock.requests()[0];
    let query = request["query"].as_str().unwrap();
    assert!(query.starts_with("query TagValues"));
    assert_eq!(request["variables"]["names"], json!(["T"]));
    assert_eq!(request["variables"]["directRead"], false);
}

#[tokio::test]
async fn tag_values_with_special_characters_survive_the_envelope() {
    let (client, mock) = unified_client();
    mock.push_response(json!({"data": {"writeTagValues": []}}));

    let tricky = "line1\nline2\t\"quoted\" back\\slash";
    let writes = [TagWrite::new("T", tricky)];
    client.write_tags(&writes).await.unwrap();

    // The mock parses the body as JSON, so this round-trips the escaping.
    let sent = &mock.requests()[0]["variables"]["input"][0]["value"];
    assert_eq!(sent.as_str().unwrap(), tricky);
}
