// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Legacy schema generation.
//!
//! This generation uses PascalCase operation names (`ReadTags`, `Browse`,
//! `GetActiveAlarms`), issues a separate session id at login, and addresses
//! alarms by a single opaque `alarmId` argument.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use winccua_core::convert::{format_instance_id, normalize_value, parse_timestamp};
use winccua_core::error::{ServerError, WinccError, WinccResult};
use winccua_core::types::{
    Alarm, AlarmIdentifier, BrowseItem, LoggedValue, TagHistory, TagName, TagValue, TagWrite,
    WriteOutcome,
};

use crate::config::SchemaGeneration;
use crate::request::GraphqlRequest;
use crate::response::{item_error, str_field_or_default, ResponseEnvelope};
use crate::session::Session;

use super::{ensure_not_empty, SchemaMapper};

// =============================================================================
// Query Documents
// =============================================================================

const LOGIN: &str = "mutation Login($username: String!, $password: String!) { \
    Login(user: $username, password: $password) { \
    token sessionId error { code description } } }";

const LOGOUT: &str = "mutation Logout($sessionId: ID!) { \
    Logout(sessionId: $sessionId) { \
    error { code description } } }";

const EXTEND_SESSION: &str = "mutation ExtendSession($sessionId: ID!) { \
    ExtendSession(sessionId: $sessionId) { \
    error { code description } } }";

const READ_TAGS: &str = "query ReadTags($tags: [String!]!) { \
    ReadTags(tags: $tags) { \
    name value quality timestamp error { code description } } }";

const WRITE_TAGS: &str = "mutation WriteTags($tags: [TagInput!]!) { \
    WriteTags(tags: $tags) { \
    name error { code description } } }";

const BROWSE: &str = "query Browse($path: String) { \
    Browse(path: $path) { \
    items { name type address childrenCount } \
    error { code description } } }";

const GET_ACTIVE_ALARMS: &str = "query GetActiveAlarms { \
    GetActiveAlarms { \
    id state name text className comeTime goTime ackTime \
    error { code description } } }";

const GET_ALARM_HISTORY: &str = "query GetAlarmHistory($startTime: DateTime!, $endTime: DateTime!) { \
    GetAlarmHistory(startTime: $startTime, endTime: $endTime) { \
    id state name text className comeTime goTime ackTime \
    error { code description } } }";

const ACKNOWLEDGE_ALARM: &str = "mutation AcknowledgeAlarm($alarmId: ID!) { \
    AcknowledgeAlarm(alarmId: $alarmId) { \
    error { code description } } }";

const RESET_ALARM: &str = "mutation ResetAlarm($alarmId: ID!) { \
    ResetAlarm(alarmId: $alarmId) { \
    error { code description } } }";

const READ_HISTORICAL_VALUES: &str = "query ReadHistoricalValues($tag: String!, $startTime: DateTime!, $endTime: DateTime!, $maxValues: Int) { \
    ReadHistoricalValues(tag: $tag, startTime: $startTime, endTime: $endTime, maxValues: $maxValues) { \
    name values { value quality timestamp } error { code description } } }";

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// =============================================================================
// ClassicSchema
// =============================================================================

/// Mapper for the legacy schema generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicSchema;

impl ClassicSchema {
    fn parse_alarm_rows(items: &[Value]) -> Vec<Alarm> {
        items
            .iter()
            .map(|item| {
                let error = item_error(item);
                Alarm {
                    id: item
                        .get("id")
                        .and_then(format_instance_id)
                        .unwrap_or_default(),
                    state: str_field_or_default(item, "state"),
                    name: str_field_or_default(item, "name"),
                    text: str_field_or_default(item, "text"),
                    class_name: str_field_or_default(item, "className"),
                    come_time: item.get("comeTime").and_then(parse_timestamp),
                    go_time: item.get("goTime").and_then(parse_timestamp),
                    ack_time: item.get("ackTime").and_then(parse_timestamp),
                    error,
                }
            })
            .collect()
    }

    fn parse_ack_shaped(envelope: &ResponseEnvelope, operation: &str) -> WinccResult<()> {
        let Some(result) = envelope.operation(operation) else {
            return Ok(());
        };
        match item_error(result) {
            Some(error) => Err(WinccError::server(error)),
            None => Ok(()),
        }
    }
}

impl SchemaMapper for ClassicSchema {
    fn generation(&self) -> SchemaGeneration {
        SchemaGeneration::Classic
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    fn build_login(&self, username: &str, password: &str) -> GraphqlRequest {
        GraphqlRequest::new(LOGIN).with_variables(json!({
            "username": username,
            "password": password,
        }))
    }

    fn parse_login(&self, envelope: &ResponseEnvelope) -> WinccResult<Session> {
        let Some(login) = envelope.operation("Login") else {
            return Err(WinccError::server(ServerError::new(
                "LOGIN_FAILED",
                "login response carried no result",
            )));
        };

        if let Some(error) = item_error(login) {
            return Err(WinccError::server(error));
        }

        let token = login.get("token").and_then(Value::as_str);
        let session_id = login.get("sessionId").and_then(Value::as_str);

        match (token, session_id) {
            (Some(token), Some(session_id)) => Ok(Session::new(token, session_id)),
            _ => Err(WinccError::server(ServerError::new(
                "LOGIN_FAILED",
                "login response carried no token",
            ))),
        }
    }

    fn build_logout(&self, session: &Session) -> GraphqlRequest {
        GraphqlRequest::new(LOGOUT).with_variables(json!({
            "sessionId": session.session_id,
        }))
    }

    fn build_extend_session(&self, session: &Session) -> GraphqlRequest {
        GraphqlRequest::new(EXTEND_SESSION).with_variables(json!({
            "sessionId": session.session_id,
        }))
    }

    fn parse_extend_session(
        &self,
        envelope: &ResponseEnvelope,
        current: &Session,
    ) -> WinccResult<Session> {
        Self::parse_ack_shaped(envelope, "ExtendSession")?;
        // This generation keeps the token stable across extensions.
        Ok(current.clone())
    }

    // =========================================================================
    // Tag Operations
    // =========================================================================

    fn build_read_tags(&self, names: &[TagName]) -> WinccResult<GraphqlRequest> {
        ensure_not_empty(names, "tag names")?;
        let tags: Vec<&str> = names.iter().map(TagName::as_str).collect();
        Ok(GraphqlRequest::new(READ_TAGS).with_variables(json!({ "tags": tags })))
    }

    fn parse_read_tags(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<TagValue>> {
        let results = envelope
            .operation_items("ReadTags")
            .iter()
            .map(|item| {
                let name = TagName::new(str_field_or_default(item, "name"));
                if let Some(error) = item_error(item) {
                    return TagValue::failed(name, error);
                }
                TagValue {
                    name,
                    value: item.get("value").and_then(normalize_value),
                    quality: item.get("quality").and_then(normalize_value),
                    timestamp: item.get("timestamp").and_then(parse_timestamp),
                    error: None,
                }
            })
            .collect();
        Ok(results)
    }

    fn build_write_tags(&self, writes: &[TagWrite]) -> WinccResult<GraphqlRequest> {
        ensure_not_empty(writes, "tag writes")?;
        let tags: Vec<Value> = writes
            .iter()
            .map(|w| json!({ "name": w.name.as_str(), "value": w.value }))
            .collect();
        Ok(GraphqlRequest::new(WRITE_TAGS).with_variables(json!({ "tags": tags })))
    }

    fn parse_write_tags(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<WriteOutcome>> {
        let results = envelope
            .operation_items("WriteTags")
            .iter()
            .map(|item| WriteOutcome {
                name: TagName::new(str_field_or_default(item, "name")),
                error: item_error(item),
            })
            .collect();
        Ok(results)
    }

    fn build_tag_history(
        &self,
        name: &TagName,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_values: Option<u32>,
    ) -> GraphqlRequest {
        let mut variables = json!({
            "tag": name.as_str(),
            "startTime": rfc3339(start),
            "endTime": rfc3339(end),
        });
        if let Some(max) = max_values {
            variables["maxValues"] = json!(max);
        }
        GraphqlRequest::new(READ_HISTORICAL_VALUES).with_variables(variables)
    }

    fn parse_tag_history(
        &self,
        envelope: &ResponseEnvelope,
        name: &TagName,
    ) -> WinccResult<TagHistory> {
        let Some(result) = envelope.operation("ReadHistoricalValues") else {
            return Ok(TagHistory {
                name: name.clone(),
                values: Vec::new(),
                error: None,
            });
        };

        let error = item_error(result);
        let values = result
            .get("values")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .map(|v| LoggedValue {
                        value: v.get("value").and_then(normalize_value).unwrap_or_default(),
                        quality: v.get("quality").and_then(normalize_value),
                        timestamp: v.get("timestamp").and_then(parse_timestamp),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(TagHistory {
            name: TagName::new(
                result
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or(name.as_str()),
            ),
            values: if error.is_some() { Vec::new() } else { values },
            error,
        })
    }

    // =========================================================================
    // Browse
    // =========================================================================

    fn build_browse(&self, path_filter: Option<&str>) -> GraphqlRequest {
        let request = GraphqlRequest::new(BROWSE);
        match path_filter {
            Some(path) => request.with_variables(json!({ "path": path })),
            None => request,
        }
    }

    fn parse_browse(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<BrowseItem>> {
        let Some(browse) = envelope.operation("Browse") else {
            return Ok(Vec::new());
        };

        // A top-level error fails the whole call, even when items are
        // present alongside it.
        if let Some(error) = item_error(browse) {
            return Err(WinccError::server(error));
        }

        let items = browse
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| BrowseItem {
                        name: str_field_or_default(item, "name"),
                        object_type: str_field_or_default(item, "type"),
                        address: str_field_or_default(item, "address"),
                        children_count: item
                            .get("childrenCount")
                            .and_then(Value::as_u64)
                            .unwrap_or(0),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(items)
    }

    // =========================================================================
    // Alarm Operations
    // =========================================================================

    fn build_active_alarms(&self) -> GraphqlRequest {
        GraphqlRequest::new(GET_ACTIVE_ALARMS)
    }

    fn parse_active_alarms(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<Alarm>> {
        Ok(Self::parse_alarm_rows(
            envelope.operation_items("GetActiveAlarms"),
        ))
    }

    fn build_alarm_history(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> GraphqlRequest {
        GraphqlRequest::new(GET_ALARM_HISTORY).with_variables(json!({
            "startTime": rfc3339(start),
            "endTime": rfc3339(end),
        }))
    }

    fn parse_alarm_history(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<Alarm>> {
        Ok(Self::parse_alarm_rows(
            envelope.operation_items("GetAlarmHistory"),
        ))
    }

    fn build_acknowledge_alarm(&self, identifier: &AlarmIdentifier) -> GraphqlRequest {
        // Both addressing modes travel as the opaque ID argument here.
        GraphqlRequest::new(ACKNOWLEDGE_ALARM).with_variables(json!({
            "alarmId": identifier.to_string(),
        }))
    }

    fn parse_acknowledge_alarm(&self, envelope: &ResponseEnvelope) -> WinccResult<()> {
        Self::parse_ack_shaped(envelope, "AcknowledgeAlarm")
    }

    fn build_reset_alarm(&self, identifier: &AlarmIdentifier) -> GraphqlRequest {
        GraphqlRequest::new(RESET_ALARM).with_variables(json!({
            "alarmId": identifier.to_string(),
        }))
    }

    fn parse_reset_alarm(&self, envelope: &ResponseEnvelope) -> WinccResult<()> {
        Self::parse_ack_shaped(envelope, "ResetAlarm")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(value: Value) -> ResponseEnvelope {
        ResponseEnvelope::parse(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_login_round_trip() {
        let schema = ClassicSchema;
        let request = schema.build_login("admin", "secret");
        assert_eq!(request.variables.unwrap()["username"], "admin");

        let env = envelope(json!({
            "data": {"Login": {"token": "tok", "sessionId": "sess"}}
        }));
        let session = schema.parse_login(&env).unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.session_id, "sess");
    }

    #[test]
    fn test_login_error_is_server_error() {
        let env = envelope(json!({
            "data": {"Login": {"error": {"code": "401", "description": "bad credentials"}}}
        }));
        let error = ClassicSchema.parse_login(&env).unwrap_err();
        assert_eq!(error.as_server_error().unwrap().code, "401");
    }

    #[test]
    fn test_login_without_token_fails() {
        let env = envelope(json!({"data": {"Login": {}}}));
        let error = ClassicSchema.parse_login(&env).unwrap_err();
        assert_eq!(error.category(), "server");
    }

    #[test]
    fn test_read_tags_rejects_empty_list() {
        let error = ClassicSchema.build_read_tags(&[]).unwrap_err();
        assert_eq!(error.category(), "validation");
    }

    #[test]
    fn test_read_tags_partial_failure() {
        let env = envelope(json!({
            "data": {"ReadTags": [
                {"name": "A", "value": "1", "quality": "GOOD", "timestamp": "2025-06-01T00:00:00Z"},
                {"name": "B", "error": {"code": "101", "description": "not found"}},
                {"name": "C", "value": 3.0, "quality": "GOOD"},
            ]}
        }));

        let results = ClassicSchema.parse_read_tags(&env).unwrap();
        assert_eq!(results.len(), 3);

        assert!(results[0].is_good());
        assert_eq!(results[0].value.as_deref(), Some("1"));

        assert!(!results[1].is_good());
        assert!(results[1].value.is_none());

        // Numeric values normalize to canonical strings.
        assert_eq!(results[2].value.as_deref(), Some("3"));
    }

    #[test]
    fn test_browse_top_level_error_wins_over_items() {
        let env = envelope(json!({
            "data": {"Browse": {
                "items": [{"name": "N", "type": "Tag", "address": "HMI/N", "childrenCount": 2}],
                "error": {"code": "7", "description": "path rejected"}
            }}
        }));

        let error = ClassicSchema.parse_browse(&env).unwrap_err();
        assert_eq!(error.as_server_error().unwrap().code, "7");
    }

    #[test]
    fn test_browse_items_and_unknown_child_count() {
        let env = envelope(json!({
            "data": {"Browse": {"items": [
                {"name": "N", "type": "Folder", "address": "HMI/N", "childrenCount": 2},
                {"name": "M", "type": "Tag", "address": "HMI/M"},
            ]}}
        }));

        let items = ClassicSchema.parse_browse(&env).unwrap();
        assert_eq!(items[0].children_count, 2);
        // Unknown child count reports as 0, not absence.
        assert_eq!(items[1].children_count, 0);
    }

    #[test]
    fn test_acknowledge_variables_pass_identifier_through() {
        let schema = ClassicSchema;

        let request = schema.build_acknowledge_alarm(&AlarmIdentifier::parse("42"));
        assert_eq!(request.variables.unwrap()["alarmId"], "42");

        let request = schema.build_acknowledge_alarm(&AlarmIdentifier::parse("Tag_X"));
        assert_eq!(request.variables.unwrap()["alarmId"], "Tag_X");
    }

    #[test]
    fn test_active_alarms_with_epoch_times() {
        let env = envelope(json!({
            "data": {"GetActiveAlarms": [{
                "id": "17", "state": "RAISED", "name": "Tank_High",
                "text": "level high", "className": "Warning",
                "comeTime": 1717243800,
            }]}
        }));

        let alarms = ClassicSchema.parse_active_alarms(&env).unwrap();
        assert_eq!(alarms[0].id, "17");
        assert!(alarms[0].come_time.is_some());
        assert!(alarms[0].go_time.is_none());
    }

    #[test]
    fn test_tag_history_maps_values() {
        let env = envelope(json!({
            "data": {"ReadHistoricalValues": {
                "name": "Motor_1.Speed",
                "values": [
                    {"value": 10.5, "quality": "GOOD", "timestamp": "2025-06-01T00:00:00Z"},
                    {"value": 11.0, "quality": "GOOD", "timestamp": "2025-06-01T00:01:00Z"},
                ]
            }}
        }));

        let history = ClassicSchema
            .parse_tag_history(&env, &TagName::new("Motor_1.Speed"))
            .unwrap();
        assert_eq!(history.values.len(), 2);
        assert_eq!(history.values[1].value, "11");
    }
}
