// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Current schema generation.
//!
//! This generation uses camelCase operation names (`tagValues`, `browse`,
//! `activeAlarms`), issues a bare token at login (no separate session id),
//! nests tag values inside `value { value timestamp quality }`, and
//! addresses alarms through structured `AlarmIdentifierInput` objects.

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
use crate::response::{item_error, str_field, str_field_or_default, ResponseEnvelope};
use crate::session::Session;

use super::{ensure_not_empty, SchemaMapper};

// =============================================================================
// Query Documents
// =============================================================================

const LOGIN: &str = "mutation Login($username: String!, $password: String!) { \
    login(username: $username, password: $password) { \
    token expires error { code description } } }";

const LOGOUT: &str = "mutation Logout($allSessions: Boolean) { \
    logout(allSessions: $allSessions) }";

const EXTEND_SESSION: &str = "mutation ExtendSession { \
    extendSession { \
    token expires error { code description } } }";

const TAG_VALUES: &str = "query TagValues($names: [String!]!, $directRead: Boolean = false) { \
    tagValues(names: $names, directRead: $directRead) { \
    name value { value timestamp quality { quality } } \
    error { code description } } }";

const WRITE_TAG_VALUES: &str = "mutation WriteTagValues($input: [TagValueInput]!) { \
    writeTagValues(input: $input) { \
    name error { code description } } }";

const BROWSE: &str = "query Browse($nameFilters: [String] = []) { \
    browse(nameFilters: $nameFilters) { \
    name displayName objectType dataType } }";

const ACTIVE_ALARMS: &str = "query ActiveAlarms($systemNames: [String] = [], $filterString: String = \"\", $filterLanguage: String = \"en-US\", $languages: [String] = [\"en-US\"]) { \
    activeAlarms(systemNames: $systemNames, filterString: $filterString, filterLanguage: $filterLanguage, languages: $languages) { \
    name instanceID state eventText alarmClassName \
    raiseTime clearTime acknowledgmentTime \
    error { code description } } }";

const LOGGED_ALARMS: &str = "query LoggedAlarms($systemNames: [String] = [], $filterString: String = \"\", $filterLanguage: String = \"en-US\", $languages: [String] = [\"en-US\"], $startTime: Timestamp, $endTime: Timestamp) { \
    loggedAlarms(systemNames: $systemNames, filterString: $filterString, filterLanguage: $filterLanguage, languages: $languages, startTime: $startTime, endTime: $endTime) { \
    name instanceID state eventText alarmClassName \
    raiseTime clearTime acknowledgmentTime \
    error { code description } } }";

const ACKNOWLEDGE_ALARMS: &str = "mutation AcknowledgeAlarms($input: [AlarmIdentifierInput]!) { \
    acknowledgeAlarms(input: $input) { \
    alarmName alarmInstanceID error { code description } } }";

const RESET_ALARMS: &str = "mutation ResetAlarms($input: [AlarmIdentifierInput]!) { \
    resetAlarms(input: $input) { \
    alarmName alarmInstanceID error { code description } } }";

const LOGGED_TAG_VALUES: &str = "query LoggedTagValues($names: [String]!, $startTime: Timestamp, $endTime: Timestamp, $maxNumberOfValues: Int = 0) { \
    loggedTagValues(names: $names, startTime: $startTime, endTime: $endTime, maxNumberOfValues: $maxNumberOfValues) { \
    loggingTagName error { code description } \
    values { value { value timestamp quality { quality } } } } }";

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// =============================================================================
// UnifiedSchema
// =============================================================================

/// Mapper for the current schema generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedSchema;

impl UnifiedSchema {
    /// Renders an alarm identifier into its `AlarmIdentifierInput` shape.
    fn identifier_input(identifier: &AlarmIdentifier) -> Value {
        match identifier {
            AlarmIdentifier::InstanceId(id) => json!({ "instanceID": id }),
            AlarmIdentifier::Name(name) => json!({ "name": name }),
        }
    }

    /// Extracts the display text; `eventText` arrives as a string list.
    fn event_text(item: &Value) -> String {
        match item.get("eventText") {
            Some(Value::Array(texts)) => texts
                .iter()
                .filter_map(Value::as_str)
                .find(|s| !s.is_empty())
                .unwrap_or_default()
                .to_string(),
            Some(Value::String(text)) => text.clone(),
            _ => String::new(),
        }
    }

    /// Reads the nested quality code from a `value` object.
    fn nested_quality(value: &Value) -> Option<String> {
        value
            .get("quality")
            .and_then(|q| q.get("quality"))
            .and_then(normalize_value)
    }

    fn parse_alarm_rows(items: &[Value]) -> Vec<Alarm> {
        items
            .iter()
            .map(|item| {
                let error = item_error(item);
                let name = str_field_or_default(item, "name");
                Alarm {
                    id: item
                        .get("instanceID")
                        .and_then(format_instance_id)
                        .unwrap_or_else(|| name.clone()),
                    state: str_field_or_default(item, "state"),
                    text: Self::event_text(item),
                    class_name: str_field_or_default(item, "alarmClassName"),
                    come_time: item.get("raiseTime").and_then(parse_timestamp),
                    go_time: item.get("clearTime").and_then(parse_timestamp),
                    ack_time: item.get("acknowledgmentTime").and_then(parse_timestamp),
                    name,
                    error,
                }
            })
            .collect()
    }

    fn parse_ack_shaped(envelope: &ResponseEnvelope, operation: &str) -> WinccResult<()> {
        for item in envelope.operation_items(operation) {
            if let Some(error) = item_error(item) {
                return Err(WinccError::server(error));
            }
        }
        Ok(())
    }
}

impl SchemaMapper for UnifiedSchema {
    fn generation(&self) -> SchemaGeneration {
        SchemaGeneration::Unified
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
        let Some(login) = envelope.operation("login") else {
            return Err(WinccError::server(ServerError::new(
                "LOGIN_FAILED",
                "login response carried no result",
            )));
        };

        if let Some(error) = item_error(login) {
            return Err(WinccError::server(error));
        }

        match login.get("token").and_then(Value::as_str) {
            // No separate session id in this generation; the token is it.
            Some(token) => Ok(Session::from_token(token)),
            None => Err(WinccError::server(ServerError::new(
                "LOGIN_FAILED",
                "login response carried no token",
            ))),
        }
    }

    fn build_logout(&self, _session: &Session) -> GraphqlRequest {
        GraphqlRequest::new(LOGOUT).with_variables(json!({ "allSessions": false }))
    }

    fn build_extend_session(&self, _session: &Session) -> GraphqlRequest {
        GraphqlRequest::new(EXTEND_SESSION)
    }

    fn parse_extend_session(
        &self,
        envelope: &ResponseEnvelope,
        current: &Session,
    ) -> WinccResult<Session> {
        let Some(result) = envelope.operation("extendSession") else {
            return Ok(current.clone());
        };

        if let Some(error) = item_error(result) {
            return Err(WinccError::server(error));
        }

        // An extension issues a fresh token that replaces the stored one.
        match result.get("token").and_then(Value::as_str) {
            Some(token) => Ok(Session::from_token(token)),
            None => Ok(current.clone()),
        }
    }

    // =========================================================================
    // Tag Operations
    // =========================================================================

    fn build_read_tags(&self, names: &[TagName]) -> WinccResult<GraphqlRequest> {
        ensure_not_empty(names, "tag names")?;
        let names: Vec<&str> = names.iter().map(TagName::as_str).collect();
        Ok(GraphqlRequest::new(TAG_VALUES).with_variables(json!({
            "names": names,
            "directRead": false,
        })))
    }

    fn parse_read_tags(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<TagValue>> {
        let results = envelope
            .operation_items("tagValues")
            .iter()
            .map(|item| {
                let name = TagName::new(str_field_or_default(item, "name"));
                if let Some(error) = item_error(item) {
                    return TagValue::failed(name, error);
                }

                let Some(value) = item.get("value") else {
                    return TagValue {
                        name,
                        value: None,
                        quality: None,
                        timestamp: None,
                        error: None,
                    };
                };

                TagValue {
                    name,
                    value: value.get("value").and_then(normalize_value),
                    quality: Self::nested_quality(value),
                    timestamp: value.get("timestamp").and_then(parse_timestamp),
                    error: None,
                }
            })
            .collect();
        Ok(results)
    }

    fn build_write_tags(&self, writes: &[TagWrite]) -> WinccResult<GraphqlRequest> {
        ensure_not_empty(writes, "tag writes")?;
        let input: Vec<Value> = writes
            .iter()
            .map(|w| json!({ "name": w.name.as_str(), "value": w.value }))
            .collect();
        Ok(GraphqlRequest::new(WRITE_TAG_VALUES).with_variables(json!({ "input": input })))
    }

    fn parse_write_tags(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<WriteOutcome>> {
        let results = envelope
            .operation_items("writeTagValues")
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
        GraphqlRequest::new(LOGGED_TAG_VALUES).with_variables(json!({
            "names": [name.as_str()],
            "startTime": rfc3339(start),
            "endTime": rfc3339(end),
            "maxNumberOfValues": max_values.unwrap_or(0),
        }))
    }

    fn parse_tag_history(
        &self,
        envelope: &ResponseEnvelope,
        name: &TagName,
    ) -> WinccResult<TagHistory> {
        let Some(result) = envelope.operation_items("loggedTagValues").first() else {
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
                    .filter_map(|v| v.get("value"))
                    .map(|v| LoggedValue {
                        value: v.get("value").and_then(normalize_value).unwrap_or_default(),
                        quality: Self::nested_quality(v),
                        timestamp: v.get("timestamp").and_then(parse_timestamp),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(TagHistory {
            name: TagName::new(
                str_field(result, "loggingTagName").unwrap_or_else(|| name.as_str().to_string()),
            ),
            values: if error.is_some() { Vec::new() } else { values },
            error,
        })
    }

    // =========================================================================
    // Browse
    // =========================================================================

    fn build_browse(&self, path_filter: Option<&str>) -> GraphqlRequest {
        let filters: Vec<&str> = path_filter.into_iter().collect();
        GraphqlRequest::new(BROWSE).with_variables(json!({ "nameFilters": filters }))
    }

    fn parse_browse(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<BrowseItem>> {
        let items = envelope
            .operation_items("browse")
            .iter()
            .map(|item| {
                let name = str_field_or_default(item, "name");
                BrowseItem {
                    // The qualified name is the only address this
                    // generation reports.
                    address: name.clone(),
                    name: str_field(item, "displayName").unwrap_or(name),
                    object_type: str_field_or_default(item, "objectType"),
                    children_count: 0,
                }
            })
            .collect();
        Ok(items)
    }

    // =========================================================================
    // Alarm Operations
    // =========================================================================

    fn build_active_alarms(&self) -> GraphqlRequest {
        GraphqlRequest::new(ACTIVE_ALARMS).with_variables(json!({
            "systemNames": [],
            "filterString": "",
            "filterLanguage": "en-US",
            "languages": ["en-US"],
        }))
    }

    fn parse_active_alarms(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<Alarm>> {
        Ok(Self::parse_alarm_rows(
            envelope.operation_items("activeAlarms"),
        ))
    }

    fn build_alarm_history(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> GraphqlRequest {
        GraphqlRequest::new(LOGGED_ALARMS).with_variables(json!({
            "systemNames": [],
            "filterString": "",
            "filterLanguage": "en-US",
            "languages": ["en-US"],
            "startTime": rfc3339(start),
            "endTime": rfc3339(end),
        }))
    }

    fn parse_alarm_history(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<Alarm>> {
        Ok(Self::parse_alarm_rows(
            envelope.operation_items("loggedAlarms"),
        ))
    }

    fn build_acknowledge_alarm(&self, identifier: &AlarmIdentifier) -> GraphqlRequest {
        GraphqlRequest::new(ACKNOWLEDGE_ALARMS).with_variables(json!({
            "input": [Self::identifier_input(identifier)],
        }))
    }

    fn parse_acknowledge_alarm(&self, envelope: &ResponseEnvelope) -> WinccResult<()> {
        Self::parse_ack_shaped(envelope, "acknowledgeAlarms")
    }

    fn build_reset_alarm(&self, identifier: &AlarmIdentifier) -> GraphqlRequest {
        GraphqlRequest::new(RESET_ALARMS).with_variables(json!({
            "input": [Self::identifier_input(identifier)],
        }))
    }

    fn parse_reset_alarm(&self, envelope: &ResponseEnvelope) -> WinccResult<()> {
        Self::parse_ack_shaped(envelope, "resetAlarms")
    }
}

// =============================================================================
// Tests
// =============================================================================
