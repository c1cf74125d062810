// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Domain types for the WinCC Unified client.
//!
//! These types are schema-agnostic: both backend schema generations map
//! into the same shapes, so callers never see which generation produced a
//! result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ServerError;

// =============================================================================
// TagName
// =============================================================================

/// The name of a tag in the server's namespace.
///
/// Tags represent individual live data points (sensors, setpoints, process
/// values) addressed by their qualified name.
///
/// # Examples
///
/// ```
/// use winccua_core::types::TagName;
///
/// let name = TagName::new("Motor_1.Speed");
/// assert_eq!(name.as_str(), "Motor_1.Speed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Creates a new tag name.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TagName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TagName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// TagValue
// =============================================================================

/// The result of reading a single tag.
///
/// The value is always rendered as a canonical string regardless of the
/// underlying type on the server. When `error` is set the value fields are
/// absent; a result never carries both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagValue {
    /// The tag that was read.
    pub name: TagName,

    /// The value as a canonical string (absent on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Vendor quality code accompanying the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    /// Server timestamp of the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Per-tag error (set means this read failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServerError>,
}

impl TagValue {
    /// Creates a failed result carrying only an error.
    pub fn failed(name: TagName, error: ServerError) -> Self {
        Self {
            name,
            value: None,
            quality: None,
            timestamp: None,
            error: Some(error),
        }
    }

    /// Returns `true` if this read succeeded.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.error.is_none()
    }
}

// =============================================================================
// TagWrite
// =============================================================================

/// A single tag write request: name and the value to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagWrite {
    /// The tag to write.
    pub name: TagName,

    /// The value to write, rendered as a string.
    pub value: String,
}

impl TagWrite {
    /// Creates a new write request.
    pub fn new(name: impl Into<TagName>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The per-tag outcome of a write operation.
///
/// Outcomes follow the server's response order, which is not necessarily
/// the request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// The tag that was written.
    pub name: TagName,

    /// Per-tag error (set means this write failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServerError>,
}

impl WriteOutcome {
    /// Returns `true` if this write succeeded.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.error.is_none()
    }
}

// =============================================================================
// BrowseItem
// =============================================================================

/// A single node returned by a namespace browse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseItem {
    /// Display name of the node.
    pub name: String,

    /// Object/data type of the node.
    pub object_type: String,

    /// Namespace path of the node.
    pub address: String,

    /// Number of children under this node.
    ///
    /// An unknown count is reported as `0`, never as absence.
    pub children_count: u64,
}

// =============================================================================
// Alarms
// =============================================================================

/// An active or historical alarm instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Alarm identifier.
    ///
    /// Depending on the schema generation this is derived from a numeric
    /// instance id or from the alarm name.
    pub id: String,

    /// Current state (e.g. "RAISED", "ACKNOWLEDGED").
    pub state: String,

    /// Alarm name.
    pub name: String,

    /// Event text.
    pub text: String,

    /// Alarm class name.
    pub class_name: String,

    /// When the alarm was raised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub come_time: Option<DateTime<Utc>>,

    /// When the alarm condition cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_time: Option<DateTime<Utc>>,

    /// When the alarm was acknowledged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_time: Option<DateTime<Utc>>,

    /// Per-alarm error (set means this entry is invalid).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServerError>,
}

impl Alarm {
    /// Returns `true` if this entry carries no error.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.error.is_none()
    }
}

/// How an alarm is addressed in acknowledge/reset operations.
///
/// An identifier string that parses fully as an unsigned integer addresses
/// the alarm by its numeric instance id; any other string addresses it by
/// symbolic name.
///
/// # Examples
///
/// ```
/// use winccua_core::types::AlarmIdentifier;
///
/// assert_eq!(AlarmIdentifier::parse("42"), AlarmIdentifier::InstanceId(42));
/// assert_eq!(
///     AlarmIdentifier::parse("Valve_Stuck"),
///     AlarmIdentifier::Name("Valve_Stuck".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmIdentifier {
    /// Numeric instance id.
    InstanceId(u64),

    /// Symbolic alarm name.
    Name(String),
}

impl AlarmIdentifier {
    /// Parses an identifier string into its addressing mode.
    pub fn parse(identifier: &str) -> Self {
        match identifier.parse::<u64>() {
            Ok(id) => Self::InstanceId(id),
            Err(_) => Self::Name(identifier.to_string()),
        }
    }
}

impl fmt::Display for AlarmIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstanceId(id) => write!(f, "{}", id),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

// =============================================================================
// Historical Values
// =============================================================================

/// A single logged value from a tag's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedValue {
    /// The value as a canonical string.
    pub value: String,

    /// Vendor quality code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    /// When the value was logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Logged history of a single tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagHistory {
    /// The tag (or logging tag) the history belongs to.
    pub name: TagName,

    /// The logged values in the server's sorting order.
    pub values: Vec<LoggedValue>,

    /// Error for the whole history query of this tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServerError>,
}

// =============================================================================
// Tests
// =============================================================================
