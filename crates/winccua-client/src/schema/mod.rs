// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Schema generation mapping layer.
//!
//! The two backend schema generations expose the same functionality behind
//! divergent GraphQL shapes. This module defines the [`SchemaMapper`] trait
//! (one `build_*`/`parse_*` pair per operation) with one concrete
//! implementation per generation. The mapper is selected once, at client
//! construction; no generation-specific branching exists anywhere else.

use chrono::{DateTime, Utc};

use winccua_core::error::{WinccError, WinccResult};
use winccua_core::types::{
    Alarm, AlarmIdentifier, BrowseItem, TagHistory, TagName, TagValue, TagWrite, WriteOutcome,
};

use crate::config::SchemaGeneration;
use crate::request::GraphqlRequest;
use crate::response::ResponseEnvelope;
use crate::session::Session;

pub mod classic;
pub mod unified;

pub use classic::ClassicSchema;
pub use unified::UnifiedSchema;

// =============================================================================
// SchemaMapper Trait
// =============================================================================

/// Maps typed operations onto one backend schema generation.
///
/// Builders produce the operation's fixed query document together with its
/// variables object; parsers convert the response envelope back into the
/// shared domain types, collecting per-item errors without aborting the
/// batch.
pub trait SchemaMapper: Send + Sync {
    /// The generation this mapper speaks.
    fn generation(&self) -> SchemaGeneration;

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Builds the login mutation.
    fn build_login(&self, username: &str, password: &str) -> GraphqlRequest;

    /// Parses the login response into a session.
    fn parse_login(&self, envelope: &ResponseEnvelope) -> WinccResult<Session>;

    /// Builds the logout mutation for the given session.
    fn build_logout(&self, session: &Session) -> GraphqlRequest;

    /// Builds the session extension mutation.
    fn build_extend_session(&self, session: &Session) -> GraphqlRequest;

    /// Parses the extension response, yielding the session to keep using.
    fn parse_extend_session(
        &self,
        envelope: &ResponseEnvelope,
        current: &Session,
    ) -> WinccResult<Session>;

    // =========================================================================
    // Tag Operations
    // =========================================================================

    /// Builds the read query for the given tag names.
    ///
    /// # Errors
    ///
    /// Rejects an empty name list before any request is built.
    fn build_read_tags(&self, names: &[TagName]) -> WinccResult<GraphqlRequest>;

    /// Parses the read response, one result per server row.
    fn parse_read_tags(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<TagValue>>;

    /// Builds the write mutation for the given name/value pairs.
    ///
    /// # Errors
    ///
    /// Rejects an empty write list before any request is built.
    fn build_write_tags(&self, writes: &[TagWrite]) -> WinccResult<GraphqlRequest>;

    /// Parses the write response in the server's result order.
    fn parse_write_tags(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<WriteOutcome>>;

    /// Builds the history query for a single tag.
    fn build_tag_history(
        &self,
        name: &TagName,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_values: Option<u32>,
    ) -> GraphqlRequest;

    /// Parses the history response for the requested tag.
    fn parse_tag_history(
        &self,
        envelope: &ResponseEnvelope,
        name: &TagName,
    ) -> WinccResult<TagHistory>;

    // =========================================================================
    // Browse
    // =========================================================================

    /// Builds the namespace browse query.
    fn build_browse(&self, path_filter: Option<&str>) -> GraphqlRequest;

    /// Parses the browse response.
    fn parse_browse(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<BrowseItem>>;

    // =========================================================================
    // Alarm Operations
    // =========================================================================

    /// Builds the active-alarms query.
    fn build_active_alarms(&self) -> GraphqlRequest;

    /// Parses the active-alarms response.
    fn parse_active_alarms(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<Alarm>>;

    /// Builds the alarm-history query for the given time range.
    fn build_alarm_history(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> GraphqlRequest;

    /// Parses the alarm-history response.
    fn parse_alarm_history(&self, envelope: &ResponseEnvelope) -> WinccResult<Vec<Alarm>>;

    /// Builds the acknowledge mutation for one alarm.
    fn build_acknowledge_alarm(&self, identifier: &AlarmIdentifier) -> GraphqlRequest;

    /// Parses the acknowledge response.
    fn parse_acknowledge_alarm(&self, envelope: &ResponseEnvelope) -> WinccResult<()>;

    /// Builds the reset mutation for one alarm.
    fn build_reset_alarm(&self, identifier: &AlarmIdentifier) -> GraphqlRequest;

    /// Parses the reset response.
    fn parse_reset_alarm(&self, envelope: &ResponseEnvelope) -> WinccResult<()>;
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Rejects empty argument lists before a request is built.
///
/// Some schema variants produce malformed mutations from empty arrays, so
/// the check happens on the client side.
pub(crate) fn ensure_not_empty<T>(items: &[T], what: &str) -> WinccResult<()> {
    if items.is_empty() {
        Err(WinccError::validation(format!("{} must not be empty", what)))
    } else {
        Ok(())
    }
}

/// Creates the mapper for the configured generation.
pub fn mapper_for(generation: SchemaGeneration) -> Box<dyn SchemaMapper> {
    match generation {
        SchemaGeneration::Classic => Box::new(ClassicSchema),
        SchemaGeneration::Unified => Box::new(UnifiedSchema),
    }
}

// =============================================================================
// Tests
// =============================================================================
