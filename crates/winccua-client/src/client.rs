// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! High-level WinCC Unified client.
//!
//! `WinccClient` composes the transport, the schema mapper, and the session
//! manager into the public domain API. Every operation is a single
//! request/response round trip; there is no batching beyond what one call's
//! input list represents, and no pagination.
//!
//! A client handle assumes single-owner use. Sharing one handle across
//! concurrent tasks requires external synchronization around
//! connect/disconnect sequencing.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use winccua_core::error::{WinccError, WinccResult};
use winccua_core::types::{
    Alarm, AlarmIdentifier, BrowseItem, TagHistory, TagName, TagValue, TagWrite, WriteOutcome,
};

use crate::config::ClientConfig;
use crate::request::GraphqlRequest;
use crate::response::ResponseEnvelope;
use crate::schema::{mapper_for, SchemaMapper};
use crate::session::{SessionManager, SessionState};
use crate::transport::{GraphqlTransport, HttpTransport};

const AUTHORIZATION: &str = "Authorization";

// =============================================================================
// ClientStats
// =============================================================================

/// Statistics for client operations.
#[derive(Debug, Default)]
pub struct ClientStats {
    reads: AtomicU64,
    writes: AtomicU64,
    browses: AtomicU64,
    alarm_ops: AtomicU64,
    errors: AtomicU64,
}

impl ClientStats {
    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_browse(&self) {
        self.browses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_alarm_op(&self) {
        self.alarm_ops.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of read operations.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the total number of write operations.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the total number of browse operations.
    pub fn browses(&self) -> u64 {
        self.browses.load(Ordering::Relaxed)
    }

    /// Returns the total number of alarm operations.
    pub fn alarm_ops(&self) -> u64 {
        self.alarm_ops.load(Ordering::Relaxed)
    }

    /// Returns the total number of failed operations.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

// =============================================================================
// WinccClient
// =============================================================================

/// Client for a WinCC Unified server's GraphQL interface.
///
/// # Examples
///
/// ```rust,ignore
/// use winccua_client::{ClientConfig, WinccClient};
/// use winccua_core::types::TagName;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::builder()
///         .base_url("https://hmi-server:4443")
///         .credentials("operator", "secret")
///         .build()?;
///
///     let client = WinccClient::new(config)?;
///     client.connect().await?;
///
///     let values = client.read_tags(&[TagName::new("Motor_1.Speed")]).await?;
///     for value in &values {
///         println!("{} = {:?}", value.name, value.value);
///     }
///
///     client.disconnect().await;
///     Ok(())
/// }
/// ```
pub struct WinccClient {
    config: ClientConfig,
    transport: Box<dyn GraphqlTransport>,
    mapper: Box<dyn SchemaMapper>,
    session: SessionManager,
    stats: ClientStats,
}

impl WinccClient {
    /// Creates a client with the reqwest-backed transport.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid configuration or a
    /// connection error if the transport cannot be constructed.
    pub fn new(config: ClientConfig) -> WinccResult<Self> {
        config.validate()?;
        let transport = Box::new(HttpTransport::from_config(&config)?);
        Ok(Self::assemble(config, transport))
    }

    /// Creates a client over a custom transport.
    ///
    /// Used by tests and by embedders that bring their own HTTP stack.
    pub fn with_transport(
        config: ClientConfig,
        transport: Box<dyn GraphqlTransport>,
    ) -> WinccResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, transport))
    }

    fn assemble(config: ClientConfig, transport: Box<dyn GraphqlTransport>) -> Self {
        let mapper = mapper_for(config.generation);
        Self {
            config,
            transport,
            mapper,
            session: SessionManager::new(),
            stats: ClientStats::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Returns the client statistics.
    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// Returns the session statistics.
    pub fn session_stats(&self) -> &crate::session::SessionStats {
        self.session.stats()
    }

    // =========================================================================
    // Request Execution
    // =========================================================================

    async fn execute(&self, request: GraphqlRequest) -> WinccResult<ResponseEnvelope> {
        let result = self.try_execute(request).await;
        if result.is_err() {
            self.stats.record_error();
        }
        result
    }

    async fn try_execute(&self, request: GraphqlRequest) -> WinccResult<ResponseEnvelope> {
        let body = request.to_body();
        let bytes = self.transport.post(&body).await?;
        let envelope = ResponseEnvelope::parse(&bytes)?;
        envelope.ensure_no_graphql_errors()?;
        Ok(envelope)
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Authenticates and establishes a session.
    ///
    /// On success the bearer token is attached to every subsequent request.
    /// Connecting while already connected is allowed and replaces the prior
    /// session. On failure the client stays disconnected.
    pub async fn connect(&self) -> WinccResult<()> {
        let request = self
            .mapper
            .build_login(&self.config.username, &self.config.password);
        let envelope = self.execute(request).await?;

        match self.mapper.parse_login(&envelope) {
            Ok(session) => {
                self.transport
                    .set_header(AUTHORIZATION, &session.bearer_header());
                self.session.store(session);
                info!(
                    url = %self.config.graphql_url(),
                    generation = %self.config.generation,
                    "session established"
                );
                Ok(())
            }
            Err(error) => {
                self.session.record_failure();
                Err(error)
            }
        }
    }

    /// Terminates the session.
    ///
    /// The logout request is best-effort: a transport failure is logged and
    /// swallowed, and local state is cleared unconditionally. Calling this
    /// while disconnected is a no-op.
    pub async fn disconnect(&self) {
        if let Some(session) = self.session.session() {
            let request = self.mapper.build_logout(&session);
            if let Err(error) = self.execute(request).await {
                warn!(error = %error, "logout request failed, clearing session locally");
            }
        }

        self.transport.remove_header(AUTHORIZATION);
        if self.session.clear() {
            info!("session cleared");
        }
    }

    /// Extends the active session.
    ///
    /// On the current schema generation this replaces the stored token with
    /// the freshly issued one.
    pub async fn extend_session(&self) -> WinccResult<()> {
        let Some(current) = self.session.session() else {
            return Err(WinccError::validation("no active session to extend"));
        };

        let request = self.mapper.build_extend_session(&current);
        let envelope = self.execute(request).await?;
        let renewed = self.mapper.parse_extend_session(&envelope, &current)?;

        if renewed.token != current.token {
            debug!("session token renewed");
            self.transport
                .set_header(AUTHORIZATION, &renewed.bearer_header());
        }
        self.session.store(renewed);
        Ok(())
    }

    // =========================================================================
    // Tag Operations
    // =========================================================================

    /// Reads the current values of the given tags.
    ///
    /// Returns one result per server row in server order. Per-tag failures
    /// are attached to the affected result and never abort the batch.
    pub async fn read_tags(&self, names: &[TagName]) -> WinccResult<Vec<TagValue>> {
        let request = self.mapper.build_read_tags(names)?;
        let envelope = self.execute(request).await?;
        let results = self.mapper.parse_read_tags(&envelope)?;

        self.stats.record_read();
        debug!(requested = names.len(), returned = results.len(), "tags read");
        Ok(results)
    }

    /// Writes values to the given tags.
    ///
    /// Outcomes follow the server's response order.
    pub async fn write_tags(&self, writes: &[TagWrite]) -> WinccResult<Vec<WriteOutcome>> {
        let request = self.mapper.build_write_tags(writes)?;
        let envelope = self.execute(request).await?;
        let results = self.mapper.parse_write_tags(&envelope)?;

        self.stats.record_write();
        debug!(requested = writes.len(), returned = results.len(), "tags written");
        Ok(results)
    }

    /// Reads logged values of a single tag within a time range.
    pub async fn tag_history(
        &self,
        name: &TagName,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_values: Option<u32>,
    ) -> WinccResult<TagHistory> {
        let request = self.mapper.build_tag_history(name, start, end, max_values);
        let envelope = self.execute(request).await?;
        let history = self.mapper.parse_tag_history(&envelope, name)?;

        self.stats.record_read();
        Ok(history)
    }

    // =========================================================================
    // Browse
    // =========================================================================

    /// Enumerates namespace nodes, optionally under a path filter.
    pub async fn browse(&self, path_filter: Option<&str>) -> WinccResult<Vec<BrowseItem>> {
        let request = self.mapper.build_browse(path_filter);
        let envelope = self.execute(request).await?;
        let items = self.mapper.parse_browse(&envelope)?;

        self.stats.record_browse();
        debug!(items = items.len(), "namespace browsed");
        Ok(items)
    }

    // =========================================================================
    // Alarm Operations
    // =========================================================================

    /// Lists all currently active alarms.
    pub async fn active_alarms(&self) -> WinccResult<Vec<Alarm>> {
        let request = self.mapper.build_active_alarms();
        let envelope = self.execute(request).await?;
        let alarms = self.mapper.parse_active_alarms(&envelope)?;

        self.stats.record_alarm_op();
        Ok(alarms)
    }

    /// Lists logged alarms within a time range.
    pub async fn alarm_history(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> WinccResult<Vec<Alarm>> {
        let request = self.mapper.build_alarm_history(start, end);
        let envelope = self.execute(request).await?;
        let alarms = self.mapper.parse_alarm_history(&envelope)?;

        self.stats.record_alarm_op();
        Ok(alarms)
    }

    /// Acknowledges one alarm.
    ///
    /// An identifier that parses fully as an integer addresses the alarm by
    /// instance id; any other string addresses it by name.
    pub async fn acknowledge_alarm(&self, identifier: &str) -> WinccResult<()> {
        let identifier = self.parse_identifier(identifier)?;
        let request = self.mapper.build_acknowledge_alarm(&identifier);
        let envelope = self.execute(request).await?;
        self.mapper.parse_acknowledge_alarm(&envelope)?;

        self.stats.record_alarm_op();
        info!(alarm = %identifier, "alarm acknowledged");
        Ok(())
    }

    /// Resets one alarm.
    pub async fn reset_alarm(&self, identifier: &str) -> WinccResult<()> {
        let identifier = self.parse_identifier(identifier)?;
        let request = self.mapper.build_reset_alarm(&identifier);
        let envelope = self.execute(request).await?;
        self.mapper.parse_reset_alarm(&envelope)?;

        self.stats.record_alarm_op();
        info!(alarm = %identifier, "alarm reset");
        Ok(())
    }

    fn parse_identifier(&self, identifier: &str) -> WinccResult<AlarmIdentifier> {
        if identifier.is_empty() {
            return Err(WinccError::validation("alarm identifier must not be empty"));
        }
        Ok(AlarmIdentifier::parse(identifier))
    }
}

impl std::fmt::Debug for WinccClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinccClient")
            .field("url", &self.config.graphql_url())
            .field("generation", &self.config.generation)
            .field("state", &self.session.state())
            .finish()
    }
}
