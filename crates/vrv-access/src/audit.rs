// VRV Access
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Audit logging for authentication and access decisions

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{info, warn};

/// Audit event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AuditEventType {
    /// Login attempt against the credential table
    AuthenticationAttempt,
    /// Session written to the store
    SessionCreated,
    /// Session removed from the store
    SessionDestroyed,
    /// Store held half a session and was cleared
    SessionCorrupt,
    /// Route access decision
    AccessCheck,
    /// Resource missing from the route policy
    PolicyLookupMiss,
}

/// Audit event result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditResult {
    Success,
    Failure,
    Denied,
}

/// Audit event entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: String,

    pub event_type: AuditEventType,

    pub timestamp: DateTime<Utc>,

    /// Email of the acting principal, or "anonymous"
    pub actor: String,

    /// Resource being accessed
    pub resource: Option<String>,

    pub result: AuditResult,

    /// Additional event details
    pub details: HashMap<String, String>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(event_type: AuditEventType, actor: impl Into<String>, result: AuditResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            actor: actor.into(),
            resource: None,
            result,
            details: HashMap::new(),
        }
    }

    /// Set resource
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Add detail
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Actor name recorded when no principal is present
pub const ANONYMOUS: &str = "anonymous";

/// Bounded in-memory audit log
#[derive(Debug)]
pub struct AuditLogger {
    events: RwLock<VecDeque<AuditEvent>>,

    /// Maximum number of events to keep in memory
    max_events: usize,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new() -> Self {
        Self::with_max_events(10_000)
    }

    /// Create audit logger with custom max events
    pub fn with_max_events(max_events: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            max_events: max_events.max(1),
        }
    }

    /// Log an audit event
    pub fn log_event(&self, event: AuditEvent) {
        match event.result {
            AuditResult::Success => {
                info!(
                    event_type = ?event.event_type,
                    actor = %event.actor,
                    resource = ?event.resource,
                    "Audit event: {:?}", event.event_type
                );
            }
            AuditResult::Failure | AuditResult::Denied => {
                warn!(
                    event_type = ?event.event_type,
                    actor = %event.actor,
                    resource = ?event.resource,
                    result = ?event.result,
                    "Audit event: {:?} - {:?}", event.event_type, event.result
                );
            }
        }

        let mut events = self.events.write();
        events.push_back(event);
        while events.len() > self.max_events {
            events.pop_front();
        }
    }

    /// Log a login attempt. The password is never recorded.
    pub fn log_authentication(&self, email: &str, succeeded: bool) {
        let result = if succeeded { AuditResult::Success } else { AuditResult::Failure };
        self.log_event(AuditEvent::new(AuditEventType::AuthenticationAttempt, email, result));
    }

    /// Log a route access decision
    pub fn log_access_check(&self, actor: Option<&str>, resource: &str, granted: bool) {
        let result = if granted { AuditResult::Success } else { AuditResult::Denied };
        self.log_event(AuditEvent::new(AuditEventType::AccessCheck, actor.unwrap_or(ANONYMOUS), result).with_resource(resource));
    }

    /// Log a lookup of a resource the policy does not know
    pub fn log_policy_miss(&self, actor: Option<&str>, resource: &str) {
        self.log_event(AuditEvent::new(AuditEventType::PolicyLookupMiss, actor.unwrap_or(ANONYMOUS), AuditResult::Denied).with_resource(resource));
    }

    /// Snapshot of all retained events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// Retained events of one type
    pub fn events_of(&self, event_type: AuditEventType) -> Vec<AuditEvent> {
        self.events.read().iter().filter(|event| event.event_type == event_type).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}
