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

//! Session lifecycle on top of a session store

use crate::audit::{ANONYMOUS, AuditEvent, AuditEventType, AuditLogger, AuditResult};
use crate::error::{AccessError, AccessResult};
use crate::models::Principal;
use crate::session::store::SessionStore;
use crate::session::token::TokenIssuer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Store key holding the session token
pub const TOKEN_KEY: &str = "token";

/// Store key holding the serialized principal
pub const PRINCIPAL_KEY: &str = "user";

/// Proof of authentication: a token plus the principal it authenticates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

/// Establishes, queries and tears down the session.
///
/// The manager keeps no copy of the session; every query reads the store.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    issuer: Arc<dyn TokenIssuer>,
    audit: Arc<AuditLogger>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn SessionStore>, issuer: Arc<dyn TokenIssuer>, audit: Arc<AuditLogger>) -> Self {
        Self { store, issuer, audit }
    }

    /// Issue a token and persist `{token, principal}` in one batch write
    pub fn create_session(&self, principal: &Principal) -> AccessResult<Session> {
        let token = self.issuer.issue(principal)?;
        let serialized = serde_json::to_string(principal)?;

        self.store.set_batch(&[(TOKEN_KEY, token.as_str()), (PRINCIPAL_KEY, serialized.as_str())])?;

        info!(email = %principal.email, role = %principal.role, "Session created");
        self.audit
            .log_event(AuditEvent::new(AuditEventType::SessionCreated, principal.email.clone(), AuditResult::Success).with_detail("role", principal.role.as_str()));

        Ok(Session {
            token,
            principal: principal.clone(),
        })
    }

    /// The stored session, if the store holds a complete, readable and verified one.
    ///
    /// A half-written or unreadable session, or one whose token the issuer rejects for the
    /// stored principal, is cleared and reported as absent.
    pub fn current_session(&self) -> Option<Session> {
        let (token, principal) = self.read_entries();

        match (token, principal) {
            (None, None) => None,
            (Some(token), Some(raw)) => match serde_json::from_str::<Principal>(&raw) {
                Ok(principal) if self.issuer.verify(&token, &principal) => Some(Session { token, principal }),
                Ok(principal) => {
                    self.discard_corrupt(AccessError::SessionCorrupt {
                        message: format!("token does not verify for {} as {}", principal.email, principal.role),
                    });
                    None
                }
                Err(e) => {
                    self.discard_corrupt(AccessError::SessionCorrupt {
                        message: format!("principal entry does not deserialize: {}", e),
                    });
                    None
                }
            },
            (Some(_), None) => {
                self.discard_corrupt(AccessError::SessionCorrupt {
                    message: "token present without principal".to_string(),
                });
                None
            }
            (None, Some(_)) => {
                self.discard_corrupt(AccessError::SessionCorrupt {
                    message: "principal present without token".to_string(),
                });
                None
            }
        }
    }

    /// The authenticated principal, if any. Never fails.
    pub fn current_principal(&self) -> Option<Principal> {
        self.current_session().map(|session| session.principal)
    }

    /// True iff both session entries are present in the store
    pub fn is_authenticated(&self) -> bool {
        matches!(self.read_entries(), (Some(_), Some(_)))
    }

    /// Whether the store holds a session whose token the configured issuer accepts
    pub fn verify_current(&self) -> bool {
        self.current_session().is_some()
    }

    /// Remove both session entries. Safe to call when no session exists.
    pub fn destroy_session(&self) -> AccessResult<()> {
        let (token, principal) = self.read_entries();
        let existed = token.is_some() || principal.is_some();
        let actor = principal
            .and_then(|raw| serde_json::from_str::<Principal>(&raw).ok())
            .map(|principal| principal.email)
            .unwrap_or_else(|| ANONYMOUS.to_string());

        self.store.remove_batch(&[TOKEN_KEY, PRINCIPAL_KEY])?;

        if existed {
            info!(actor = %actor, "Session destroyed");
            self.audit.log_event(AuditEvent::new(AuditEventType::SessionDestroyed, actor, AuditResult::Success));
        }
        Ok(())
    }

    fn read_entries(&self) -> (Option<String>, Option<String>) {
        let read = |key: &str| match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Session store read failed, treating entry as absent");
                None
            }
        };

        (read(TOKEN_KEY), read(PRINCIPAL_KEY))
    }

    fn discard_corrupt(&self, err: AccessError) {
        warn!(error = %err, "Clearing corrupt session");
        self.audit
            .log_event(AuditEvent::new(AuditEventType::SessionCorrupt, ANONYMOUS, AuditResult::Failure).with_detail("reason", err.to_string()));

        if let Err(e) = self.store.remove_batch(&[TOKEN_KEY, PRINCIPAL_KEY]) {
            warn!(error = %e, "Failed to clear corrupt session");
        }
    }
}
