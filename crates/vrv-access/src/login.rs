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

//! Asynchronous login with stale-resolution protection

use crate::audit::AuditLogger;
use crate::credentials::CredentialVerifier;
use crate::error::AccessResult;
use crate::session::{Session, SessionManager};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Result of a login attempt that passed credential checks or was overtaken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session was written to the store
    Established(Session),
    /// A newer attempt or a cancellation arrived first; nothing was written
    Superseded,
}

impl LoginOutcome {
    pub fn session(&self) -> Option<&Session> {
        match self {
            LoginOutcome::Established(session) => Some(session),
            LoginOutcome::Superseded => None,
        }
    }
}

/// Runs credential checks behind a non-blocking delay and applies only the newest attempt.
///
/// Each call takes a ticket from a generation counter. Completion order of overlapping
/// calls is unspecified; when an attempt resolves, it writes the session only if its
/// ticket is still the newest one.
pub struct LoginCoordinator {
    verifier: Arc<dyn CredentialVerifier>,
    sessions: Arc<SessionManager>,
    audit: Arc<AuditLogger>,
    latency: Duration,
    generation: AtomicU64,
}

impl LoginCoordinator {
    /// Create a new coordinator
    pub fn new(verifier: Arc<dyn CredentialVerifier>, sessions: Arc<SessionManager>, audit: Arc<AuditLogger>, latency: Duration) -> Self {
        Self {
            verifier,
            sessions,
            audit,
            latency,
            generation: AtomicU64::new(0),
        }
    }

    /// Attempt a login.
    ///
    /// Bad credentials fail with `AccessError::Authentication` and leave the store as it was.
    pub async fn login(&self, email: &str, password: &str) -> AccessResult<LoginOutcome> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.is_stale(ticket) {
            debug!(email = %email, ticket = ticket, "Login attempt superseded before resolution");
            return Ok(LoginOutcome::Superseded);
        }

        let principal = match self.verifier.authenticate(email, password) {
            Ok(principal) => {
                self.audit.log_authentication(email, true);
                principal
            }
            Err(e) => {
                self.audit.log_authentication(email, false);
                return Err(e);
            }
        };

        let session = self.sessions.create_session(&principal)?;
        Ok(LoginOutcome::Established(session))
    }

    /// Discard every attempt still in flight, e.g. when the user navigates away
    pub fn cancel(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation = generation, "Pending login attempts cancelled");
    }

    /// Log out: tears the session down and discards in-flight attempts
    pub fn logout(&self) -> AccessResult<()> {
        self.cancel();
        self.sessions.destroy_session()
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}
