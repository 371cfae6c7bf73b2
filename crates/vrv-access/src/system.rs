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

//! Wires the gate components together from configuration

use crate::audit::AuditLogger;
use crate::config::AccessConfig;
use crate::directory::DirectoryService;
use crate::error::AccessResult;
use crate::gate::{AuthorizationGate, RouteGuard};
use crate::login::LoginCoordinator;
use crate::models::Role;
use crate::navigation::{NavigationMenu, navigation_for};
use crate::session::{FileSessionStore, MemorySessionStore, SessionManager, SessionStore};
use std::sync::Arc;
use tracing::info;

/// All access control components sharing one store, audit log and policy
#[derive(Clone)]
pub struct AccessControl {
    pub audit: Arc<AuditLogger>,
    pub sessions: Arc<SessionManager>,
    pub gate: Arc<AuthorizationGate>,
    pub guard: Arc<RouteGuard>,
    pub login: Arc<LoginCoordinator>,
    pub directory: Arc<DirectoryService>,
}

impl AccessControl {
    /// Build the components over an explicit session store
    pub fn with_store(config: &AccessConfig, store: Arc<dyn SessionStore>) -> AccessResult<Self> {
        config.validate()?;

        let audit = Arc::new(config.audit_logger());
        let policy = Arc::new(config.route_policy()?);
        let sessions = Arc::new(SessionManager::new(store, config.token_issuer()?, audit.clone()));
        let gate = Arc::new(AuthorizationGate::new(policy, audit.clone()));
        let guard = Arc::new(RouteGuard::new(gate.clone(), sessions.clone()));
        let login = Arc::new(LoginCoordinator::new(Arc::new(config.credential_verifier()), sessions.clone(), audit.clone(), config.login_latency()));
        let directory = Arc::new(DirectoryService::seeded(gate.clone())?);

        info!(token_mode = %config.session.token_mode, "Access control initialized");
        Ok(Self {
            audit,
            sessions,
            gate,
            guard,
            login,
            directory,
        })
    }

    /// Sessions persisted in the data directory, shared by every process using it
    pub fn open(config: &AccessConfig) -> AccessResult<Self> {
        let store = Arc::new(FileSessionStore::open(config.session_path())?);
        Self::with_store(config, store)
    }

    /// Sessions kept in memory only
    pub fn in_memory(config: &AccessConfig) -> AccessResult<Self> {
        Self::with_store(config, Arc::new(MemorySessionStore::new()))
    }

    /// Sidebar for a role under the active policy
    pub fn navigation(&self, role: Role) -> NavigationMenu {
        navigation_for(self.gate.policy(), role)
    }
}
