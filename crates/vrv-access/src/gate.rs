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

//! Authorization gate and route guarding

use crate::audit::AuditLogger;
use crate::error::{AccessError, AccessResult};
use crate::models::Principal;
use crate::policy::{Resource, RoutePolicy};
use crate::session::SessionManager;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path of the login view
pub const LOGIN_PATH: &str = "/login";

/// Outcome of guarding a single navigation attempt
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Decision {
    /// Render the destination
    Allow,
    /// No principal; show the login form
    RedirectToLogin,
    /// Principal present but not allowed here; go to the role's landing view
    RedirectToDefault,
}

/// Decides route access from the route policy and the current principal
pub struct AuthorizationGate {
    policy: Arc<RoutePolicy>,
    audit: Arc<AuditLogger>,
}

impl AuthorizationGate {
    /// Create a new gate
    pub fn new(policy: Arc<RoutePolicy>, audit: Arc<AuditLogger>) -> Self {
        Self { policy, audit }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Whether `principal` may view `resource`. Unknown resources are denied.
    pub fn can_access(&self, resource: &str, principal: Option<&Principal>) -> bool {
        let Some(principal) = principal else {
            self.audit.log_access_check(None, resource, false);
            return false;
        };

        let granted = match self.policy.permits(resource, principal.role) {
            Some(granted) => granted,
            None => {
                let miss = AccessError::PolicyLookupMiss { resource: resource.to_string() };
                warn!(resource = %resource, email = %principal.email, "{}, denying", miss);
                self.audit.log_policy_miss(Some(&principal.email), resource);
                false
            }
        };

        debug!(resource = %resource, email = %principal.email, role = %principal.role, granted = %granted, "Access check completed");
        self.audit.log_access_check(Some(&principal.email), resource, granted);
        granted
    }

    /// Decide a single navigation. A denial leaves the session untouched.
    pub fn guard_route(&self, resource: &str, principal: Option<&Principal>) -> Decision {
        match principal {
            None => {
                self.audit.log_access_check(None, resource, false);
                Decision::RedirectToLogin
            }
            Some(principal) if self.can_access(resource, Some(principal)) => Decision::Allow,
            Some(_) => Decision::RedirectToDefault,
        }
    }

    /// Root resource for a principal, evaluated on every call
    pub fn default_landing(&self, principal: &Principal) -> Resource {
        Resource::landing_for(principal.role)
    }

    /// Error-returning form of [`can_access`](Self::can_access) for guarded operations
    pub fn require(&self, resource: &str, principal: Option<&Principal>) -> AccessResult<()> {
        match principal {
            None => Err(AccessError::Unauthorized {
                message: "Authentication required".to_string(),
            }),
            Some(principal) if self.can_access(resource, Some(principal)) => Ok(()),
            Some(principal) => Err(AccessError::Forbidden {
                message: format!("Role {} may not access {}", principal.role, resource),
            }),
        }
    }
}

/// Result of resolving a router path
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Navigation {
    /// Path that was requested
    pub path: String,

    /// Resource the path resolved to
    pub resource: Option<String>,

    pub decision: Decision,

    /// Where the router should go instead, when not allowed
    pub redirect_to: Option<String>,
}

/// Binds the gate to the session store for router use.
///
/// Holds no session state of its own; each navigation reads the store again, since the
/// store can be changed outside this process.
pub struct RouteGuard {
    gate: Arc<AuthorizationGate>,
    sessions: Arc<SessionManager>,
}

impl RouteGuard {
    /// Create a new route guard
    pub fn new(gate: Arc<AuthorizationGate>, sessions: Arc<SessionManager>) -> Self {
        Self { gate, sessions }
    }

    /// Resolve and guard a router path. Query strings and fragments are ignored.
    pub fn navigate(&self, path: &str) -> Navigation {
        let principal = self.sessions.current_principal();
        let route = path.split(['?', '#']).next().unwrap_or_default();
        let is_root = route.trim_end_matches('/').is_empty();

        let resource = if is_root {
            principal.as_ref().map(|principal| self.gate.default_landing(principal).id().to_string())
        } else {
            Some(Resource::from_path(route).map(|resource| resource.id().to_string()).unwrap_or_else(|| route.trim_matches('/').to_string()))
        };

        let decision = match &resource {
            Some(resource) => self.gate.guard_route(resource, principal.as_ref()),
            None => Decision::RedirectToLogin,
        };

        let redirect_to = match decision {
            Decision::Allow => None,
            Decision::RedirectToLogin => Some(LOGIN_PATH.to_string()),
            // The root already is the landing view; redirecting there again would loop
            Decision::RedirectToDefault if is_root => None,
            Decision::RedirectToDefault => Some("/".to_string()),
        };

        Navigation {
            path: path.to_string(),
            resource,
            decision,
            redirect_to,
        }
    }

    /// Landing resource of the current principal, if any
    pub fn landing(&self) -> Option<Resource> {
        self.sessions.current_principal().map(|principal| self.gate.default_landing(&principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditEventType;
    use crate::models::Role;
    use crate::session::{MemorySessionStore, PlaceholderTokenIssuer};

    fn gate() -> (Arc<AuditLogger>, AuthorizationGate) {
        let audit = Arc::new(AuditLogger::new());
        (audit.clone(), AuthorizationGate::new(Arc::new(RoutePolicy::builtin()), audit))
    }

    fn principal(role: Role) -> Principal {
        Principal::new(format!("{}@vrv.com", role.as_str().to_lowercase()), "Someone", role, "IT")
    }

    #[test]
    fn test_can_access_matches_policy_for_every_pair() {
        let (_, gate) = gate();
        let policy = RoutePolicy::builtin();

        for role in Role::ALL {
            for resource in Resource::ALL {
                let expected = policy.allowed_roles(resource.id()).unwrap().contains(&role);
                assert_eq!(gate.can_access(resource.id(), Some(&principal(role))), expected, "{} on {}", role, resource);
            }
        }
    }

    #[test]
    fn test_unknown_resource_is_denied_and_audited() {
        let (audit, gate) = gate();

        for role in Role::ALL {
            assert!(!gate.can_access("reports", Some(&principal(role))));
        }
        assert_eq!(audit.events_of(AuditEventType::PolicyLookupMiss).len(), 3);
    }

    #[test]
    fn test_absent_principal_is_denied() {
        let (_, gate) = gate();
        assert!(!gate.can_access("calendar", None));
        assert_eq!(gate.guard_route("calendar", None), Decision::RedirectToLogin);
    }

    #[test]
    fn test_guard_route_decisions() {
        let (_, gate) = gate();
        let employee = principal(Role::Employee);

        assert_eq!(gate.guard_route("roles", Some(&employee)), Decision::RedirectToDefault);
        assert_eq!(gate.guard_route("calendar", Some(&employee)), Decision::Allow);
        assert_eq!(gate.guard_route("roles", Some(&principal(Role::Admin))), Decision::Allow);
    }

    #[test]
    fn test_require_maps_to_errors() {
        let (_, gate) = gate();

        assert!(matches!(gate.require("users", None), Err(AccessError::Unauthorized { .. })));
        assert!(matches!(gate.require("users", Some(&principal(Role::Employee))), Err(AccessError::Forbidden { .. })));
        assert!(gate.require("users", Some(&principal(Role::Manager))).is_ok());
    }

    fn route_guard() -> (Arc<SessionManager>, RouteGuard) {
        let audit = Arc::new(AuditLogger::new());
        let sessions = Arc::new(SessionManager::new(Arc::new(MemorySessionStore::new()), Arc::new(PlaceholderTokenIssuer), audit.clone()));
        let gate = Arc::new(AuthorizationGate::new(Arc::new(RoutePolicy::builtin()), audit));
        (sessions.clone(), RouteGuard::new(gate, sessions))
    }

    #[test]
    fn test_root_resolves_per_role_on_every_call() {
        let (sessions, guard) = route_guard();

        let nav = guard.navigate("/");
        assert_eq!(nav.decision, Decision::RedirectToLogin);
        assert_eq!(nav.redirect_to.as_deref(), Some(LOGIN_PATH));

        sessions.create_session(&principal(Role::Manager)).unwrap();
        let nav = guard.navigate("/");
        assert_eq!(nav.resource.as_deref(), Some("dashboard"));
        assert_eq!(nav.decision, Decision::Allow);

        sessions.destroy_session().unwrap();
        sessions.create_session(&principal(Role::Employee)).unwrap();
        let nav = guard.navigate("/");
        assert_eq!(nav.resource.as_deref(), Some("employee-dashboard"));
        assert_eq!(guard.landing(), Some(Resource::EmployeeDashboard));
    }

    #[test]
    fn test_query_and_fragment_are_ignored() {
        let (sessions, guard) = route_guard();
        sessions.create_session(&principal(Role::Manager)).unwrap();

        let nav = guard.navigate("/users?page=2");
        assert_eq!(nav.path, "/users?page=2");
        assert_eq!(nav.resource.as_deref(), Some("users"));
        assert_eq!(nav.decision, Decision::Allow);

        let nav = guard.navigate("/#top");
        assert_eq!(nav.resource.as_deref(), Some("dashboard"));
        assert_eq!(nav.decision, Decision::Allow);

        let nav = guard.navigate("?tab=1");
        assert_eq!(nav.resource.as_deref(), Some("dashboard"));
    }

    #[test]
    fn test_denied_navigation_keeps_session() {
        let (sessions, guard) = route_guard();
        sessions.create_session(&principal(Role::Employee)).unwrap();

        let nav = guard.navigate("/roles");
        assert_eq!(nav.decision, Decision::RedirectToDefault);
        assert_eq!(nav.redirect_to.as_deref(), Some("/"));
        assert!(sessions.is_authenticated());

        let nav = guard.navigate("/calendar?month=2024-01#week-2");
        assert_eq!(nav.resource.as_deref(), Some("calendar"));
        assert_eq!(nav.decision, Decision::Allow);

        let nav = guard.navigate("/not-a-page");
        assert_eq!(nav.resource.as_deref(), Some("not-a-page"));
        assert_eq!(nav.decision, Decision::RedirectToDefault);
    }
}
