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

//! End-to-end flows through the assembled access control components

use std::sync::Arc;
use tempfile::TempDir;
use vrv_access::audit::AuditEventType;
use vrv_access::session::{JwtTokenIssuer, PRINCIPAL_KEY, TOKEN_KEY, TokenIssuer};
use vrv_access::{AccessConfig, AccessControl, AccessError, Decision, FileSessionStore, LoginOutcome, MemorySessionStore, Resource, Role, SessionStore, TokenMode};

fn config(dir: &TempDir) -> AccessConfig {
    let mut config = AccessConfig::default();
    config.data_dir = dir.path().to_path_buf();
    config.login.latency_ms = 0;
    config
}

#[tokio::test]
async fn admin_login_then_access_roles() {
    let dir = TempDir::new().unwrap();
    let access = AccessControl::open(&config(&dir)).unwrap();

    let outcome = access.login.login("admin@vrv.com", "admin123").await.unwrap();
    let principal = outcome.session().unwrap().principal.clone();
    assert_eq!(principal.role, Role::Admin);

    assert!(access.gate.can_access("roles", Some(&principal)));
    assert!(!access.gate.can_access("roles", None));
    assert_eq!(access.gate.guard_route("roles", None), Decision::RedirectToLogin);
}

#[tokio::test]
async fn employee_login_is_redirected_from_roles() {
    let dir = TempDir::new().unwrap();
    let access = AccessControl::open(&config(&dir)).unwrap();

    access.login.login("employee@vrv.com", "employee123").await.unwrap();
    let principal = access.sessions.current_principal().unwrap();
    assert_eq!(principal.role, Role::Employee);

    assert_eq!(access.gate.guard_route("roles", Some(&principal)), Decision::RedirectToDefault);
    assert_eq!(access.gate.guard_route("calendar", Some(&principal)), Decision::Allow);

    let nav = access.guard.navigate("/");
    assert_eq!(nav.resource.as_deref(), Some(Resource::EmployeeDashboard.id()));
    assert_eq!(nav.decision, Decision::Allow);
}

#[tokio::test]
async fn destroy_twice_is_harmless() {
    let access = AccessControl::in_memory(&AccessConfig::default()).unwrap();
    access.sessions.destroy_session().unwrap();
    assert!(!access.sessions.is_authenticated());
    access.sessions.destroy_session().unwrap();
    assert!(!access.sessions.is_authenticated());
}

#[test]
fn token_without_principal_reads_as_signed_out() {
    let store = Arc::new(MemorySessionStore::new());
    let access = AccessControl::with_store(&AccessConfig::default(), store.clone()).unwrap();
    store.set(TOKEN_KEY, "mock-jwt-token-admin").unwrap();

    assert_eq!(access.sessions.current_principal(), None);
    assert!(!access.sessions.is_authenticated());
    assert_eq!(access.guard.navigate("/users").decision, Decision::RedirectToLogin);
}

#[tokio::test]
async fn failed_login_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let access = AccessControl::open(&config).unwrap();
    access.login.login("manager@vrv.com", "manager123").await.unwrap();
    let before = std::fs::read_to_string(config.session_path()).unwrap();

    let err = access.login.login("manager@vrv.com", "Manager123").await.unwrap_err();
    assert!(matches!(err, AccessError::Authentication { .. }));
    assert_eq!(std::fs::read_to_string(config.session_path()).unwrap(), before);
    assert_eq!(access.audit.events_of(AuditEventType::AuthenticationAttempt).len(), 2);
}

#[tokio::test]
async fn session_is_shared_through_the_data_dir() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let first = AccessControl::open(&config).unwrap();
    first.login.login("manager@vrv.com", "manager123").await.unwrap();

    let second = AccessControl::open(&config).unwrap();
    assert_eq!(second.sessions.current_principal().unwrap().email, "manager@vrv.com");
    assert_eq!(second.guard.navigate("/analytics").decision, Decision::Allow);

    // Logging out elsewhere is observed on the next navigation
    second.login.logout().unwrap();
    assert_eq!(first.guard.navigate("/analytics").decision, Decision::RedirectToLogin);
}

#[tokio::test]
async fn signed_tokens_detect_role_tampering() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.session.token_mode = TokenMode::Signed;
    config.session.jwt_secret = Some("integration-secret".to_string());

    let access = AccessControl::open(&config).unwrap();
    access.login.login("employee@vrv.com", "employee123").await.unwrap();
    assert!(access.sessions.verify_current());

    let store = FileSessionStore::open(config.session_path()).unwrap();
    let raw = store.get(PRINCIPAL_KEY).unwrap().unwrap();
    store.set(PRINCIPAL_KEY, &raw.replace("\"Employee\"", "\"Admin\"")).unwrap();

    assert!(!access.sessions.verify_current());
    assert_eq!(access.sessions.current_principal(), None);
    assert_eq!(access.guard.navigate("/roles").decision, Decision::RedirectToLogin);
    assert!(matches!(access.directory.list_roles(access.sessions.current_principal().as_ref()).await, Err(AccessError::Unauthorized { .. })));
    assert_eq!(store.get(PRINCIPAL_KEY).unwrap(), None);
}

#[tokio::test]
async fn expired_signed_token_reads_as_signed_out() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.session.token_mode = TokenMode::Signed;
    config.session.jwt_secret = Some("integration-secret".to_string());

    let access = AccessControl::open(&config).unwrap();
    access.login.login("admin@vrv.com", "admin123").await.unwrap();
    assert_eq!(access.guard.navigate("/roles").decision, Decision::Allow);

    // Same secret, but the expiry lies well past the validation leeway
    let expired = JwtTokenIssuer::new("integration-secret", chrono::Duration::hours(-2)).unwrap();
    let principal = access.sessions.current_principal().unwrap();
    let store = FileSessionStore::open(config.session_path()).unwrap();
    store.set(TOKEN_KEY, &expired.issue(&principal).unwrap()).unwrap();

    assert_eq!(access.guard.navigate("/roles").decision, Decision::RedirectToLogin);
    assert!(!access.sessions.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn newer_login_wins_over_slower_one() {
    let mut config = AccessConfig::default();
    config.login.latency_ms = 800;
    let access = AccessControl::in_memory(&config).unwrap();

    let (admin, manager) = tokio::join!(access.login.login("admin@vrv.com", "admin123"), access.login.login("manager@vrv.com", "manager123"));

    assert_eq!(admin.unwrap(), LoginOutcome::Superseded);
    assert!(matches!(manager.unwrap(), LoginOutcome::Established(_)));
    assert_eq!(access.sessions.current_principal().unwrap().role, Role::Manager);
}

#[tokio::test]
async fn directory_follows_the_signed_in_role() {
    let access = AccessControl::in_memory(&AccessConfig {
        login: vrv_access::config::LoginConfig { latency_ms: 0 },
        ..AccessConfig::default()
    })
    .unwrap();

    access.login.login("manager@vrv.com", "manager123").await.unwrap();
    let manager = access.sessions.current_principal();
    assert_eq!(access.directory.list_users(manager.as_ref()).await.unwrap().len(), 5);
    assert!(matches!(access.directory.list_roles(manager.as_ref()).await, Err(AccessError::Forbidden { .. })));

    let menu = access.navigation(Role::Manager);
    assert!(!menu.contains(Resource::Roles));
    assert!(menu.contains(Resource::Departments));
}
