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

//! VRV Access
//!
//! Role-based access control for the VRV admin dashboard: credential checks, a persisted
//! session, a single route policy table, and the gate that decides every navigation.
//!
//! ```no_run
//! use vrv_access::{AccessConfig, AccessControl, Decision};
//!
//! # async fn run() -> vrv_access::AccessResult<()> {
//! let access = AccessControl::open(&AccessConfig::resolve_config(None, None)?)?;
//! access.login.login("employee@vrv.com", "employee123").await?;
//! assert_eq!(access.guard.navigate("/roles").decision, Decision::RedirectToDefault);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod gate;
pub mod login;
pub mod models;
pub mod navigation;
pub mod policy;
pub mod session;
pub mod system;

pub use audit::{AuditEvent, AuditEventType, AuditLogger, AuditResult};
pub use config::{AccessConfig, TokenMode};
pub use credentials::{CredentialVerifier, StaticCredentials};
pub use error::{AccessError, AccessResult};
pub use gate::{AuthorizationGate, Decision, Navigation, RouteGuard};
pub use login::{LoginCoordinator, LoginOutcome};
pub use models::{CredentialRecord, Principal, Role};
pub use navigation::{NavItem, NavigationMenu, navigation_for};
pub use policy::{Resource, RoutePolicy};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionManager, SessionStore};
pub use system::AccessControl;
