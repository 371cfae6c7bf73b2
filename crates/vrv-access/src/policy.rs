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

//! Route policy table
//!
//! One process-wide, read-only mapping from dashboard resources to the roles allowed to
//! view them. Nothing else in the crate carries its own list of allowed roles.

use crate::error::{AccessError, AccessResult};
use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Dashboard resources known to the built-in policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    /// Management dashboard, the root view for Admin and Manager
    Dashboard,
    /// Root view for Employee
    EmployeeDashboard,
    Users,
    Roles,
    Departments,
    Analytics,
    Calendar,
    Settings,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Dashboard,
        Resource::EmployeeDashboard,
        Resource::Users,
        Resource::Roles,
        Resource::Departments,
        Resource::Analytics,
        Resource::Calendar,
        Resource::Settings,
    ];

    /// Policy identifier
    pub fn id(&self) -> &'static str {
        match self {
            Resource::Dashboard => "dashboard",
            Resource::EmployeeDashboard => "employee-dashboard",
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::Departments => "departments",
            Resource::Analytics => "analytics",
            Resource::Calendar => "calendar",
            Resource::Settings => "settings",
        }
    }

    /// Router path rendering this resource
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Dashboard => "/",
            Resource::EmployeeDashboard => "/employee",
            Resource::Users => "/users",
            Resource::Roles => "/roles",
            Resource::Departments => "/departments",
            Resource::Analytics => "/analytics",
            Resource::Calendar => "/calendar",
            Resource::Settings => "/settings",
        }
    }

    /// Look up a resource by policy identifier
    pub fn from_id(id: &str) -> Option<Resource> {
        Resource::ALL.into_iter().find(|resource| resource.id() == id)
    }

    /// Look up a resource by router path. The root path is role-dependent and not resolved here.
    pub fn from_path(path: &str) -> Option<Resource> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        Resource::ALL.into_iter().filter(|resource| *resource != Resource::Dashboard).find(|resource| resource.path() == trimmed)
    }

    /// Root resource for a role
    pub fn landing_for(role: Role) -> Resource {
        if role.is_management() { Resource::Dashboard } else { Resource::EmployeeDashboard }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Immutable resource -> allowed roles table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    entries: BTreeMap<String, BTreeSet<Role>>,
}

impl RoutePolicy {
    /// The canonical table, reconciled across all dashboard variants
    pub fn builtin() -> Self {
        use Role::{Admin, Employee, Manager};

        let table: [(Resource, &[Role]); 8] = [
            (Resource::Dashboard, &[Admin, Manager]),
            (Resource::EmployeeDashboard, &[Employee]),
            (Resource::Users, &[Admin, Manager]),
            (Resource::Roles, &[Admin]),
            (Resource::Departments, &[Admin, Manager]),
            (Resource::Analytics, &[Admin, Manager]),
            (Resource::Calendar, &[Admin, Manager, Employee]),
            (Resource::Settings, &[Admin, Manager, Employee]),
        ];

        let entries = table.into_iter().map(|(resource, roles)| (resource.id().to_string(), roles.iter().copied().collect())).collect();

        Self { entries }
    }

    /// The built-in table with some entries replaced or added. Applied once at startup.
    pub fn from_overrides(overrides: &BTreeMap<String, Vec<Role>>) -> AccessResult<Self> {
        let mut policy = Self::builtin();

        for (resource, roles) in overrides {
            let resource = resource.trim();
            if resource.is_empty() {
                return Err(AccessError::Config {
                    message: "Route policy override with empty resource name".to_string(),
                });
            }
            policy.entries.insert(resource.to_string(), roles.iter().copied().collect());
        }

        Ok(policy)
    }

    /// Roles allowed on a resource, or `None` if the resource is not in the table
    pub fn allowed_roles(&self, resource: &str) -> Option<&BTreeSet<Role>> {
        self.entries.get(resource)
    }

    /// Whether `role` may view `resource`; `None` when the table has no such resource
    pub fn permits(&self, resource: &str, role: Role) -> Option<bool> {
        self.allowed_roles(resource).map(|roles| roles.contains(&role))
    }

    /// Resources listed in the table
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resources a role may view
    pub fn resources_for(&self, role: Role) -> Vec<&str> {
        self.entries.iter().filter(|(_, roles)| roles.contains(&role)).map(|(resource, _)| resource.as_str()).collect()
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::builtin()
    }
}
