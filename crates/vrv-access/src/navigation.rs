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

//! Sidebar navigation derived from the route policy

use crate::models::Role;
use crate::policy::{Resource, RoutePolicy};
use serde::Serialize;

/// Single sidebar entry
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub resource: Resource,
}

/// Entries a role may see, split the way the sidebar renders them
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct NavigationMenu {
    pub main: Vec<NavItem>,
    pub secondary: Vec<NavItem>,
}

impl NavigationMenu {
    /// All visible entries, main first
    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.main.iter().chain(self.secondary.iter())
    }

    pub fn contains(&self, resource: Resource) -> bool {
        self.items().any(|item| item.resource == resource)
    }
}

const MAIN: [(&str, Resource); 6] = [
    ("Dashboard", Resource::Dashboard),
    ("Users", Resource::Users),
    ("Roles", Resource::Roles),
    ("Analytics", Resource::Analytics),
    ("Calendar", Resource::Calendar),
    ("Departments", Resource::Departments),
];

const SECONDARY: [(&str, Resource); 1] = [("Settings", Resource::Settings)];

/// Build the sidebar for a role.
///
/// The Dashboard entry links to `/`, which resolves to the role's own landing view, so it
/// is shown whenever that landing resource is permitted.
pub fn navigation_for(policy: &RoutePolicy, role: Role) -> NavigationMenu {
    let visible = |resource: Resource| {
        let target = if resource == Resource::Dashboard { Resource::landing_for(role) } else { resource };
        policy.permits(target.id(), role).unwrap_or(false)
    };

    let collect = |entries: &[(&'static str, Resource)]| {
        entries
            .iter()
            .filter(|(_, resource)| visible(*resource))
            .map(|(label, resource)| NavItem {
                label: *label,
                path: resource.path(),
                resource: *resource,
            })
            .collect::<Vec<_>>()
    };

    NavigationMenu {
        main: collect(&MAIN[..]),
        secondary: collect(&SECONDARY[..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn labels(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|item| item.label).collect()
    }

    #[test]
    fn test_admin_sees_everything() {
        let menu = navigation_for(&RoutePolicy::builtin(), Role::Admin);
        assert_eq!(labels(&menu.main), vec!["Dashboard", "Users", "Roles", "Analytics", "Calendar", "Departments"]);
        assert_eq!(labels(&menu.secondary), vec!["Settings"]);
    }

    #[test]
    fn test_manager_has_no_roles_entry() {
        let menu = navigation_for(&RoutePolicy::builtin(), Role::Manager);
        assert_eq!(labels(&menu.main), vec!["Dashboard", "Users", "Analytics", "Calendar", "Departments"]);
        assert!(!menu.contains(Resource::Roles));
    }

    #[test]
    fn test_employee_menu() {
        let menu = navigation_for(&RoutePolicy::builtin(), Role::Employee);
        assert_eq!(labels(&menu.main), vec!["Dashboard", "Calendar"]);
        assert_eq!(menu.main[0].path, "/");
        assert_eq!(labels(&menu.secondary), vec!["Settings"]);
    }

    #[test]
    fn test_menu_follows_policy_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("analytics".to_string(), vec![Role::Admin]);
        overrides.insert("settings".to_string(), vec![Role::Admin, Role::Manager]);
        let policy = RoutePolicy::from_overrides(&overrides).unwrap();

        let manager = navigation_for(&policy, Role::Manager);
        assert!(!manager.contains(Resource::Analytics));
        assert!(manager.contains(Resource::Settings));

        let employee = navigation_for(&policy, Role::Employee);
        assert!(employee.secondary.is_empty());
    }
}
