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

//! Directory records for users, roles and departments

use crate::models::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a directory record is in use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Active => f.write_str("Active"),
            RecordStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

/// A record kept in a [`Repository`](super::Repository)
pub trait Record: Clone + Send + Sync + 'static {
    /// Partial update merged onto a stored record
    type Patch: Send;

    /// Prefix of generated identifiers, e.g. `USR` for `USR001`
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Overwrite the fields set in `patch`
    fn apply(&mut self, patch: Self::Patch);
}

/// Staff member listed in the user directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: RecordStatus,
    pub department: String,
    pub phone: Option<String>,
    pub location: String,
    pub join_date: NaiveDate,
}

/// Fields supplied when adding a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub department: String,
    pub phone: Option<String>,
    pub location: String,
}

impl NewUser {
    /// Build the record to store. New users start out active.
    pub fn into_record(self, join_date: NaiveDate) -> UserRecord {
        UserRecord {
            id: String::new(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: self.role.unwrap_or(Role::Employee),
            status: RecordStatus::Active,
            department: self.department,
            phone: self.phone.filter(|phone| !phone.trim().is_empty()),
            location: self.location.trim().to_string(),
            join_date,
        }
    }
}

impl From<&UserRecord> for NewUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: Some(user.role),
            department: user.department.clone(),
            phone: user.phone.clone(),
            location: user.location.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<RecordStatus>,
    pub department: Option<String>,
    /// `Some("")` clears the phone number
    pub phone: Option<String>,
    pub location: Option<String>,
}

impl Record for UserRecord {
    type Patch = UserPatch;

    const ID_PREFIX: &'static str = "USR";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
        if let Some(phone) = patch.phone {
            self.phone = if phone.trim().is_empty() { None } else { Some(phone) };
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
    }
}

/// Named bundle of permissions shown on the roles page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub status: Option<RecordStatus>,
}

impl Record for RoleRecord {
    type Patch = RolePatch;

    const ID_PREFIX: &'static str = "ROLE";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: RolePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRecord {
    pub id: String,
    pub name: String,
    /// Name of the department head
    pub head: String,
    pub location: String,
    pub status: RecordStatus,
    pub employee_count: u32,
    pub budget: u64,
    pub budget_spent: u64,
}

impl DepartmentRecord {
    /// Share of the budget already spent, in percent
    pub fn budget_used_percent(&self) -> f64 {
        if self.budget == 0 {
            return 0.0;
        }
        self.budget_spent as f64 / self.budget as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub head: Option<String>,
    pub location: Option<String>,
    pub status: Option<RecordStatus>,
    pub employee_count: Option<u32>,
    pub budget: Option<u64>,
    pub budget_spent: Option<u64>,
}

impl Record for DepartmentRecord {
    type Patch = DepartmentPatch;

    const ID_PREFIX: &'static str = "DEPT";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: DepartmentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(head) = patch.head {
            self.head = head;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(employee_count) = patch.employee_count {
            self.employee_count = employee_count;
        }
        if let Some(budget) = patch.budget {
            self.budget = budget;
        }
        if let Some(budget_spent) = patch.budget_spent {
            self.budget_spent = budget_spent;
        }
    }
}

/// Filters applied to the department list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentFilter {
    /// Case-insensitive match on name, head or location
    pub search: Option<String>,
    pub status: Option<RecordStatus>,
    /// Substring of the location
    pub location: Option<String>,
}

impl DepartmentFilter {
    pub fn matches(&self, department: &DepartmentRecord) -> bool {
        let search_ok = match self.search.as_deref().map(str::to_lowercase) {
            None => true,
            Some(needle) if needle.is_empty() => true,
            Some(needle) => [&department.name, &department.head, &department.location].iter().any(|field| field.to_lowercase().contains(&needle)),
        };

        let status_ok = self.status.is_none_or(|status| status == department.status);
        let location_ok = self.location.as_deref().is_none_or(|location| department.location.contains(location));

        search_ok && status_ok && location_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn department() -> DepartmentRecord {
        DepartmentRecord {
            id: "DEPT001".to_string(),
            name: "Information Technology".to_string(),
            head: "John Doe".to_string(),
            location: "New York, USA".to_string(),
            status: RecordStatus::Active,
            employee_count: 12,
            budget: 500_000,
            budget_spent: 450_000,
        }
    }

    #[test]
    fn test_user_json_uses_directory_field_names() {
        let user = NewUser {
            name: "Bob Wilson".to_string(),
            email: "bob@vrv.com".to_string(),
            role: None,
            department: "Marketing".to_string(),
            phone: Some("  ".to_string()),
            location: "Chicago, USA".to_string(),
        }
        .into_record(NaiveDate::from_ymd_opt(2023, 6, 10).unwrap());

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["joinDate"], "2023-06-10");
        assert_eq!(json["status"], "Active");
        assert_eq!(json["role"], "Employee");
        assert!(json["phone"].is_null());

        let parsed: UserRecord = serde_json::from_value(serde_json::json!({
            "id": "USR003", "name": "Bob Wilson", "email": "bob@vrv.com", "role": "User",
            "status": "Inactive", "department": "Marketing", "phone": null,
            "location": "Chicago, USA", "joinDate": "2023-06-10"
        }))
        .unwrap();
        assert_eq!(parsed.role, Role::Employee);
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut department = department();
        department.apply(DepartmentPatch {
            head: Some("Jane Smith".to_string()),
            employee_count: Some(0),
            ..Default::default()
        });

        assert_eq!(department.head, "Jane Smith");
        assert_eq!(department.employee_count, 0);
        assert_eq!(department.name, "Information Technology");
        assert_eq!(department.budget, 500_000);
    }

    #[test]
    fn test_department_filter() {
        let department = department();

        assert!(DepartmentFilter::default().matches(&department));
        assert!(DepartmentFilter { search: Some("JOHN".to_string()), ..Default::default() }.matches(&department));
        assert!(DepartmentFilter { search: Some("york".to_string()), ..Default::default() }.matches(&department));
        assert!(!DepartmentFilter { search: Some("finance".to_string()), ..Default::default() }.matches(&department));
        assert!(!DepartmentFilter { status: Some(RecordStatus::Inactive), ..Default::default() }.matches(&department));
        // location filter is case-sensitive
        assert!(!DepartmentFilter { location: Some("new york".to_string()), ..Default::default() }.matches(&department));
        assert!(DepartmentFilter { location: Some("New York".to_string()), ..Default::default() }.matches(&department));
    }

    #[test]
    fn test_budget_percentage() {
        assert_eq!(department().budget_used_percent(), 90.0);
        let mut empty = department();
        empty.budget = 0;
        assert_eq!(empty.budget_used_percent(), 0.0);
    }
}
