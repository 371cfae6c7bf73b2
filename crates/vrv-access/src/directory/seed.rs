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

//! Demo directory contents

use super::models::{DepartmentRecord, RecordStatus, RoleRecord, UserRecord};
use crate::models::Role;
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn user(id: &str, name: &str, email: &str, role: Role, status: RecordStatus, department: &str, joined: NaiveDate, phone: &str, location: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        status,
        department: department.to_string(),
        phone: Some(phone.to_string()),
        location: location.to_string(),
        join_date: joined,
    }
}

pub fn seed_users() -> Vec<UserRecord> {
    use RecordStatus::{Active, Inactive};

    vec![
        user("USR001", "John Doe", "john@vrv.com", Role::Admin, Active, "IT", date(2023, 1, 15), "+1 555-123-4567", "New York, USA"),
        user("USR002", "Jane Smith", "jane@vrv.com", Role::Manager, Active, "Sales", date(2023, 3, 20), "+1 555-234-5678", "Los Angeles, USA"),
        user("USR003", "Bob Wilson", "bob@vrv.com", Role::Employee, Inactive, "Marketing", date(2023, 6, 10), "+1 555-345-6789", "Chicago, USA"),
        user("USR004", "Alice Johnson", "alice@vrv.com", Role::Manager, Active, "HR", date(2023, 2, 28), "+1 555-456-7890", "Miami, USA"),
        user("USR005", "Charlie Brown", "charlie@vrv.com", Role::Employee, Active, "Finance", date(2023, 8, 15), "+1 555-567-8901", "Boston, USA"),
    ]
}

pub fn seed_roles() -> Vec<RoleRecord> {
    let role = |id: &str, name: &str, description: &str, permissions: &[&str]| RoleRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        permissions: permissions.iter().map(|permission| permission.to_string()).collect(),
        status: RecordStatus::Active,
    };

    vec![
        role("ROLE001", "Admin", "Full system access", &["users.manage", "roles.manage", "reports.view"]),
        role("ROLE002", "Manager", "Team management access", &["users.view", "reports.view", "reports.create"]),
        role("ROLE003", "Employee", "Basic access", &["reports.view"]),
    ]
}

pub fn seed_departments() -> Vec<DepartmentRecord> {
    let department = |id: &str, name: &str, head: &str, location: &str, status: RecordStatus, employee_count: u32, budget: u64, budget_spent: u64| DepartmentRecord {
        id: id.to_string(),
        name: name.to_string(),
        head: head.to_string(),
        location: location.to_string(),
        status,
        employee_count,
        budget,
        budget_spent,
    };

    vec![
        department("DEPT001", "IT", "John Doe", "New York, USA", RecordStatus::Active, 12, 500_000, 320_000),
        department("DEPT002", "Sales", "Jane Smith", "Los Angeles, USA", RecordStatus::Active, 18, 350_000, 290_000),
        department("DEPT003", "Marketing", "Bob Wilson", "Chicago, USA", RecordStatus::Active, 9, 250_000, 235_000),
        department("DEPT004", "HR", "Alice Johnson", "Miami, USA", RecordStatus::Active, 5, 150_000, 80_000),
        department("DEPT005", "Finance", "Charlie Brown", "Boston, USA", RecordStatus::Active, 7, 200_000, 120_000),
        department("DEPT006", "Research", "Unassigned", "Boston, USA", RecordStatus::Inactive, 0, 100_000, 0),
    ]
}
