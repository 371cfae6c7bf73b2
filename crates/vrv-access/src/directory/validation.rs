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

//! Field validation for directory forms

use super::models::{DepartmentRecord, NewUser, RoleRecord};
use crate::error::{AccessError, AccessResult};
use regex::Regex;
use std::collections::BTreeMap;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\+?[\d\s-]{10,}$";

/// Checks form input before it reaches a repository. Every failing field is reported.
#[derive(Debug, Clone)]
pub struct DirectoryValidator {
    email: Regex,
    phone: Regex,
}

impl DirectoryValidator {
    pub fn new() -> AccessResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AccessError::Config {
                message: format!("Invalid validation pattern {}: {}", pattern, e),
            })
        };

        Ok(Self {
            email: compile(EMAIL_PATTERN)?,
            phone: compile(PHONE_PATTERN)?,
        })
    }

    pub fn validate_user(&self, user: &NewUser) -> AccessResult<()> {
        let mut errors = BTreeMap::new();

        let name = user.name.trim();
        if name.is_empty() {
            errors.insert("name", "Name is required");
        } else if name.chars().count() < 2 {
            errors.insert("name", "Name must be at least 2 characters");
        }

        let email = user.email.trim();
        if email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !self.email.is_match(email) {
            errors.insert("email", "Please enter a valid email address");
        }

        if user.department.trim().is_empty() {
            errors.insert("department", "Department is required");
        }

        if let Some(phone) = user.phone.as_deref().filter(|phone| !phone.trim().is_empty()) {
            if !self.phone.is_match(phone) {
                errors.insert("phone", "Please enter a valid phone number");
            }
        }

        if user.location.trim().is_empty() {
            errors.insert("location", "Location is required");
        }

        finish(errors)
    }

    pub fn validate_role(&self, role: &RoleRecord) -> AccessResult<()> {
        let mut errors = BTreeMap::new();

        if role.name.trim().is_empty() {
            errors.insert("name", "Role name is required");
        }
        if role.permissions.iter().any(|permission| permission.trim().is_empty()) {
            errors.insert("permissions", "Permissions must not be blank");
        }

        finish(errors)
    }

    pub fn validate_department(&self, department: &DepartmentRecord) -> AccessResult<()> {
        let mut errors = BTreeMap::new();

        if department.name.trim().is_empty() {
            errors.insert("name", "Department name is required");
        }
        if department.head.trim().is_empty() {
            errors.insert("head", "Department head is required");
        }
        if department.location.trim().is_empty() {
            errors.insert("location", "Location is required");
        }
        if department.budget_spent > department.budget {
            errors.insert("budgetSpent", "Spent budget cannot exceed the budget");
        }

        finish(errors)
    }
}

fn finish(errors: BTreeMap<&str, &str>) -> AccessResult<()> {
    if errors.is_empty() {
        return Ok(());
    }

    Err(AccessError::Validation {
        fields: errors.into_iter().map(|(field, message)| (field.to_string(), message.to_string())).collect(),
    })
}
