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

//! Core identity types shared by the gate

use crate::error::{AccessError, AccessResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dashboard role. Every principal holds exactly one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Manager,
    #[serde(alias = "User")]
    Employee,
}

impl Role {
    /// All roles, in display order
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Employee];

    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Employee => "Employee",
        }
    }

    /// Whether this role lands on the management dashboard
    pub fn is_management(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> AccessResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            // The user directory labels ordinary staff "User"
            "employee" | "user" => Ok(Role::Employee),
            other => Err(AccessError::Config {
                message: format!("Unknown role: {}", other),
            }),
        }
    }
}

/// An authenticated actor. Deliberately has no password field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    /// Email address, matched case-sensitively
    pub email: String,

    /// Display name
    pub name: String,

    /// The single role held for the lifetime of the session
    pub role: Role,

    /// Department name
    pub department: String,
}

impl Principal {
    /// Create a new principal
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role, department: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            role,
            department: department.into(),
        }
    }

    /// First character of the name, used for avatar badges
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next()
    }
}

/// A row of the credential table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub department: String,
}

impl CredentialRecord {
    /// Create a new credential record
    pub fn new(email: &str, password: &str, name: &str, role: Role, department: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role,
            department: department.to_string(),
        }
    }

    /// Build the principal this record authenticates, without the password
    pub fn to_principal(&self) -> Principal {
        Principal::new(self.email.clone(), self.name.clone(), self.role, self.department.clone())
    }
}

/// Built-in demo credentials
pub fn default_credentials() -> Vec<CredentialRecord> {
    vec![
        CredentialRecord::new("admin@vrv.com", "admin123", "Admin User", Role::Admin, "IT"),
        CredentialRecord::new("manager@vrv.com", "manager123", "John Manager", Role::Manager, "Sales"),
        CredentialRecord::new("employee@vrv.com", "employee123", "Jane Employee", Role::Employee, "Marketing"),
    ]
}
