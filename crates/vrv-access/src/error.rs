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

//! Error handling for the access control gate

use std::collections::BTreeMap;
use thiserror::Error;

/// Access control error types
#[derive(Error, Debug)]
pub enum AccessError {
    /// Credentials did not match any known principal. The message never says which field was wrong.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The session store holds only part of a session
    #[error("Session corrupt: {message}")]
    SessionCorrupt { message: String },

    /// A resource was looked up that the route policy does not define
    #[error("No route policy for resource: {resource}")]
    PolicyLookupMiss { resource: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Field-level validation failures, keyed by field name
    #[error("Validation failed: {}", format_fields(.fields))]
    Validation { fields: BTreeMap<String, String> },

    #[error("Session store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Serde JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccessError {
    /// Build the error returned for any credential mismatch
    pub fn invalid_credentials() -> Self {
        AccessError::Authentication {
            message: "invalid credentials".to_string(),
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            AccessError::Authentication { .. } => "authentication_error",
            AccessError::SessionCorrupt { .. } => "session_corrupt",
            AccessError::PolicyLookupMiss { .. } => "policy_lookup_miss",
            AccessError::Unauthorized { .. } => "unauthorized",
            AccessError::Forbidden { .. } => "forbidden",
            AccessError::NotFound { .. } => "not_found",
            AccessError::Conflict { .. } => "conflict",
            AccessError::Validation { .. } => "validation_error",
            AccessError::Store { .. } => "store_error",
            AccessError::Config { .. } => "config_error",
            AccessError::Token(_) => "token_error",
            AccessError::Serialization(_) => "json_error",
            AccessError::Io(_) => "io_error",
        }
    }

    /// Whether the caller can recover by showing the login form again or redirecting
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AccessError::Config { .. } | AccessError::Io(_))
    }
}

fn format_fields(fields: &BTreeMap<String, String>) -> String {
    fields.iter().map(|(field, message)| format!("{}: {}", field, message)).collect::<Vec<_>>().join("; ")
}

impl From<toml::de::Error> for AccessError {
    fn from(err: toml::de::Error) -> Self {
        AccessError::Config { message: err.to_string() }
    }
}

/// Result type for access control operations
pub type AccessResult<T> = Result<T, AccessError>;
