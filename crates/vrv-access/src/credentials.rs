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

//! Credential verification

use crate::error::{AccessError, AccessResult};
use crate::models::{CredentialRecord, Principal, default_credentials};
use tracing::debug;

/// Decides whether an (email, password) pair identifies a known principal.
///
/// Implementations must be free of side effects: no lockout, no attempt counting,
/// and no session writes. Establishing a session is the caller's job.
pub trait CredentialVerifier: Send + Sync {
    fn authenticate(&self, email: &str, password: &str) -> AccessResult<Principal>;
}

/// Verifier backed by a fixed credential table
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    records: Vec<CredentialRecord>,
}

impl StaticCredentials {
    /// Create a verifier over the given records
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self { records }
    }

    /// Number of known principals
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Known records
    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(default_credentials())
    }
}

impl CredentialVerifier for StaticCredentials {
    fn authenticate(&self, email: &str, password: &str) -> AccessResult<Principal> {
        // Both fields must match on the same record; the error stays the same either way.
        let record = self
            .records
            .iter()
            .find(|record| record.email == email && record.password == password)
            .ok_or_else(AccessError::invalid_credentials)?;

        debug!(email = %record.email, role = %record.role, "Credentials verified");
        Ok(record.to_principal())
    }
}
