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

//! Session token issuing and verification

use crate::error::{AccessError, AccessResult};
use crate::models::{Principal, Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

const TOKEN_ISSUER: &str = "vrv-access";
const TOKEN_AUDIENCE: &str = "vrv-dashboard";

/// Produces the opaque token stored next to the principal
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for a principal
    fn issue(&self, principal: &Principal) -> AccessResult<String>;

    /// Check that a stored token belongs to the stored principal
    fn verify(&self, token: &str, principal: &Principal) -> bool;
}

/// Unsigned, role-derived token. Carries no integrity guarantee; suitable for local
/// scaffolding and tests only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderTokenIssuer;

impl PlaceholderTokenIssuer {
    /// The token a principal with `role` receives
    pub fn token_for(role: Role) -> String {
        format!("mock-jwt-token-{}", role.as_str().to_lowercase())
    }
}

impl TokenIssuer for PlaceholderTokenIssuer {
    fn issue(&self, principal: &Principal) -> AccessResult<String> {
        Ok(Self::token_for(principal.role))
    }

    fn verify(&self, token: &str, principal: &Principal) -> bool {
        token == Self::token_for(principal.role)
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal email)
    pub sub: String,

    /// Role held for this session
    pub role: Role,

    pub iss: String,

    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Create new claims for a principal
    pub fn new(principal: &Principal, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: principal.email.clone(),
            role: principal.role,
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// HS256-signed session tokens
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl JwtTokenIssuer {
    /// Create a new issuer with a shared secret
    pub fn new(secret: &str, expires_in: Duration) -> AccessResult<Self> {
        if secret.is_empty() {
            return Err(AccessError::Config {
                message: "JWT secret must not be empty".to_string(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expires_in,
        })
    }

    /// Validate and decode a token
    pub fn decode(&self, token: &str) -> AccessResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, principal: &Principal) -> AccessResult<String> {
        let claims = Claims::new(principal, self.expires_in);
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    fn verify(&self, token: &str, principal: &Principal) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.sub == principal.email && claims.role == principal.role,
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                false
            }
        }
    }
}
