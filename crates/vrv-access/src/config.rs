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

//! Configuration loading
//!
//! Resolution order: `--config` path, then `VRV_CONFIG`, then built-in defaults. Environment
//! overrides are applied on top, and `--data-dir` wins over everything.

use crate::audit::AuditLogger;
use crate::credentials::StaticCredentials;
use crate::error::{AccessError, AccessResult};
use crate::models::{CredentialRecord, Role, default_credentials};
use crate::policy::RoutePolicy;
use crate::session::{JwtTokenIssuer, PlaceholderTokenIssuer, TokenIssuer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Name of the session file inside the data directory
pub const SESSION_FILE: &str = "session.json";

const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// How session tokens are produced
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    /// Unsigned `mock-jwt-token-{role}` strings
    #[default]
    Placeholder,
    /// HS256 JWTs signed with `jwt_secret`
    Signed,
}

impl fmt::Display for TokenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenMode::Placeholder => f.write_str("placeholder"),
            TokenMode::Signed => f.write_str("signed"),
        }
    }
}

impl FromStr for TokenMode {
    type Err = AccessError;

    fn from_str(s: &str) -> AccessResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(TokenMode::Placeholder),
            "signed" => Ok(TokenMode::Signed),
            other => Err(AccessError::Config {
                message: format!("Unknown token mode: {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub token_mode: TokenMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_mode: TokenMode::Placeholder,
            jwt_secret: None,
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoginConfig {
    /// Delay before a login attempt resolves
    pub latency_ms: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self { latency_ms: 800 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuditConfig {
    pub max_events: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { max_events: 10_000 }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessConfig {
    /// Directory holding the session file
    pub data_dir: PathBuf,
    pub session: SessionConfig,
    pub login: LoginConfig,
    pub audit: AuditConfig,

    /// Replaces the built-in credential table when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialRecord>>,

    /// Route policy entries replacing or extending the built-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<BTreeMap<String, Vec<Role>>>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("vrv"),
            session: SessionConfig::default(),
            login: LoginConfig::default(),
            audit: AuditConfig::default(),
            credentials: None,
            policy: None,
        }
    }
}

impl AccessConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> AccessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> AccessResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| AccessError::Config { message: e.to_string() })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve configuration from CLI arguments and the process environment
    pub fn resolve_config(cli_config: Option<PathBuf>, cli_data_dir: Option<PathBuf>) -> AccessResult<Self> {
        Self::resolve_with(cli_config, cli_data_dir, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup
    pub fn resolve_with<F>(cli_config: Option<PathBuf>, cli_data_dir: Option<PathBuf>, env: F) -> AccessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Some(env_config) = env("VRV_CONFIG") {
            Self::load_from_file(env_config)?
        } else {
            Self::default()
        };

        config.apply_env(&env)?;

        // CLI data_dir overrides environment settings
        if let Some(data_dir) = cli_data_dir {
            config.data_dir = data_dir;
        }

        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(config)
    }

    /// Apply `VRV_*` environment overrides
    pub fn apply_env<F>(&mut self, env: &F) -> AccessResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = env("VRV_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(mode) = env("VRV_TOKEN_MODE") {
            self.session.token_mode = mode.parse()?;
        }
        if let Some(secret) = env("VRV_JWT_SECRET") {
            self.session.jwt_secret = Some(secret);
        }
        if let Some(latency) = env("VRV_LOGIN_LATENCY_MS") {
            self.login.latency_ms = latency.parse().map_err(|_| AccessError::Config {
                message: format!("VRV_LOGIN_LATENCY_MS must be a number of milliseconds, got {}", latency),
            })?;
        }
        Ok(())
    }

    /// Reject settings the gate cannot run with
    pub fn validate(&self) -> AccessResult<()> {
        if self.session.token_mode == TokenMode::Signed && self.session.jwt_secret.as_deref().is_none_or(str::is_empty) {
            return Err(AccessError::Config {
                message: "Signed token mode requires session.jwt_secret".to_string(),
            });
        }

        if self.session.token_ttl_secs == 0 || self.session.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(AccessError::Config {
                message: format!("session.token_ttl_secs must be between 1 and {}", MAX_TOKEN_TTL_SECS),
            });
        }

        if let Some(credentials) = &self.credentials {
            let mut seen = std::collections::BTreeSet::new();
            for record in credentials {
                if !seen.insert(record.email.as_str()) {
                    return Err(AccessError::Config {
                        message: format!("Duplicate credential email: {}", record.email),
                    });
                }
            }
        }

        Ok(())
    }

    /// Path of the persisted session
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login.latency_ms)
    }

    /// Build the configured token issuer
    pub fn token_issuer(&self) -> AccessResult<Arc<dyn TokenIssuer>> {
        match self.session.token_mode {
            TokenMode::Placeholder => Ok(Arc::new(PlaceholderTokenIssuer)),
            TokenMode::Signed => {
                let secret = self.session.jwt_secret.as_deref().unwrap_or_default();
                let ttl = chrono::Duration::seconds(self.session.token_ttl_secs as i64);
                Ok(Arc::new(JwtTokenIssuer::new(secret, ttl)?))
            }
        }
    }

    /// Built-in route policy with configured overrides applied
    pub fn route_policy(&self) -> AccessResult<RoutePolicy> {
        match &self.policy {
            Some(overrides) => RoutePolicy::from_overrides(overrides),
            None => Ok(RoutePolicy::builtin()),
        }
    }

    pub fn credential_verifier(&self) -> StaticCredentials {
        StaticCredentials::new(self.credentials.clone().unwrap_or_else(default_credentials))
    }

    pub fn audit_logger(&self) -> AuditLogger {
        AuditLogger::with_max_events(self.audit.max_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AccessConfig::default();

        assert_eq!(config.session.token_mode, TokenMode::Placeholder);
        assert_eq!(config.login_latency(), Duration::from_millis(800));
        assert_eq!(config.audit.max_events, 10_000);
        assert!(config.data_dir.ends_with("vrv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AccessConfig = toml::from_str(
            r#"
            data_dir = "/tmp/vrv-test"

            [login]
            latency_ms = 0

            [policy]
            analytics = ["Admin"]
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/vrv-test"));
        assert_eq!(config.login.latency_ms, 0);
        assert_eq!(config.session, SessionConfig::default());

        let policy = config.route_policy().unwrap();
        assert_eq!(policy.permits("analytics", Role::Manager), Some(false));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vrv.toml");

        let mut config = AccessConfig::default();
        config.data_dir = dir.path().join("data");
        config.credentials = Some(vec![CredentialRecord::new("ops@vrv.com", "ops12345", "Ops", Role::Manager, "IT")]);
        config.save_to_file(&path).unwrap();

        let loaded = AccessConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.credential_verifier().len(), 1);
    }

    #[test]
    fn test_env_overrides_file_and_cli_overrides_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vrv.toml");
        std::fs::write(&path, "[login]\nlatency_ms = 100\n").unwrap();

        let env = env_of(&[
            ("VRV_CONFIG", path.to_str().unwrap()),
            ("VRV_DATA_DIR", dir.path().join("from-env").to_str().unwrap()),
            ("VRV_LOGIN_LATENCY_MS", "5"),
        ]);

        let config = AccessConfig::resolve_with(None, None, &env).unwrap();
        assert_eq!(config.login.latency_ms, 5);
        assert_eq!(config.data_dir, dir.path().join("from-env"));
        assert!(config.data_dir.is_dir());

        let config = AccessConfig::resolve_with(None, Some(dir.path().join("from-cli")), &env).unwrap();
        assert_eq!(config.data_dir, dir.path().join("from-cli"));
    }

    #[test]
    fn test_signed_mode_requires_secret() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let err = AccessConfig::resolve_with(None, None, env_of(&[("VRV_DATA_DIR", data_dir), ("VRV_TOKEN_MODE", "signed")])).unwrap_err();
        assert_eq!(err.error_type(), "config_error");

        let config = AccessConfig::resolve_with(None, None, env_of(&[("VRV_DATA_DIR", data_dir), ("VRV_TOKEN_MODE", "signed"), ("VRV_JWT_SECRET", "s3cret")])).unwrap();
        let issuer = config.token_issuer().unwrap();
        let principal = default_credentials()[0].to_principal();
        let token = issuer.issue(&principal).unwrap();
        assert!(token.starts_with("eyJ"));
        assert!(issuer.verify(&token, &principal));
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut config = AccessConfig::default();
        assert!(config.apply_env(&env_of(&[("VRV_LOGIN_LATENCY_MS", "soon")])).is_err());
        assert!(config.apply_env(&env_of(&[("VRV_TOKEN_MODE", "rot13")])).is_err());
    }

    #[test]
    fn test_duplicate_credentials_rejected() {
        let mut config = AccessConfig::default();
        let record = CredentialRecord::new("a@vrv.com", "pw", "A", Role::Admin, "IT");
        config.credentials = Some(vec![record.clone(), record]);
        assert!(config.validate().is_err());
    }
}
