//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Bearer token validation (HS256 JWT)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to sign access tokens
    pub jwt_secret: Option<SecretString>,

    /// Expected `iss` claim, when set
    pub jwt_issuer: Option<String>,

    /// Expected `aud` claim, when set
    pub jwt_audience: Option<String>,

    /// Clock skew allowance for `exp`
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Secret, ignoring blank values.
    pub fn jwt_secret(&self) -> Option<&SecretString> {
        self.jwt_secret
            .as_ref()
            .filter(|s| !s.expose_secret().trim().is_empty())
    }

    /// Validate authentication configuration
    ///
    /// Production requires a signing secret.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && self.jwt_secret().is_none() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_issuer: None,
            jwt_audience: None,
            leeway_secs: default_leeway(),
        }
    }
}

fn default_leeway() -> u64 {
    30
}
