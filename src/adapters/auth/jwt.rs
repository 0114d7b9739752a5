//! HS256 JWT session validator.
//!
//! Validates bearer tokens signed with a shared secret by the hosted auth
//! service. The `sub` claim becomes the user id.
//!
//! # Security
//!
//! - Signature, `exp` and (when configured) `iss`/`aud` are always checked
//! - Only HS256 is accepted; tokens claiming another algorithm are rejected

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Configuration for HS256 token validation.
#[derive(Clone)]
pub struct JwtConfig {
    secret: SecretString,
    issuer: Option<String>,
    audience: Option<String>,
    leeway_secs: u64,
}

impl JwtConfig {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            issuer: None,
            audience: None,
            leeway_secs: 30,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
}

pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;

        // A configured issuer or audience must also be present in the token.
        let mut required = vec!["exp", "sub"];
        if config.issuer.is_some() {
            required.push("iss");
        }
        if config.audience.is_some() {
            required.push("aud");
        }
        validation.set_required_spec_claims(&required);

        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
            issuer: config.issuer,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    tracing::warn!(error = %e, "Token issued for another service");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            }
        })?;

        let user_id = UserId::new(&data.claims.sub).map_err(|_| {
            tracing::warn!("Token has an empty subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, data.claims.email))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-jwt-secret";

    fn token(sub: &str, exp_offset_secs: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
            email: Some("member@example.com".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn token_with(extra: serde_json::Value) -> String {
        let mut claims = serde_json::json!({
            "sub": "user-42",
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        if let (Some(claims), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
            claims.extend(extra.clone());
        }
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn validator() -> JwtSessionValidator {
        JwtSessionValidator::new(JwtConfig::new(SecretString::new(SECRET.to_string())))
    }

    #[tokio::test]
    async fn valid_token_yields_subject_as_user_id() {
        let user = validator().validate(&token("user-42", 3600, SECRET)).await.unwrap();
        assert_eq!(user.id.as_str(), "user-42");
        assert_eq!(user.email.as_deref(), Some("member@example.com"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let result = validator().validate(&token("user-42", -3600, SECRET)).await;
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let result = validator().validate(&token("user-42", 3600, "other")).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        assert_eq!(validator().validate("not-a-jwt").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn audience_is_enforced_when_configured() {
        let v = JwtSessionValidator::new(
            JwtConfig::new(SecretString::new(SECRET.to_string())).with_audience("authenticated"),
        );
        // Token carries no aud claim
        assert_eq!(v.validate(&token("user-42", 3600, SECRET)).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn matching_audience_is_accepted() {
        let v = JwtSessionValidator::new(
            JwtConfig::new(SecretString::new(SECRET.to_string())).with_audience("authenticated"),
        );
        let user = v
            .validate(&token_with(serde_json::json!({"aud": "authenticated"})))
            .await
            .unwrap();
        assert_eq!(user.id.as_str(), "user-42");
    }

    #[tokio::test]
    async fn foreign_audience_is_rejected() {
        let v = JwtSessionValidator::new(
            JwtConfig::new(SecretString::new(SECRET.to_string())).with_audience("authenticated"),
        );
        let result = v.validate(&token_with(serde_json::json!({"aud": "billing"}))).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn issuer_is_required_when_configured() {
        let v = JwtSessionValidator::new(
            JwtConfig::new(SecretString::new(SECRET.to_string())).with_issuer("https://auth.boxercise.in"),
        );

        let missing = v.validate(&token_with(serde_json::json!({}))).await;
        assert_eq!(missing, Err(AuthError::InvalidToken));

        let present = v
            .validate(&token_with(serde_json::json!({"iss": "https://auth.boxercise.in"})))
            .await;
        assert!(present.is_ok());
    }

    #[tokio::test]
    async fn audience_is_optional_when_not_configured() {
        let result = validator()
            .validate(&token_with(serde_json::json!({"aud": "anything"})))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let debug = format!("{:?}", validator());
        assert!(!debug.contains(SECRET));
    }
}
