//! Session validation port for bearer token validation.
//!
//! This port defines the contract for validating access tokens and extracting
//! user identity. It is issuer-agnostic: the HS256 JWT adapter and the mock
//! adapter both implement it.
//!
//! # Security Requirements
//!
//! All implementations MUST validate:
//! - **Signature**: Token must be signed by the expected issuer
//! - **Expiry (exp)**: Token must not be expired
//! - **Issuer / audience**: when configured

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
