//! Razorpay signature verification.
//!
//! Two schemes share one primitive, HMAC-SHA256 hex-encoded:
//!
//! - checkout callback: `HMAC(key_secret, "<order_id>|<payment_id>")`
//! - webhook: `HMAC(webhook_secret, <raw body bytes>)`
//!
//! Comparison decodes the client-supplied hex (either case) and compares
//! bytes in constant time. Malformed hex is a mismatch, never an error.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature did not match the expected value.
///
/// Carries both sides so callers can log them or, when explicitly enabled,
/// echo them for integration debugging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Signature mismatch")]
pub struct SignatureMismatch {
    pub expected: String,
    pub received: String,
}

/// Verifier bound to one shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl SignatureVerifier {
    /// Creates a verifier. Returns `None` for an empty or blank secret.
    pub fn new(secret: &str) -> Option<Self> {
        if secret.trim().is_empty() {
            return None;
        }
        Some(Self {
            secret: secret.as_bytes().to_vec(),
        })
    }

    /// Hex HMAC over `order_id|payment_id`.
    pub fn checkout_signature(&self, order_id: &str, payment_id: &str) -> String {
        let payload = format!("{}|{}", order_id, payment_id);
        hex::encode(self.mac(payload.as_bytes()))
    }

    /// Hex HMAC over the untouched request body.
    pub fn webhook_signature(&self, body: &[u8]) -> String {
        hex::encode(self.mac(body))
    }

    /// Verifies a checkout-callback signature.
    pub fn verify_checkout(
        &self,
        order_id: &str,
        payment_id: &str,
        provided: &str,
    ) -> Result<(), SignatureMismatch> {
        let payload = format!("{}|{}", order_id, payment_id);
        self.verify(payload.as_bytes(), provided)
    }

    /// Verifies a webhook body signature.
    pub fn verify_webhook(&self, body: &[u8], provided: &str) -> Result<(), SignatureMismatch> {
        self.verify(body, provided)
    }

    fn verify(&self, payload: &[u8], provided: &str) -> Result<(), SignatureMismatch> {
        let expected = self.mac(payload);
        let matches = hex::decode(provided.trim())
            .map(|received| constant_time_compare(&expected, &received))
            .unwrap_or(false);

        if matches {
            Ok(())
        } else {
            Err(SignatureMismatch {
                expected: hex::encode(&expected),
                received: provided.to_string(),
            })
        }
    }

    fn mac(&self, payload: &[u8]) -> Vec<u8> {
        // Err is unreachable for HMAC; an empty tag never compares equal.
        match HmacSha256::new_from_slice(&self.secret) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.finalize().into_bytes().to_vec()
            }
            Err(_) => Vec::new(),
        }
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.is_empty() || a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "rzp_test_secret";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET).unwrap()
    }

    fn reference_hmac(secret: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    // ══════════════════════════════════════════════════════════════
    // Checkout callback
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn checkout_signature_is_hmac_of_pipe_joined_ids() {
        let expected = reference_hmac(SECRET, b"ord_1|pay_1");
        assert_eq!(verifier().checkout_signature("ord_1", "pay_1"), expected);
        assert!(verifier().verify_checkout("ord_1", "pay_1", &expected).is_ok());
    }

    #[test]
    fn checkout_signature_accepts_upper_case_hex() {
        let upper = reference_hmac(SECRET, b"ord_1|pay_1").to_ascii_uppercase();
        assert!(verifier().verify_checkout("ord_1", "pay_1", &upper).is_ok());
    }

    #[test]
    fn checkout_signature_for_other_payment_is_rejected() {
        let sig = verifier().checkout_signature("ord_1", "pay_1");
        let err = verifier().verify_checkout("ord_1", "pay_2", &sig).unwrap_err();
        assert_eq!(err.received, sig);
        assert_eq!(err.expected, verifier().checkout_signature("ord_1", "pay_2"));
    }

    #[test]
    fn malformed_hex_is_a_mismatch() {
        assert!(verifier().verify_checkout("ord_1", "pay_1", "zz-not-hex").is_err());
        assert!(verifier().verify_checkout("ord_1", "pay_1", "").is_err());
    }

    #[test]
    fn truncated_signature_is_a_mismatch() {
        let sig = verifier().checkout_signature("ord_1", "pay_1");
        assert!(verifier().verify_checkout("ord_1", "pay_1", &sig[..32]).is_err());
    }

    #[test]
    fn different_secret_is_rejected() {
        let other = SignatureVerifier::new("another_secret").unwrap();
        let sig = other.checkout_signature("ord_1", "pay_1");
        assert!(verifier().verify_checkout("ord_1", "pay_1", &sig).is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Webhook
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn webhook_signature_covers_raw_bytes() {
        let body = br#"{"event":"payment.captured"}"#;
        let sig = reference_hmac(SECRET, body);
        assert!(verifier().verify_webhook(body, &sig).is_ok());
    }

    #[test]
    fn webhook_tampered_body_is_rejected() {
        let body = br#"{"event":"payment.captured","amount":100}"#;
        let sig = verifier().webhook_signature(body);
        let tampered = br#"{"event":"payment.captured","amount":999}"#;
        assert!(verifier().verify_webhook(tampered, &sig).is_err());
    }

    #[test]
    fn webhook_whitespace_change_is_rejected() {
        let body = br#"{"a":1}"#;
        let sig = verifier().webhook_signature(body);
        assert!(verifier().verify_webhook(br#"{"a": 1}"#, &sig).is_err());
    }

    #[test]
    fn blank_secret_yields_no_verifier() {
        assert!(SignatureVerifier::new("").is_none());
        assert!(SignatureVerifier::new("   ").is_none());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let printed = format!("{:?}", verifier());
        assert!(!printed.contains(SECRET));
    }
}
