//! HMAC-SHA256 payload signing for outbound callbacks.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::VaultError;

type HmacSha256 = Hmac<Sha256>;

/// Sign a payload string, returning the hex-encoded MAC.
pub fn sign_payload(payload: &str, secret: &str) -> Result<String, VaultError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("HMAC key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Sign a JSON payload by serializing it first.
///
/// Map keys serialize in sorted order, so logically equal values
/// produce the same signature regardless of construction order.
pub fn sign_json(payload: &serde_json::Value, secret: &str) -> Result<String, VaultError> {
    let serialized = serde_json::to_string(payload)
        .map_err(|e| VaultError::Crypto(format!("payload serialize: {e}")))?;
    sign_payload(&serialized, secret)
}

/// Verify a hex-encoded signature against a payload.
///
/// The comparison happens inside the MAC verification (constant
/// time); malformed signatures are simply rejected.
pub fn verify_signature(payload: &str, signature: &str, secret: &str) -> bool {
    let expected = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_verify_roundtrip() {
        let signature = sign_payload("workflow activated", "callback-secret").unwrap();
        assert!(verify_signature(
            "workflow activated",
            &signature,
            "callback-secret"
        ));
    }

    #[test]
    fn signature_is_hex_sha256() {
        let signature = sign_payload("payload", "secret").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn rejects_tampered_payload() {
        let signature = sign_payload("original", "secret").unwrap();
        assert!(!verify_signature("tampered", &signature, "secret"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let signature = sign_payload("payload", "secret-a").unwrap();
        assert!(!verify_signature("payload", &signature, "secret-b"));
    }

    #[test]
    fn rejects_malformed_signature() {
        assert!(!verify_signature("payload", "not hex", "secret"));
        assert!(!verify_signature("payload", "deadbeef", "secret"));
    }

    #[test]
    fn json_signature_ignores_key_order() {
        let a = json!({"tenant": "acme", "workflow": "welcome"});
        let b = json!({"workflow": "welcome", "tenant": "acme"});
        assert_eq!(
            sign_json(&a, "secret").unwrap(),
            sign_json(&b, "secret").unwrap()
        );
    }
}
