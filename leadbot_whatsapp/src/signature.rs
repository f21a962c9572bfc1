//! `X-Hub-Signature-256` verification for webhook deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Check the HMAC-SHA256 of `body` against the header value.
///
/// An empty `app_secret` disables verification.
#[must_use]
pub fn verify_signature(app_secret: &str, header: Option<&str>, body: &[u8]) -> bool {
    if app_secret.is_empty() {
        return true;
    }

    let signature = header.unwrap_or("").trim();
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature).trim();
    if signature.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Header value Meta would send for `body`.
#[must_use]
pub fn sign(app_secret: &str, body: &[u8]) -> String {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_secret() {
        assert!(verify_signature("", None, b"{}"));
    }

    #[test]
    fn test_accepts_matching_signature() {
        let header = sign("secret", b"{\"entry\":[]}");
        assert!(header.starts_with("sha256="));
        assert!(verify_signature("secret", Some(&header), b"{\"entry\":[]}"));
    }

    #[test]
    fn test_rejects_tampered_or_missing_signature() {
        let header = sign("secret", b"{\"entry\":[]}");
        assert!(!verify_signature("secret", Some(&header), b"{\"entry\":[1]}"));
        assert!(!verify_signature("other", Some(&header), b"{\"entry\":[]}"));
        assert!(!verify_signature("secret", None, b"{}"));
        assert!(!verify_signature("secret", Some("sha256=not-hex"), b"{}"));
    }
}
