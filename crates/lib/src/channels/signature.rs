//! X-Line-Signature: base64(HMAC-SHA256(channel secret, raw body)).

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("signature does not match body")]
    Mismatch,
}

fn mac_for(secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts keys of any length");
    mac.update(body);
    mac
}

/// Compute the signature the platform would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> String {
    B64.encode(mac_for(secret, body).finalize().into_bytes())
}

/// Check `signature` (header value) against `body`. Comparison is constant time.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> Result<(), SignatureError> {
    let provided = B64.decode(signature.trim())?;
    mac_for(secret, body)
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"events":[]}"#;

    #[test]
    fn accepts_own_signature() {
        let sig = sign("secret", BODY);
        assert!(verify("secret", BODY, &sig).is_ok());
    }

    #[test]
    fn known_vector() {
        // Well-known HMAC-SHA256 example, base64 encoded.
        let sig = sign("key", b"The quick brown fox jumps over the lazy dog");
        assert_eq!(sig, "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=");
    }

    #[test]
    fn rejects_other_secret() {
        let sig = sign("secret", BODY);
        assert!(matches!(
            verify("other", BODY, &sig),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn rejects_tampered_body() {
        let sig = sign("secret", BODY);
        assert!(verify("secret", br#"{"events":[{}]}"#, &sig).is_err());
    }

    #[test]
    fn rejects_garbage_header() {
        assert!(matches!(
            verify("secret", BODY, "not base64!"),
            Err(SignatureError::Encoding(_))
        ));
        assert!(verify("secret", BODY, "").is_err());
    }
}
