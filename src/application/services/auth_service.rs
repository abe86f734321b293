//! Authentication service for the API key.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Domain separator mixed into every tag.
const TAG_CONTEXT: &[u8] = b"shortlink-api-key";

/// Checks bearer tokens against the configured API key.
///
/// Only an HMAC-SHA256 tag of the key is kept; candidates are tagged the same
/// way and compared with [`Mac::verify_slice`], which runs in constant time.
pub struct AuthService {
    expected_tag: Vec<u8>,
}

impl AuthService {
    pub fn new(api_key: &str) -> Self {
        Self {
            expected_tag: tag_for(api_key).finalize().into_bytes().to_vec(),
        }
    }

    /// Accepts the token only if it equals the configured key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] on mismatch.
    pub fn authenticate(&self, token: &str) -> Result<(), AppError> {
        tag_for(token)
            .verify_slice(&self.expected_tag)
            .map_err(|_| {
                AppError::unauthorized("Unauthorized", json!({"reason": "Invalid API key"}))
            })
    }
}

fn tag_for(key: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(TAG_CONTEXT);
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_success() {
        let service = AuthService::new("s3cret-key");
        assert!(service.authenticate("s3cret-key").is_ok());
    }

    #[test]
    fn test_authenticate_wrong_key() {
        let service = AuthService::new("s3cret-key");

        for candidate in ["s3cret-kez", "s3cret-key ", "", "S3CRET-KEY"] {
            let err = service.authenticate(candidate).unwrap_err();
            assert!(matches!(err, AppError::Unauthorized { .. }), "{candidate}");
        }
    }

    #[test]
    fn test_key_is_not_stored_in_clear() {
        let service = AuthService::new("s3cret-key");
        assert_eq!(service.expected_tag.len(), 32);
        assert_ne!(service.expected_tag, b"s3cret-key".to_vec());
    }
}
