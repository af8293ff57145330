use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Shortest secret accepted for any algorithm (HS256 floor).
pub const MIN_KEY_LENGTH: usize = 32;

/// Shared HMAC secret used for both signing and verification.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AuthError::EmptyKey);
        }
        if bytes.len() < MIN_KEY_LENGTH {
            return Err(AuthError::WeakKey {
                algorithm: Default::default(),
                actual: bytes.len(),
                required: MIN_KEY_LENGTH,
            });
        }
        Ok(Self { bytes })
    }

    /// Builds a key from the UTF-8 bytes of a configured secret string.
    pub fn from_secret(secret: &str) -> AuthResult<Self> {
        Self::new(secret.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}
