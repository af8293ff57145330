use std::fmt;
use std::str::FromStr;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{AuthError, AuthResult};
use crate::keys::SigningKey;

/// Symmetric MAC algorithms accepted in the token header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
        }
    }

    /// Minimum key length in bytes; matches the digest size.
    pub fn min_key_len(&self) -> usize {
        match self {
            Algorithm::HS256 => 32,
            Algorithm::HS384 => 48,
            Algorithm::HS512 => 64,
        }
    }

    pub(crate) fn ensure_key_strength(&self, key: &SigningKey) -> AuthResult<()> {
        let required = self.min_key_len();
        if key.len() < required {
            return Err(AuthError::WeakKey {
                algorithm: *self,
                actual: key.len(),
                required,
            });
        }
        Ok(())
    }

    /// Computes the MAC of `signing_input` under `key`.
    pub fn sign(&self, key: &SigningKey, signing_input: &[u8]) -> AuthResult<Vec<u8>> {
        let secret = key.as_bytes();
        let tag = match self {
            Algorithm::HS256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(mac_error)?;
                mac.update(signing_input);
                mac.finalize().into_bytes().to_vec()
            }
            Algorithm::HS384 => {
                let mut mac = Hmac::<Sha384>::new_from_slice(secret).map_err(mac_error)?;
                mac.update(signing_input);
                mac.finalize().into_bytes().to_vec()
            }
            Algorithm::HS512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(secret).map_err(mac_error)?;
                mac.update(signing_input);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(tag)
    }

    /// Recomputes the MAC and compares it with `signature` in constant time.
    pub fn verify(
        &self,
        key: &SigningKey,
        signing_input: &[u8],
        signature: &[u8],
    ) -> AuthResult<bool> {
        let expected = self.sign(key, signing_input)?;
        if expected.len() != signature.len() {
            return Ok(false);
        }
        Ok(constant_time_eq(&expected, signature))
    }
}

fn mac_error(err: hmac::digest::InvalidLength) -> AuthError {
    AuthError::Mac(err.to_string())
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = AuthError;

    fn from_str(value: &str) -> AuthResult<Self> {
        match value {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(AuthError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}
