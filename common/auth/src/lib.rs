//! Signed identity tokens: issuance-side codec and policy-checking verifier.

pub mod algorithm;
pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod extractors;
pub mod keys;
pub mod verifier;

pub use algorithm::Algorithm;
pub use claims::Claims;
pub use codec::{decode, encode, DecodedToken, TokenHeader, MAX_TOKEN_LENGTH};
pub use config::{parse_validity_days, JwtConfig, DEFAULT_VALIDITY_DAYS};
pub use error::{AuthError, AuthResult, ErrorKind};
pub use extractors::AuthContext;
pub use keys::{SigningKey, MIN_KEY_LENGTH};
pub use verifier::{TokenVerifier, VerificationResult};
