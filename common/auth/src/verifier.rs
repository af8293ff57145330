use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::algorithm::Algorithm;
use crate::claims::Claims;
use crate::codec::{self, DecodedToken};
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult, ErrorKind};
use crate::keys::SigningKey;

/// Outcome of verifying a token. `Invalid` never carries claim data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationResult {
    Valid { subject_id: String, role: String },
    Invalid { kind: ErrorKind, detail: String },
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            VerificationResult::Valid { .. } => None,
            VerificationResult::Invalid { kind, .. } => Some(*kind),
        }
    }

    fn rejected(err: AuthError) -> Self {
        VerificationResult::Invalid {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

/// Stateless token verifier bound to one key and policy.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: SigningKey,
    config: JwtConfig,
}

impl TokenVerifier {
    pub fn new(key: SigningKey, config: JwtConfig) -> Self {
        Self { key, config }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn verify(&self, token: &str) -> VerificationResult {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` against the clock value `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> VerificationResult {
        match self.verify_claims(token, now) {
            Ok(claims) => VerificationResult::Valid {
                subject_id: claims.subject().to_string(),
                role: claims.role().to_string(),
            },
            Err(err) => VerificationResult::rejected(err),
        }
    }

    /// Same checks as [`verify_at`](Self::verify_at), returning the full claim set.
    pub fn verify_claims(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let decoded = codec::decode(token).inspect_err(|err| {
            debug!(error = %err, "rejected malformed token");
        })?;

        self.check_signature(&decoded)?;

        let claims = Claims::try_from(decoded.payload).inspect_err(|err| {
            warn!(error = %err, "signed token carries unusable claims");
        })?;

        if claims.issuer() != self.config.issuer() || claims.audience() != self.config.audience()
        {
            warn!(
                issuer = claims.issuer(),
                audience = claims.audience(),
                "token issuer or audience mismatch"
            );
            return Err(AuthError::IssuerAudienceMismatch);
        }

        let deadline = claims
            .expires_at()
            .checked_add_signed(self.config.leeway())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if now > deadline {
            debug!(
                expires_at = %claims.expires_at(),
                leeway_seconds = self.config.leeway_seconds(),
                "token expired"
            );
            return Err(AuthError::Expired(claims.expires_at().to_rfc3339()));
        }

        debug!(subject = claims.subject(), "verified token successfully");
        Ok(claims)
    }

    fn check_signature(&self, decoded: &DecodedToken) -> AuthResult<()> {
        let algorithm = decoded.header.alg.parse::<Algorithm>().inspect_err(|err| {
            warn!(error = %err, "token names an unsupported algorithm");
        })?;
        if !self.config.allowed_algorithms().contains(&algorithm) {
            warn!(%algorithm, "token algorithm not permitted by policy");
            return Err(AuthError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        algorithm.ensure_key_strength(&self.key).map_err(|err| {
            error!(error = %err, "configured key cannot verify this algorithm");
            AuthError::Mac(err.to_string())
        })?;

        let matches = algorithm
            .verify(&self.key, decoded.signed_bytes.as_bytes(), &decoded.signature)
            .inspect_err(|err| {
                error!(error = %err, "signature computation failed");
            })?;
        if !matches {
            debug!("token signature mismatch");
            return Err(AuthError::BadSignature);
        }
        Ok(())
    }
}
