use chrono::{DateTime, DurationRound, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};

/// Identity claims carried by a token.
///
/// Issuance goes through [`Claims::issue`], which derives `expires_at` from
/// the configured validity window; there is no way to supply it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    subject: String,
    role: String,
    issuer: String,
    audience: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Claims {
    /// Builds the claim set for a new token issued at `now`.
    pub fn issue(
        subject: impl Into<String>,
        role: impl Into<String>,
        config: &JwtConfig,
        now: DateTime<Utc>,
    ) -> AuthResult<Self> {
        let subject = subject.into();
        let role = role.into();
        if subject.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }
        if role.trim().is_empty() {
            return Err(AuthError::MissingRole);
        }

        let issued_at = now
            .duration_trunc(TimeDelta::seconds(1))
            .map_err(|_| AuthError::ValidityOverflow)?;
        let expires_at = config
            .validity()
            .and_then(|window| issued_at.checked_add_signed(window))
            .ok_or(AuthError::ValidityOverflow)?;

        Ok(Self {
            subject,
            role,
            issuer: config.issuer().to_string(),
            audience: config.audience().to_string(),
            issued_at,
            expires_at,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub(crate) fn to_repr(&self) -> ClaimsRepr {
        ClaimsRepr {
            sub: self.subject.clone(),
            role: self.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: Some(self.issued_at.timestamp()),
            exp: self.expires_at.timestamp(),
        }
    }
}

/// Wire form of the payload segment.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ClaimsRepr {
    sub: String,
    role: String,
    iss: String,
    aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    exp: i64,
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        if value.sub.is_empty() {
            return Err(AuthError::InvalidClaim("sub", "empty".to_string()));
        }
        if value.role.is_empty() {
            return Err(AuthError::InvalidClaim("role", "empty".to_string()));
        }

        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        // Tokens without iat are treated as issued at their expiry instant.
        let issued_at = match value.iat {
            Some(iat) => Utc
                .timestamp_opt(iat, 0)
                .single()
                .ok_or_else(|| AuthError::InvalidClaim("iat", iat.to_string()))?,
            None => expires_at,
        };

        Ok(Self {
            subject: value.sub,
            role: value.role,
            issuer: value.iss,
            audience: value.aud,
            issued_at,
            expires_at,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value)
            .map_err(|err| AuthError::InvalidClaim("payload", err.to_string()))?;
        Claims::try_from(repr)
    }
}
