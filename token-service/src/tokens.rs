use chrono::{DateTime, Utc};
use common_auth::{encode, AuthResult, Claims, JwtConfig, SigningKey};
use tracing::debug;

/// Issues tokens for a fixed key and issuance policy.
pub struct TokenSigner {
    config: JwtConfig,
    key: SigningKey,
}

pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
}

impl TokenSigner {
    pub fn new(config: JwtConfig, key: SigningKey) -> Self {
        Self { config, key }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn issue_token(&self, subject_id: &str, role: &str) -> AuthResult<IssuedToken> {
        self.issue_token_at(subject_id, role, Utc::now())
    }

    pub fn issue_token_at(
        &self,
        subject_id: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let claims = Claims::issue(subject_id, role, &self.config, now)?;
        let token = encode(&claims, &self.key, self.config.algorithm())?;
        debug!(
            subject = claims.subject(),
            expires_at = %claims.expires_at(),
            "issued token"
        );

        Ok(IssuedToken {
            token,
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            expires_in: (claims.expires_at() - claims.issued_at()).num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_auth::{AuthError, ErrorKind, TokenVerifier};

    const SECRET: &str = "MyTestJwtKeyIsSecureAnd32CharLong";

    fn signer() -> TokenSigner {
        let config = JwtConfig::new("TestIssuer", "TestAudience");
        TokenSigner::new(config, SigningKey::from_secret(SECRET).unwrap())
    }

    #[test]
    fn issued_token_verifies_with_matching_policy() {
        let signer = signer();
        let issued = signer.issue_token("test-user", "Admin").expect("token");
        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, 86_400);

        let verifier = TokenVerifier::new(
            SigningKey::from_secret(SECRET).unwrap(),
            signer.config().clone(),
        );
        let result = verifier.verify(&issued.token);
        assert!(result.is_valid());
    }

    #[test]
    fn rejects_blank_identity() {
        let err = signer().issue_token("", "Admin").err().expect("error");
        assert!(matches!(err, AuthError::MissingSubject));
        assert_eq!(err.kind(), ErrorKind::Encoding);

        let err = signer().issue_token("test-user", "").err().expect("error");
        assert!(matches!(err, AuthError::MissingRole));
    }
}
