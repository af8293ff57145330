//! Compact `header.payload.signature` serialization.
//!
//! Each segment is base64url without padding. The MAC covers the literal
//! `header.payload` text exactly as it appears in the token; [`decode`]
//! hands that span back untouched so verification never depends on
//! re-serializing parsed JSON.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::algorithm::Algorithm;
use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::keys::SigningKey;

pub const SEGMENT_DELIMITER: char = '.';

/// Upper bound on the encoded token length accepted by [`decode`].
pub const MAX_TOKEN_LENGTH: usize = 8 * 1024;

pub const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl TokenHeader {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            alg: algorithm.as_str().to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        }
    }
}

/// Token split into its parts. Nothing in here has been authenticated.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub header: TokenHeader,
    pub payload: Value,
    pub signature: Vec<u8>,
    /// `header_segment.payload_segment` as it appeared in the input.
    pub signed_bytes: String,
}

/// Serializes and signs `claims`.
pub fn encode(claims: &Claims, key: &SigningKey, algorithm: Algorithm) -> AuthResult<String> {
    if claims.subject().trim().is_empty() {
        return Err(AuthError::MissingSubject);
    }
    if claims.role().trim().is_empty() {
        return Err(AuthError::MissingRole);
    }
    if key.is_empty() {
        return Err(AuthError::EmptyKey);
    }
    algorithm.ensure_key_strength(key)?;

    let header = serde_json::to_vec(&TokenHeader::new(algorithm))?;
    let payload = serde_json::to_vec(&claims.to_repr())?;

    let mut token = String::with_capacity((header.len() + payload.len()) * 4 / 3 + 64);
    URL_SAFE_NO_PAD.encode_string(&header, &mut token);
    token.push(SEGMENT_DELIMITER);
    URL_SAFE_NO_PAD.encode_string(&payload, &mut token);

    let signature = algorithm.sign(key, token.as_bytes())?;
    token.push(SEGMENT_DELIMITER);
    URL_SAFE_NO_PAD.encode_string(&signature, &mut token);
    Ok(token)
}

/// Splits `token` into header, payload and signature without trusting any of them.
pub fn decode(token: &str) -> AuthResult<DecodedToken> {
    if token.len() > MAX_TOKEN_LENGTH {
        return Err(AuthError::Malformed(format!(
            "token length {} exceeds limit of {MAX_TOKEN_LENGTH}",
            token.len()
        )));
    }

    let mut segments = token.split(SEGMENT_DELIMITER);
    let (header_b64, payload_b64, signature_b64) =
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(payload), Some(signature), None) => (header, payload, signature),
            _ => {
                return Err(AuthError::Malformed(
                    "expected exactly three segments".to_string(),
                ))
            }
        };

    let header: TokenHeader = serde_json::from_slice(&decode_segment("header", header_b64)?)
        .map_err(|err| AuthError::Malformed(format!("header is not valid JSON: {err}")))?;

    let payload: Value = serde_json::from_slice(&decode_segment("payload", payload_b64)?)
        .map_err(|err| AuthError::Malformed(format!("payload is not valid JSON: {err}")))?;
    if !payload.is_object() {
        return Err(AuthError::Malformed(
            "payload is not a JSON object".to_string(),
        ));
    }

    let signature = decode_segment("signature", signature_b64)?;

    // header_b64 and payload_b64 are adjacent slices of `token`.
    let signed_bytes = token[..header_b64.len() + 1 + payload_b64.len()].to_string();

    Ok(DecodedToken {
        header,
        payload,
        signature,
        signed_bytes,
    })
}

fn decode_segment(name: &str, segment: &str) -> AuthResult<Vec<u8>> {
    if segment.is_empty() {
        return Err(AuthError::Malformed(format!("{name} segment is empty")));
    }
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| AuthError::Malformed(format!("{name} segment is not base64url: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use chrono::{TimeZone, Utc};

    const SECRET: &str = "MyTestJwtKeyIsSecureAnd32CharLong";

    fn sample_token() -> String {
        let config = JwtConfig::new("TestIssuer", "TestAudience");
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = Claims::issue("test-user", "Admin", &config, now).unwrap();
        let key = SigningKey::from_secret(SECRET).unwrap();
        encode(&claims, &key, Algorithm::HS256).unwrap()
    }

    #[test]
    fn encode_produces_three_url_safe_segments() {
        let token = sample_token();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        for segment in segments {
            assert!(!segment.is_empty());
            assert!(segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn decode_exposes_parts_and_signed_span() {
        let token = sample_token();
        let decoded = decode(&token).expect("decodes");

        assert_eq!(decoded.header, TokenHeader::new(Algorithm::HS256));
        assert_eq!(decoded.payload["sub"], "test-user");
        assert_eq!(decoded.payload["role"], "Admin");
        assert_eq!(decoded.payload["iss"], "TestIssuer");
        assert_eq!(decoded.payload["aud"], "TestAudience");
        assert_eq!(decoded.payload["iat"], 1_704_067_200i64);
        assert_eq!(decoded.payload["exp"], 1_704_153_600i64);
        assert_eq!(decoded.signature.len(), 32);

        let last_dot = token.rfind('.').unwrap();
        assert_eq!(decoded.signed_bytes, &token[..last_dot]);
    }

    #[test]
    fn header_json_is_stable() {
        let token = sample_token();
        let header_b64 = token.split('.').next().unwrap();
        let header = URL_SAFE_NO_PAD.decode(header_b64).unwrap();
        assert_eq!(header, br#"{"alg":"HS256","typ":"JWT"}"#);
    }

    #[test]
    fn decode_rejects_wrong_segment_count() {
        for input in ["", "abc", "a.b", "a.b.c.d", "...."] {
            let err = decode(input).unwrap_err();
            assert!(matches!(err, AuthError::Malformed(_)), "input {input:?}");
        }
    }

    #[test]
    fn decode_rejects_bad_segments() {
        assert!(matches!(decode("not.a.token"), Err(AuthError::Malformed(_))));

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let array_payload = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let token = format!("{header}.{array_payload}.c2ln");
        assert!(matches!(decode(&token), Err(AuthError::Malformed(_))));

        let padded = format!("{header}.{}=.c2ln", URL_SAFE_NO_PAD.encode(b"{}"));
        assert!(matches!(decode(&padded), Err(AuthError::Malformed(_))));

        let empty_signature = format!("{header}.{}.", URL_SAFE_NO_PAD.encode(b"{}"));
        assert!(matches!(
            decode(&empty_signature),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_oversized_input() {
        let token = "a".repeat(MAX_TOKEN_LENGTH + 1);
        assert!(matches!(decode(&token), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn encode_rejects_key_too_short_for_algorithm() {
        let config = JwtConfig::new("TestIssuer", "TestAudience");
        let claims = Claims::issue("test-user", "Admin", &config, Utc::now()).unwrap();
        let key = SigningKey::from_secret(SECRET).unwrap();
        let err = encode(&claims, &key, Algorithm::HS512).unwrap_err();
        assert!(matches!(err, AuthError::WeakKey { required: 64, .. }));
    }
}
