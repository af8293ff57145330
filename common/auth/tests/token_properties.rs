use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use common_auth::{
    encode, parse_validity_days, Claims, ErrorKind, JwtConfig, SigningKey, TokenVerifier,
    VerificationResult,
};
use proptest::prelude::*;

const SECRET: &str = "MyTestJwtKeyIsSecureAnd32CharLong";

fn config() -> JwtConfig {
    JwtConfig::new("TestIssuer", "TestAudience")
}

fn key() -> SigningKey {
    SigningKey::from_secret(SECRET).expect("key")
}

fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 14, 9, 30, 0).unwrap()
}

fn issue(subject: &str, role: &str) -> String {
    let claims = Claims::issue(subject, role, &config(), issued_at()).expect("claims");
    encode(&claims, &key(), config().algorithm()).expect("token")
}

#[test]
fn concrete_admin_scenario_round_trips() {
    let token = issue("test-user", "Admin");
    let verifier = TokenVerifier::new(key(), config());

    let result = verifier.verify_at(&token, issued_at());
    assert_eq!(
        result,
        VerificationResult::Valid {
            subject_id: "test-user".to_string(),
            role: "Admin".to_string(),
        }
    );
}

#[test]
fn unparseable_window_still_yields_one_day_token() {
    let days = parse_validity_days(Some(""));
    let config = config().with_validity_days(days);
    let claims = Claims::issue("test-user", "Admin", &config, issued_at()).unwrap();
    let token = encode(&claims, &key(), config.algorithm()).unwrap();

    let verifier = TokenVerifier::new(key(), config);
    let claims = verifier.verify_claims(&token, issued_at()).expect("valid");
    assert_eq!(claims.expires_at() - claims.issued_at(), Duration::days(1));
}

#[test]
fn flipping_any_signature_byte_is_rejected() {
    let token = issue("test-user", "Admin");
    let verifier = TokenVerifier::new(key(), config());
    let (signed, signature_b64) = token.rsplit_once('.').unwrap();
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).unwrap();

    for index in 0..signature.len() {
        let mut tampered = signature.clone();
        tampered[index] ^= 0x80;
        let forged = format!("{signed}.{}", URL_SAFE_NO_PAD.encode(&tampered));

        let result = verifier.verify_at(&forged, issued_at());
        assert_eq!(
            result.error_kind(),
            Some(ErrorKind::BadSignature),
            "byte {index}"
        );
    }
}

#[test]
fn tampered_payload_is_rejected() {
    let token = issue("test-user", "User");
    let verifier = TokenVerifier::new(key(), config());
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();

    let mut payload: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(&parts[1]).unwrap()).unwrap();
    payload["role"] = serde_json::json!("Admin");
    parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());

    let result = verifier.verify_at(&parts.join("."), issued_at());
    assert_eq!(result.error_kind(), Some(ErrorKind::BadSignature));
}

#[test]
fn expired_and_future_tokens() {
    let token = issue("test-user", "Admin");
    let verifier = TokenVerifier::new(key(), config());

    assert!(verifier
        .verify_at(&token, issued_at() + Duration::hours(23))
        .is_valid());
    let result = verifier.verify_at(&token, issued_at() + Duration::days(2));
    assert_eq!(result.error_kind(), Some(ErrorKind::Expired));
}

#[test]
fn clock_skew_window_boundaries() {
    let token = issue("test-user", "Admin");
    let verifier = TokenVerifier::new(key(), config().with_leeway(300));
    let expires_at = issued_at() + Duration::days(1);

    assert!(verifier
        .verify_at(&token, expires_at + Duration::seconds(299))
        .is_valid());
    let result = verifier.verify_at(&token, expires_at + Duration::seconds(301));
    assert_eq!(result.error_kind(), Some(ErrorKind::Expired));
}

#[test]
fn malformed_inputs_never_panic() {
    let verifier = TokenVerifier::new(key(), config());
    for input in [
        "",
        "not.a.token",
        "a.b",
        "a.b.c.d",
        "....",
        "eyJhbGciOiJIUzI1NiJ9..c2ln",
        "%%%.%%%.%%%",
    ] {
        let result = verifier.verify_at(input, issued_at());
        assert_eq!(result.error_kind(), Some(ErrorKind::Malformed), "{input:?}");
    }
}

proptest! {
    #[test]
    fn round_trip_preserves_identity(
        subject in "[A-Za-z0-9@._-]{1,40}",
        role in "[A-Za-z_]{1,20}",
    ) {
        let token = issue(&subject, &role);
        let verifier = TokenVerifier::new(key(), config());

        let result = verifier.verify_at(&token, issued_at());
        prop_assert_eq!(
            result,
            VerificationResult::Valid { subject_id: subject, role }
        );
    }

    #[test]
    fn other_keys_never_verify(secret in "[ -~]{32,64}") {
        prop_assume!(secret != SECRET);
        let token = issue("test-user", "Admin");
        let verifier = TokenVerifier::new(SigningKey::from_secret(&secret).unwrap(), config());

        let result = verifier.verify_at(&token, issued_at());
        prop_assert_eq!(result.error_kind(), Some(ErrorKind::BadSignature));
    }

    #[test]
    fn arbitrary_strings_are_rejected_without_panicking(input in ".{0,200}") {
        let verifier = TokenVerifier::new(key(), config());
        let result = verifier.verify_at(&input, issued_at());
        prop_assert!(!result.is_valid());
    }
}
