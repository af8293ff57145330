use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::algorithm::Algorithm;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("subject identifier must not be empty")]
    MissingSubject,
    #[error("role must not be empty")]
    MissingRole,
    #[error("signing key must not be empty")]
    EmptyKey,
    #[error("signing key is {actual} bytes but {algorithm} requires at least {required}")]
    WeakKey {
        algorithm: Algorithm,
        actual: usize,
        required: usize,
    },
    #[error("validity window overflows the supported time range")]
    ValidityOverflow,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("invalid claim '{0}': {1}")]
    InvalidClaim(&'static str, String),
    #[error("token signature does not match")]
    BadSignature,
    #[error("token issuer or audience does not match")]
    IssuerAudienceMismatch,
    #[error("token expired at {0}")]
    Expired(String),
    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("failed to serialize token segment: {0}")]
    Serialization(String),
    #[error("failed to initialise MAC: {0}")]
    Mac(String),
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

impl AuthError {
    /// Classifies the error into the finite taxonomy reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingSubject
            | AuthError::MissingRole
            | AuthError::EmptyKey
            | AuthError::WeakKey { .. } => ErrorKind::Encoding,
            AuthError::Malformed(_)
            | AuthError::InvalidClaim(_, _)
            | AuthError::MissingAuthorization
            | AuthError::InvalidAuthorization => ErrorKind::Malformed,
            AuthError::BadSignature => ErrorKind::BadSignature,
            AuthError::IssuerAudienceMismatch => ErrorKind::IssuerAudienceMismatch,
            AuthError::Expired(_) => ErrorKind::Expired,
            AuthError::ValidityOverflow
            | AuthError::UnsupportedAlgorithm(_)
            | AuthError::Serialization(_)
            | AuthError::Mac(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

/// Failure categories surfaced by issuance and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Encoding,
    Malformed,
    BadSignature,
    IssuerAudienceMismatch,
    Expired,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Encoding => "Encoding",
            ErrorKind::Malformed => "Malformed",
            ErrorKind::BadSignature => "BadSignature",
            ErrorKind::IssuerAudienceMismatch => "IssuerAudienceMismatch",
            ErrorKind::Expired => "Expired",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self.kind() {
            ErrorKind::Malformed
                if matches!(
                    self,
                    AuthError::MissingAuthorization | AuthError::InvalidAuthorization
                ) =>
            {
                (StatusCode::UNAUTHORIZED, "AUTH_HEADER")
            }
            ErrorKind::Malformed
            | ErrorKind::BadSignature
            | ErrorKind::IssuerAudienceMismatch
            | ErrorKind::Expired => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN"),
            ErrorKind::Encoding => (StatusCode::BAD_REQUEST, "AUTH_CLAIMS"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_INTERNAL"),
        };

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
