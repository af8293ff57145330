use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common_auth::{AuthError, ErrorKind};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub trace_id: Uuid,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },
    #[error("internal error")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal {
            message: e.to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.kind() {
            ErrorKind::Encoding => ApiError::bad_request("invalid_token_request", err.to_string()),
            _ => ApiError::internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::new_v4();
        let (status, code, message) = match self {
            ApiError::BadRequest { code, message } => {
                warn!(%trace_id, code, %message, "rejected request");
                (StatusCode::BAD_REQUEST, code, message)
            }
            ApiError::Internal { message } => {
                // Detail stays in the log; callers only get the trace id.
                error!(%trace_id, %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            code,
            message,
            trace_id,
        };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(code) {
            resp.headers_mut().insert("X-Error-Code", val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
