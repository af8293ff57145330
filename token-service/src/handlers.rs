use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::SecondsFormat;
use common_auth::{AuthContext, VerificationResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenResponse {
    pub token: String,
    pub expires_at: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    pub valid_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub user_id: String,
    pub role: String,
    pub expires_at: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn create_token(
    State(state): State<AppState>,
    Json(request): Json<CreateTokenRequest>,
) -> ApiResult<Json<CreateTokenResponse>> {
    let issued = state
        .token_signer
        .issue_token(&request.user_id, &request.role)?;
    state.metrics.token_issued();
    info!(user_id = %request.user_id, role = %request.role, "token issued");

    Ok(Json(CreateTokenResponse {
        token: issued.token,
        expires_at: issued.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        expires_in: issued.expires_in,
    }))
}

pub async fn verify_token(
    State(state): State<AppState>,
    Json(request): Json<VerifyTokenRequest>,
) -> Response {
    match state.token_verifier.verify(&request.token) {
        VerificationResult::Valid { subject_id, role } => {
            state.metrics.verification("valid");
            let body = VerifyTokenResponse {
                valid_token: true,
                user_id: Some(subject_id),
                role: Some(role),
                error_kind: None,
                error: None,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        VerificationResult::Invalid { kind, detail } => {
            state.metrics.verification(kind.as_str());
            warn!(error_kind = %kind, %detail, "token verification failed");
            let body = VerifyTokenResponse {
                valid_token: false,
                user_id: None,
                role: None,
                error_kind: Some(kind.to_string()),
                error: Some(detail),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

pub async fn current_identity(context: AuthContext) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        user_id: context.subject_id().to_string(),
        role: context.role().to_string(),
        expires_at: context
            .claims
            .expires_at()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}
