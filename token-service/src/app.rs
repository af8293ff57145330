use std::sync::Arc;

use anyhow::Result;
use axum::extract::{FromRef, State};
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use common_auth::TokenVerifier;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

use crate::config::ServiceConfig;
use crate::handlers::{create_token, current_identity, health, verify_token};
use crate::metrics::TokenMetrics;
use crate::tokens::TokenSigner;

#[derive(Clone)]
pub struct AppState {
    pub token_signer: Arc<TokenSigner>,
    pub token_verifier: Arc<TokenVerifier>,
    pub metrics: Arc<TokenMetrics>,
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.token_verifier.clone()
    }
}

impl FromRef<AppState> for Arc<TokenSigner> {
    fn from_ref(state: &AppState) -> Self {
        state.token_signer.clone()
    }
}

impl AppState {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let token_signer = TokenSigner::new(config.jwt.clone(), config.signing_key.clone());
        let token_verifier = TokenVerifier::new(config.signing_key.clone(), config.jwt.clone());
        Ok(Self {
            token_signer: Arc::new(token_signer),
            token_verifier: Arc::new(token_verifier),
            metrics: Arc::new(TokenMetrics::new()?),
        })
    }
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn build_router(state: AppState, config: &ServiceConfig) -> Router {
    let router = Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/auth/token", post(create_token))
        .route("/api/auth/verify", post(verify_token))
        .route("/api/auth/me", get(current_identity))
        .with_state(state);

    if config.cors_origins.is_empty() {
        return router;
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, axum::http::header::AUTHORIZATION]);
    router.layer(cors)
}
