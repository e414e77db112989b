/**
 * Authentication Routes
 * TOTP login exchanging a one-time code for a signed 24-hour session token
 */
use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::routes::{extract_bearer_token, ErrorResponse};
use crate::token;
use crate::totp::{self, TotpError};

lazy_static::lazy_static! {
    /// Shared TOTP secret (base32) from environment
    pub static ref TOTP_SECRET: String = std::env::var("TOTP_SECRET").unwrap_or_default();
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyTotpRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyTotpResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenStatusResponse {
    pub valid: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/verify-totp
/// Exchange a valid 6-digit code for a session token
pub async fn verify_totp(Json(payload): Json<VerifyTotpRequest>) -> impl IntoResponse {
    let code = payload.code.trim();

    match totp::verify(&TOTP_SECRET, code, Utc::now().timestamp()) {
        Ok(()) => {}
        Err(TotpError::BadFormat) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Code must be 6 digits")),
            )
                .into_response();
        }
        Err(TotpError::Mismatch) => {
            tracing::warn!("Failed TOTP login attempt");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Invalid credentials")),
            )
                .into_response();
        }
        Err(TotpError::BadSecret) => {
            tracing::error!("TOTP_SECRET is missing or not valid base32");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Server error")),
            )
                .into_response();
        }
    }

    match token::issue() {
        Ok(session_token) => {
            tracing::info!("Admin session issued");
            (
                StatusCode::OK,
                Json(VerifyTotpResponse {
                    token: session_token,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to sign session token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Server error")),
            )
                .into_response()
        }
    }
}

/// GET /api/auth/verify-token
/// Report whether the presented session token is still valid
pub async fn verify_token(headers: HeaderMap) -> impl IntoResponse {
    let valid = extract_bearer_token(&headers)
        .map(|t| token::verify(t).is_ok())
        .unwrap_or(false);

    if valid {
        (StatusCode::OK, Json(TokenStatusResponse { valid: true }))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(TokenStatusResponse { valid: false }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;

    fn auth_router() -> Router {
        Router::new()
            .route("/api/auth/verify-totp", post(verify_totp))
            .route("/api/auth/verify-token", get(verify_token))
    }

    async fn post_json(
        app: Router,
        uri: &str,
        json: &impl serde::Serialize,
    ) -> (StatusCode, axum::body::Bytes) {
        let body = Body::from(serde_json::to_vec(json).unwrap());
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    async fn get_with_auth(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
        let mut builder = Request::get(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {}", t));
        }
        let res = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        res.status()
    }

    #[tokio::test]
    async fn test_verify_totp_short_code_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(),
            "/api/auth/verify-totp",
            &VerifyTotpRequest {
                code: "12345".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_totp_non_numeric_code_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(),
            "/api/auth/verify-totp",
            &VerifyTotpRequest {
                code: "12a456".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_totp_wrong_code_returns_unauthorized() {
        // Six digits and well-formed, so it reaches the comparison and loses.
        let (status, bytes) = post_json(
            auth_router(),
            "/api/auth/verify-totp",
            &VerifyTotpRequest {
                code: "000000".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Invalid credentials");
    }

    #[tokio::test]
    async fn test_verify_token_missing_returns_unauthorized() {
        let status = get_with_auth(auth_router(), "/api/auth/verify-token", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_token_garbage_returns_unauthorized() {
        let status =
            get_with_auth(auth_router(), "/api/auth/verify-token", Some("not.a.token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_token_valid_returns_ok() {
        let token = crate::token::issue().unwrap();
        let status =
            get_with_auth(auth_router(), "/api/auth/verify-token", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
