/**
 * Routes Module
 * API route handlers and the response/guard helpers they share
 */
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub mod analytics;
pub mod auth;
pub mod config;
pub mod health;
pub mod messages;
pub mod projects;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

/// Success response (for deletes and beacons)
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Extract the bearer token from the Authorization header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Gate for admin-only handlers.
///
/// Missing header, malformed header, bad signature, and expired token all
/// produce the same 401 body, so a caller cannot tell which check failed.
pub fn require_session(headers: &HeaderMap) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let authorized = extract_bearer_token(headers)
        .map(|t| crate::token::verify(t).is_ok())
        .unwrap_or(false);

    if authorized {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Invalid credentials")),
        ))
    }
}

/// Best-effort client address: proxy headers first, socket peer last.
pub fn client_ip(headers: &HeaderMap, addr: &SocketAddr) -> String {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        return ip.to_string();
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        return ip.to_string();
    }

    addr.ip().to_string()
}
