/**
 * Message Routes
 * Public rate-limited contact form intake, admin-only inbox management
 */
use axum::{
    extract::{ConnectInfo, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::net::SocketAddr;
use uuid::Uuid;

use crate::db::{self, models::ContactMessage};
use crate::rate_limit::SubmissionLimiter;
use crate::routes::{client_ip, require_session, ErrorResponse, SuccessResponse};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// Client-generated opaque device identifier, best-effort.
    pub visitor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub is_read: bool,
}

const MESSAGE_COLUMNS: &str = "id, name, email, message, is_read, ip, visitor_id, created_at";

fn parse_message_id(id: &str) -> Result<Uuid, (StatusCode, Json<ErrorResponse>)> {
    Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Message not found")),
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/messages - Submit a contact message (public, rate-limited)
pub async fn submit_message(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<SubmitMessageRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Name is required")),
        )
            .into_response();
    }
    if payload.email.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Email is required")),
        )
            .into_response();
    }
    if payload.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Message is required")),
        )
            .into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Database not available")),
            )
                .into_response();
        }
    };

    let ip = client_ip(&headers, &addr);
    let visitor_id = payload
        .visitor_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    // One accepted submission per hour per address or device id. The inbox
    // itself is the limiter's state: the row inserted below is what the next
    // check matches against.
    match SubmissionLimiter::hourly()
        .is_blocked(pool.as_ref(), Some(ip.as_str()), visitor_id)
        .await
    {
        Ok(false) => {}
        Ok(true) => {
            tracing::warn!(ip = %ip, "Contact submission rate-limited");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse::new(
                    "Too many requests. Please try again later.",
                )),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Database error checking submission rate: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to send message")),
            )
                .into_response();
        }
    }

    match sqlx::query(
        r#"
        INSERT INTO messages (name, email, message, ip, visitor_id, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.email.trim())
    .bind(payload.message.trim())
    .bind(&ip)
    .bind(visitor_id)
    .execute(pool.as_ref())
    .await
    {
        Ok(_) => {
            tracing::info!("Contact message received");
            (StatusCode::CREATED, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => {
            tracing::error!("Database error saving message: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to send message")),
            )
                .into_response()
        }
    }
}

/// GET /api/messages - List all messages, newest first (auth required)
pub async fn list_messages(headers: HeaderMap) -> impl IntoResponse {
    if let Err(err_response) = require_session(&headers) {
        return err_response.into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Database not available")),
            )
                .into_response();
        }
    };

    match sqlx::query_as::<_, ContactMessage>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at DESC"
    ))
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing messages: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to list messages")),
            )
                .into_response()
        }
    }
}

/// PATCH /api/messages/{id}/read - Set the read flag (auth required)
pub async fn mark_message_read(
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<MarkReadRequest>,
) -> impl IntoResponse {
    if let Err(err_response) = require_session(&headers) {
        return err_response.into_response();
    }

    let id = match parse_message_id(&id) {
        Ok(id) => id,
        Err(err_response) => return err_response.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Database not available")),
            )
                .into_response();
        }
    };

    match sqlx::query_as::<_, ContactMessage>(&format!(
        "UPDATE messages SET is_read = $1 WHERE id = $2 RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(payload.is_read)
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(message)) => (StatusCode::OK, Json(message)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Message not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Database error updating message: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to update message")),
            )
                .into_response()
        }
    }
}

/// DELETE /api/messages/{id} - Delete a message (auth required)
pub async fn delete_message(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    if let Err(err_response) = require_session(&headers) {
        return err_response.into_response();
    }

    let id = match parse_message_id(&id) {
        Ok(id) => id,
        Err(err_response) => return err_response.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Database not available")),
            )
                .into_response();
        }
    };

    match sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await
    {
        Ok(result) => {
            if result.rows_affected() == 0 {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new("Message not found")),
                )
                    .into_response();
            }
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => {
            tracing::error!("Database error deleting message: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to delete message")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::Request;
    use axum::routing::{get, patch};
    use axum::Router;
    use tower::ServiceExt;

    fn messages_router() -> Router {
        Router::new()
            .route("/api/messages", get(list_messages).post(submit_message))
            .route("/api/messages/{id}/read", patch(mark_message_read))
            .route("/api/messages/{id}", axum::routing::delete(delete_message))
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 12345))))
    }

    fn bearer() -> String {
        format!("Bearer {}", crate::token::issue().unwrap())
    }

    async fn submit(body: &str) -> StatusCode {
        let req = Request::post("/api/messages")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = messages_router().oneshot(req).await.unwrap();
        res.status()
    }

    #[tokio::test]
    async fn test_submit_missing_name_returns_bad_request() {
        let status = submit(r#"{"email":"a@x.com","message":"hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_missing_email_returns_bad_request() {
        let status = submit(r#"{"name":"A","message":"hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_missing_message_returns_bad_request() {
        let status = submit(r#"{"name":"A","email":"a@x.com"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_blank_fields_return_bad_request() {
        let status = submit(r#"{"name":"  ","email":"a@x.com","message":"hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_valid_without_db_returns_unavailable() {
        let status = submit(r#"{"name":"A","email":"a@x.com","message":"hi"}"#).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_list_messages_without_token_returns_unauthorized() {
        let req = Request::get("/api/messages").body(Body::empty()).unwrap();
        let res = messages_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_mark_read_without_token_returns_unauthorized() {
        let req = Request::patch(format!("/api/messages/{}/read", Uuid::new_v4()))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"isRead":true}"#))
            .unwrap();
        let res = messages_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_bad_id_returns_not_found() {
        let req = Request::delete("/api/messages/not-a-uuid")
            .header("authorization", bearer())
            .body(Body::empty())
            .unwrap();
        let res = messages_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
