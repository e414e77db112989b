/**
 * Site Config Routes
 * Public read of the singleton site configuration, admin-only replace
 */
use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::db::{self, models::{SiteContent, SITE_CONFIG_KEY}};
use crate::routes::{require_session, ErrorResponse};

/// GET /api/config
/// Returns the site configuration, creating the defaults on first read
pub async fn get_config() -> impl IntoResponse {
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

    // Insert-if-absent then read back. The ON CONFLICT makes the lazy
    // creation safe against two first-readers racing: exactly one row ever
    // exists under the fixed key.
    let defaults = match serde_json::to_value(SiteContent::default()) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to serialize default site config: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Server error")),
            )
                .into_response();
        }
    };

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO site_config (key, content, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (key) DO NOTHING
        "#,
    )
    .bind(SITE_CONFIG_KEY)
    .bind(&defaults)
    .execute(pool.as_ref())
    .await
    {
        tracing::error!("Failed to seed default site config: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to load site config")),
        )
            .into_response();
    }

    match sqlx::query_as::<_, (Value,)>("SELECT content FROM site_config WHERE key = $1")
        .bind(SITE_CONFIG_KEY)
        .fetch_one(pool.as_ref())
        .await
    {
        Ok((content,)) => (StatusCode::OK, Json(content)).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch site config: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to load site config")),
            )
                .into_response()
        }
    }
}

/// PUT /api/config
/// Replace the whole site configuration (auth required)
pub async fn update_config(headers: HeaderMap, Json(payload): Json<Value>) -> impl IntoResponse {
    if let Err(err_response) = require_session(&headers) {
        return err_response.into_response();
    }

    // Wholesale replace: the body must be a complete document, not a patch.
    let content: SiteContent = match serde_json::from_value(payload) {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid site configuration".to_string(),
                    message: Some(e.to_string()),
                }),
            )
                .into_response();
        }
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

    let content_json = match serde_json::to_value(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to serialize site config: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Server error")),
            )
                .into_response();
        }
    };

    match sqlx::query_as::<_, (Value,)>(
        r#"
        INSERT INTO site_config (key, content, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (key) DO UPDATE SET
            content = EXCLUDED.content,
            updated_at = now()
        RETURNING content
        "#,
    )
    .bind(SITE_CONFIG_KEY)
    .bind(&content_json)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok((stored,)) => {
            tracing::info!("Site config replaced");
            (StatusCode::OK, Json(stored)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to update site config: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to update site config")),
            )
                .into_response()
        }
    }
}
