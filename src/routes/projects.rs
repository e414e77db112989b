/**
 * Project Routes
 * Public project gallery listing, admin-only create/update/delete
 */
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{self, models::Project};
use crate::routes::{require_session, ErrorResponse, SuccessResponse};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub link: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub link: Option<String>,
    pub image: Option<String>,
}

const PROJECT_COLUMNS: &str = "id, title, description, tags, link, image, created_at";

/// Route parameter ids are opaque strings; anything that is not a UUID
/// cannot name a stored project, so it reads as not-found.
fn parse_project_id(id: &str) -> Result<Uuid, (StatusCode, Json<ErrorResponse>)> {
    Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Project not found")),
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/projects - List all projects, newest first (public)
pub async fn list_projects() -> impl IntoResponse {
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

    match sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
    ))
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing projects: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to list projects")),
            )
                .into_response()
        }
    }
}

/// POST /api/projects - Create a project (auth required)
pub async fn create_project(
    headers: HeaderMap,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    if let Err(err_response) = require_session(&headers) {
        return err_response.into_response();
    }

    if payload.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Title is required")),
        )
            .into_response();
    }

    if payload.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Description is required")),
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

    match sqlx::query_as::<_, Project>(&format!(
        r#"
        INSERT INTO projects (title, description, tags, link, image, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.tags)
    .bind(payload.link.as_deref().unwrap_or("#"))
    .bind(payload.image.as_deref().unwrap_or(""))
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(project) => {
            tracing::info!(project_id = %project.id, "Project created");
            (StatusCode::CREATED, Json(project)).into_response()
        }
        Err(e) => {
            tracing::error!("Database error creating project: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to create project")),
            )
                .into_response()
        }
    }
}

/// PUT /api/projects/{id} - Update a project (auth required)
pub async fn update_project(
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    if let Err(err_response) = require_session(&headers) {
        return err_response.into_response();
    }

    let id = match parse_project_id(&id) {
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

    let existing = match sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Project not found")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching project: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Database error")),
            )
                .into_response();
        }
    };

    let title = payload.title.unwrap_or(existing.title);
    let description = payload.description.unwrap_or(existing.description);
    let tags = payload.tags.unwrap_or(existing.tags);
    let link = payload.link.unwrap_or(existing.link);
    let image = payload.image.unwrap_or(existing.image);

    if title.trim().is_empty() || description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Title and description are required")),
        )
            .into_response();
    }

    match sqlx::query_as::<_, Project>(&format!(
        r#"
        UPDATE projects
        SET title = $1, description = $2, tags = $3, link = $4, image = $5
        WHERE id = $6
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&title)
    .bind(&description)
    .bind(&tags)
    .bind(&link)
    .bind(&image)
    .bind(id)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(e) => {
            tracing::error!("Database error updating project: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to update project")),
            )
                .into_response()
        }
    }
}

/// DELETE /api/projects/{id} - Delete a project (auth required)
pub async fn delete_project(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    if let Err(err_response) = require_session(&headers) {
        return err_response.into_response();
    }

    let id = match parse_project_id(&id) {
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

    match sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await
    {
        Ok(result) => {
            if result.rows_affected() == 0 {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new("Project not found")),
                )
                    .into_response();
            }
            tracing::info!(project_id = %id, "Project deleted");
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => {
            tracing::error!("Database error deleting project: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to delete project")),
            )
                .into_response()
        }
    }
}
