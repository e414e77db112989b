/**
 * Analytics Routes
 * Fire-and-forget visit beacons plus the admin dashboard rollup
 */
use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::analytics::{self, ChartSeries, DayCounters, WeekComparison};
use crate::db::{self, models::DailyAnalytics};
use crate::routes::{require_session, ErrorResponse, SuccessResponse};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub totals: StatsTotals,
    pub changes: WeekComparison,
    pub chart: ChartSeries,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsTotals {
    pub page_views: i64,
    pub project_clicks: i64,
    pub unread_messages: i64,
    pub total_messages: i64,
    pub total_projects: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/analytics/pageview - Count a page view (public)
pub async fn record_pageview() -> impl IntoResponse {
    record_beacon(
        r#"
        INSERT INTO daily_analytics (date, page_views)
        VALUES ($1, 1)
        ON CONFLICT (date) DO UPDATE SET
            page_views = daily_analytics.page_views + 1
        "#,
        "pageview",
    )
    .await
}

/// POST /api/analytics/project-click - Count a project-link click (public)
pub async fn record_project_click() -> impl IntoResponse {
    record_beacon(
        r#"
        INSERT INTO daily_analytics (date, project_clicks)
        VALUES ($1, 1)
        ON CONFLICT (date) DO UPDATE SET
            project_clicks = daily_analytics.project_clicks + 1
        "#,
        "project-click",
    )
    .await
}

/// Run one upsert-increment against today's row. Telemetry is best-effort:
/// whatever goes wrong, the visitor still gets a success response.
async fn record_beacon(sql: &str, beacon: &str) -> (StatusCode, Json<SuccessResponse>) {
    if let Some(pool) = db::get_pool() {
        let today = Utc::now().date_naive();
        if let Err(e) = sqlx::query(sql).bind(today).execute(pool.as_ref()).await {
            tracing::error!(beacon = %beacon, "Failed to record beacon: {}", e);
        }
    }

    (StatusCode::OK, Json(SuccessResponse { success: true }))
}

/// GET /api/analytics/stats - Dashboard summary (auth required)
pub async fn get_stats(headers: HeaderMap) -> impl IntoResponse {
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

    let today = Utc::now().date_naive();
    let thirty_days_ago = today - chrono::Duration::days(30);

    let rows = match sqlx::query_as::<_, DailyAnalytics>(
        r#"
        SELECT date, page_views, project_clicks, unique_visitors
        FROM daily_analytics
        WHERE date >= $1
        ORDER BY date ASC
        "#,
    )
    .bind(thirty_days_ago)
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Database error fetching analytics: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to load statistics")),
            )
                .into_response();
        }
    };

    let days: Vec<DayCounters> = rows
        .into_iter()
        .map(|r| DayCounters {
            date: r.date,
            page_views: r.page_views,
            project_clicks: r.project_clicks,
            unique_visitors: r.unique_visitors,
        })
        .collect();

    // Message and project counts are read fresh, never cached in the
    // daily rows.
    let counts = async {
        let (unread,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE is_read = false")
                .fetch_one(pool.as_ref())
                .await?;
        let (total_messages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(pool.as_ref())
            .await?;
        let (total_projects,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(pool.as_ref())
            .await?;
        Ok::<_, sqlx::Error>((unread, total_messages, total_projects))
    };

    let (unread_messages, total_messages, total_projects) = match counts.await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!("Database error fetching counts: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to load statistics")),
            )
                .into_response();
        }
    };

    let totals = analytics::totals(&days);

    let response = StatsResponse {
        totals: StatsTotals {
            page_views: totals.page_views,
            project_clicks: totals.project_clicks,
            unread_messages,
            total_messages,
            total_projects,
        },
        changes: analytics::week_over_week(&days, today),
        chart: analytics::chart_series(&days, today),
    };

    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;

    fn analytics_router() -> Router {
        Router::new()
            .route("/api/analytics/pageview", post(record_pageview))
            .route("/api/analytics/project-click", post(record_project_click))
            .route("/api/analytics/stats", get(get_stats))
    }

    #[tokio::test]
    async fn test_pageview_beacon_succeeds_even_without_db() {
        let req = Request::post("/api/analytics/pageview")
            .body(Body::empty())
            .unwrap();
        let res = analytics_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: SuccessResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.success);
    }

    #[tokio::test]
    async fn test_project_click_beacon_succeeds_even_without_db() {
        let req = Request::post("/api/analytics/project-click")
            .body(Body::empty())
            .unwrap();
        let res = analytics_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_without_token_returns_unauthorized() {
        let req = Request::get("/api/analytics/stats")
            .body(Body::empty())
            .unwrap();
        let res = analytics_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_stats_with_token_but_no_db_returns_unavailable() {
        let token = crate::token::issue().unwrap();
        let req = Request::get("/api/analytics/stats")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let res = analytics_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
