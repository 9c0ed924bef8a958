//! Health check endpoint for monitoring.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use garage_db::migrations::migration_status;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "serving" or "not_serving"
    pub status: &'static str,
    pub database: bool,
    pub migrations_total: usize,
    pub migrations_applied: usize,
    pub server_time: DateTime<Utc>,
}

/// 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let (migrations_total, migrations_applied) = if database {
        migration_status(state.db.pool()).await.unwrap_or_else(|e| {
            warn!(error = %e, "Migration status unavailable");
            (0, 0)
        })
    } else {
        (0, 0)
    };

    let (code, status) = if database {
        (StatusCode::OK, "serving")
    } else {
        warn!("Database unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, "not_serving")
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            migrations_total,
            migrations_applied,
            server_time: Utc::now(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;

    #[tokio::test]
    async fn test_health_serving() {
        let state = test_state().await;
        let (code, Json(body)) = health(State(state)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "serving");
        assert_eq!(body.migrations_total, body.migrations_applied);
    }

    #[tokio::test]
    async fn test_health_after_close() {
        let state = test_state().await;
        state.db.close().await;
        let (code, Json(body)) = health(State(state)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.database);
    }
}
