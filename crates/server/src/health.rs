use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_db::{ping, DbPool};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Degraded,
}

/// Body of `GET /health`. The catalog store is the only dependency probed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: Readiness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(db_pool)
}

pub async fn health(State(db_pool): State<DbPool>) -> (StatusCode, Json<HealthReport>) {
    let store_error = ping(&db_pool).await.err().map(|error| {
        warn!(
            event_name = "system.health.store_unreachable",
            correlation_id = "health",
            error = %error,
            "catalog store did not answer the health probe"
        );
        error.to_string()
    });

    let (code, status) = match store_error {
        None => (StatusCode::OK, Readiness::Ready),
        Some(_) => (StatusCode::SERVICE_UNAVAILABLE, Readiness::Degraded),
    };

    (code, Json(HealthReport { status, store_error, checked_at: Utc::now() }))
}
