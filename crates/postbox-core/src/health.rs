use axum::{Router, http::StatusCode, routing::get};

/// Handler for `GET /healthz`: liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`. Services holding only in-memory state are ready
/// as soon as they accept connections.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

/// Liveness and readiness routes, mergeable into any service router.
pub fn health_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
