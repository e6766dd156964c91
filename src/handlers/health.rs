//! Health check handlers
//!
//! Public liveness probe plus an administrator view of store and session
//! volumes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    error::Result,
    models::{bookings::Booking, chalets::Chalet, users::User},
    state::AppState,
};

/// Public health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Status indicator (always "ok")
    pub status: String,
    pub version: String,
}

/// Public health check handler
///
/// # Example
/// ```bash
/// curl http://localhost:3000/api/v1/health
/// # Returns: {"status":"ok","version":"0.1.0"}
/// ```
pub async fn health_check(State(_state): State<AppState>) -> Json<HealthCheckResponse> {
    tracing::debug!("Health check requested");
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Record counts per collection and live in-memory entries.
#[derive(Debug, Serialize)]
pub struct StoreHealthResponse {
    pub backend: String,
    pub users: usize,
    pub chalets: usize,
    pub bookings: usize,
    pub active_sessions: usize,
    pub pending_signups: usize,
}

/// GET /api/v1/admin/health
///
/// Fails with 503 when the record store cannot be reached, which makes it a
/// usable readiness probe.
pub async fn store_health(State(state): State<AppState>) -> Result<Json<StoreHealthResponse>> {
    let users = state.store.count::<User>().await?;
    let chalets = state.store.count::<Chalet>().await?;
    let bookings = state.store.count::<Booking>().await?;

    Ok(Json(StoreHealthResponse {
        backend: state.config.storage.backend.to_string(),
        users,
        chalets,
        bookings,
        active_sessions: state.sessions.len().await?,
        pending_signups: state.pending_signups.len().await?,
    }))
}
