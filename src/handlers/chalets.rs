//! Public catalog endpoints. No authentication required.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::Result,
    models::{
        bookings::{StayQuery, StayQuote},
        chalets::{Chalet, ChaletFilter, ChaletStatus},
    },
    services::{bookings, chalets},
    state::AppState,
};

/// GET /api/v1/chalets
///
/// Approved, live chalets. Optional `location` and `service_status` query
/// parameters narrow the list; status and visibility cannot be overridden.
///
/// # Example
/// ```bash
/// curl "http://localhost:3000/api/v1/chalets?location=Cedars"
/// ```
pub async fn list_public_chalets(
    State(state): State<AppState>,
    Query(filter): Query<ChaletFilter>,
) -> Result<Json<Vec<Chalet>>> {
    let filter = ChaletFilter {
        status: Some(ChaletStatus::Approved),
        is_live: Some(true),
        ..filter
    };
    Ok(Json(chalets::find_chalets(&state.store, &filter).await?))
}

/// GET /api/v1/chalets/{id}
///
/// Pending or unlisted chalets answer 404.
pub async fn get_public_chalet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Chalet>> {
    Ok(Json(chalets::get_public_chalet(&state.store, &id).await?))
}

/// GET /api/v1/chalets/{id}/quote?check_in=YYYY-MM-DD&check_out=YYYY-MM-DD
///
/// Price for a stay plus whether the dates are still free.
pub async fn quote_chalet_stay(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(stay): Query<StayQuery>,
) -> Result<Json<serde_json::Value>> {
    let chalet = chalets::get_public_chalet(&state.store, &id).await?;
    let quote: StayQuote = bookings::quote_stay(&chalet, stay.check_in, stay.check_out)?;
    let available = bookings::is_available(&state.store, &chalet.id, stay.check_in, stay.check_out).await?;

    Ok(Json(serde_json::json!({
        "quote": quote,
        "available": available,
    })))
}
