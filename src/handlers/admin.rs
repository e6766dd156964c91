//! Administration endpoints: account approval, listing moderation and the
//! booking ledger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::Result,
    models::{
        bookings::Booking,
        chalets::{Chalet, SetChaletApproval},
        users::{PublicUser, SetUserApproval, SetUserStatus},
    },
    services::{bookings, chalets, users},
    state::AppState,
};

/// GET /api/v1/admin/users
pub async fn list_all_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>> {
    Ok(Json(users::list_users(&state.store).await?))
}

/// GET /api/v1/admin/users/pending
///
/// Owner accounts still waiting for approval.
pub async fn list_pending_owners(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>> {
    Ok(Json(users::list_pending_owners(&state.store).await?))
}

/// PUT /api/v1/admin/users/{id}/approval
///
/// Revoking approval also signs the user out everywhere.
pub async fn set_user_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetUserApproval>,
) -> Result<Json<PublicUser>> {
    Ok(Json(
        users::set_user_approval(&state.store, &state.sessions, &id, request.is_approved).await?,
    ))
}

/// PUT /api/v1/admin/users/{id}/status
pub async fn set_user_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetUserStatus>,
) -> Result<Json<PublicUser>> {
    Ok(Json(
        users::set_user_status(&state.store, &state.sessions, &id, request.status).await?,
    ))
}

/// GET /api/v1/admin/chalets
///
/// Every chalet regardless of approval or visibility.
pub async fn list_all_chalets(State(state): State<AppState>) -> Result<Json<Vec<Chalet>>> {
    Ok(Json(chalets::list_chalets(&state.store, false).await?))
}

/// PUT /api/v1/admin/chalets/{id}/approval
pub async fn set_chalet_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetChaletApproval>,
) -> Result<Json<Chalet>> {
    Ok(Json(
        chalets::set_chalet_approval(&state.store, &id, request.status).await?,
    ))
}

/// DELETE /api/v1/admin/chalets/{id}
///
/// Idempotent: deleting a missing chalet also answers 204. Bookings of the
/// chalet are kept as history.
pub async fn delete_chalet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    chalets::delete_chalet(&state.store, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/bookings
pub async fn list_all_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>> {
    Ok(Json(bookings::list_bookings(&state.store).await?))
}

/// POST /api/v1/admin/bookings/{id}/paid
///
/// Records payment received outside the platform.
pub async fn mark_booking_paid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    Ok(Json(bookings::mark_booking_paid(&state.store, &id).await?))
}
