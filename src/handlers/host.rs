//! Host dashboard endpoints
//!
//! Mounted behind session authentication and the host role guard. Owners act
//! on their own listings; administrators pass every ownership check.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    models::{
        bookings::{Booking, OwnerEarnings},
        chalets::{Chalet, ChaletDraft, ChaletFilter, SetChaletLive, UpdateServiceStatus},
        users::UserRole,
    },
    services::{bookings, chalets},
    state::AppState,
};

async fn managed_chalet(state: &AppState, user: &AuthenticatedUser, id: &str) -> Result<Chalet> {
    let chalet = chalets::get_chalet(&state.store, id).await?;
    chalets::ensure_can_manage(&chalet, &user.id, user.role)?;
    Ok(chalet)
}

/// GET /api/v1/host/chalets
pub async fn list_host_chalets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Chalet>>> {
    let filter = ChaletFilter {
        owner_id: Some(user.id),
        ..ChaletFilter::default()
    };
    Ok(Json(chalets::find_chalets(&state.store, &filter).await?))
}

/// POST /api/v1/host/chalets
///
/// New listings belong to the caller and start `PENDING` until an
/// administrator approves them.
pub async fn create_host_chalet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(draft): Json<ChaletDraft>,
) -> Result<(StatusCode, Json<Chalet>)> {
    let draft = ChaletDraft {
        id: None,
        owner_id: Some(user.id),
        status: None,
        ..draft
    };

    let chalet = chalets::save_chalet(&state.store, draft).await?;
    Ok((StatusCode::CREATED, Json(chalet)))
}

/// PUT /api/v1/host/chalets/{id}
///
/// Partial update. Ownership never changes here and only administrators
/// may change the approval status.
pub async fn update_host_chalet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(draft): Json<ChaletDraft>,
) -> Result<Json<Chalet>> {
    managed_chalet(&state, &user, &id).await?;

    let status = if user.role == UserRole::Admin { draft.status } else { None };
    let draft = ChaletDraft {
        id: Some(id),
        owner_id: None,
        status,
        ..draft
    };

    Ok(Json(chalets::save_chalet(&state.store, draft).await?))
}

/// DELETE /api/v1/host/chalets/{id}
///
/// Idempotent like the admin route: a chalet that is already gone answers 204.
/// Its bookings are kept as history.
pub async fn delete_host_chalet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    match managed_chalet(&state, &user, &id).await {
        Ok(_) => {}
        Err(Error::NotFound(_)) => return Ok(StatusCode::NO_CONTENT),
        Err(e) => return Err(e),
    }
    chalets::delete_chalet(&state.store, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/host/chalets/{id}/service-status
pub async fn update_host_service_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateServiceStatus>,
) -> Result<Json<Chalet>> {
    managed_chalet(&state, &user, &id).await?;
    Ok(Json(
        chalets::update_service_status(&state.store, &id, request.service_status).await?,
    ))
}

/// PUT /api/v1/host/chalets/{id}/live
pub async fn set_host_chalet_live(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<SetChaletLive>,
) -> Result<Json<Chalet>> {
    managed_chalet(&state, &user, &id).await?;
    Ok(Json(chalets::set_chalet_live(&state.store, &id, request.is_live).await?))
}

/// GET /api/v1/host/bookings
///
/// Bookings across every chalet the caller owns.
pub async fn list_host_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Booking>>> {
    Ok(Json(bookings::list_bookings_for_owner(&state.store, &user.id).await?))
}

/// POST /api/v1/host/bookings/{id}/confirm
pub async fn confirm_host_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    let booking = bookings::get_booking(&state.store, &id).await?;
    managed_chalet(&state, &user, &booking.chalet_id).await?;
    Ok(Json(bookings::confirm_booking(&state.store, &id).await?))
}

/// GET /api/v1/host/earnings
pub async fn host_earnings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<OwnerEarnings>> {
    Ok(Json(bookings::owner_earnings(&state.store, &user.id).await?))
}
