use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    models::{
        bookings::{Booking, CreateBookingHttp, NewBooking},
        users::UserRole,
    },
    services::{bookings, chalets},
    state::AppState,
    validation::validate_stay,
};

/// POST /api/v1/bookings
///
/// Reserves a public chalet for the signed-in user. The total is quoted
/// server-side from the nightly price.
///
/// # HTTP Status Codes
/// - `201 CREATED`: Booking created in `PENDING`
/// - `400 BAD_REQUEST`: Past check-in or check-out not after check-in
/// - `404 NOT_FOUND`: Chalet missing or not listed
/// - `409 CONFLICT`: Dates overlap an existing booking
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingHttp>,
) -> Result<(StatusCode, Json<Booking>)> {
    validate_stay(request.check_in, request.check_out, Utc::now().date_naive())?;

    let chalet = chalets::get_public_chalet(&state.store, &request.chalet_id).await?;
    let quote = bookings::quote_stay(&chalet, request.check_in, request.check_out)?;
    let guest_name = request
        .guest_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| user.name.clone());

    let booking = bookings::create_booking(
        &state.store,
        &state.config.booking,
        NewBooking {
            chalet_id: chalet.id,
            user_id: user.id,
            guest_name,
            check_in: request.check_in,
            check_out: request.check_out,
            total_price: quote.total_price,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/v1/bookings
///
/// The signed-in user's own bookings.
pub async fn list_my_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Booking>>> {
    Ok(Json(bookings::list_bookings_for_user(&state.store, &user.id).await?))
}

/// POST /api/v1/bookings/{id}/cancel
///
/// Guests cancel their own bookings; administrators cancel any.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    let booking = bookings::get_booking(&state.store, &id).await?;
    if booking.user_id != user.id && user.role != UserRole::Admin {
        return Err(Error::Forbidden("You can only cancel your own bookings".to_string()));
    }

    Ok(Json(bookings::cancel_booking(&state.store, &id).await?))
}
