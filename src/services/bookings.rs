//! Reservation flow.
//!
//! A booking is written only if no pending or confirmed booking of the same
//! chalet overlaps its `[check_in, check_out)` range; the check and the write
//! are one store operation.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    config::BookingConfig,
    database::RecordStore,
    error::{Error, Result},
    models::{
        bookings::{Booking, BookingStatus, NewBooking, OwnerEarnings, PaymentStatus, StayQuote},
        chalets::{Chalet, ChaletFilter},
    },
    queries::{bookings, chalets},
    validation::{validate_date_order, validate_price, validate_required_string},
};

/// Platform commission and owner payout for a total price.
/// The two parts always add back up to `total_price`.
pub fn split_commission(total_price: f64, commission_rate: f64) -> (f64, f64) {
    let commission_fee = total_price * commission_rate;
    (commission_fee, total_price - commission_fee)
}

/// Nights times nightly price for a stay at `chalet`.
pub fn quote_stay(chalet: &Chalet, check_in: NaiveDate, check_out: NaiveDate) -> Result<StayQuote> {
    validate_date_order(check_in, check_out)?;
    let nights = (check_out - check_in).num_days();
    Ok(StayQuote {
        chalet_id: chalet.id.clone(),
        nights,
        price_per_night: chalet.price_per_night,
        total_price: chalet.price_per_night * nights as f64,
    })
}

/// Creates a `PENDING` booking with its commission split.
///
/// The chalet must exist and be free for the range. Whether check-in lies in
/// the past is the caller's concern (see `validation::validate_stay`).
pub async fn create_booking(
    store: &RecordStore,
    config: &BookingConfig,
    request: NewBooking,
) -> Result<Booking> {
    config.validate()?;
    validate_date_order(request.check_in, request.check_out)?;
    validate_price(request.total_price, "total_price")?;
    let guest_name = validate_required_string(&request.guest_name, "guest_name")?;

    chalets::get_chalet_by_id_required(store, &request.chalet_id).await?;

    let (commission_fee, net_payout) = split_commission(request.total_price, config.commission_rate);
    let booking = Booking {
        id: Uuid::now_v7().to_string(),
        chalet_id: request.chalet_id,
        user_id: request.user_id,
        guest_name,
        check_in: request.check_in,
        check_out: request.check_out,
        total_price: request.total_price,
        commission_fee,
        net_payout,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Pending,
        created_at: Utc::now(),
    };

    if let Some(existing) = bookings::insert_booking_if_available(store, &booking).await? {
        tracing::info!(
            chalet_id = %booking.chalet_id,
            check_in = %booking.check_in,
            check_out = %booking.check_out,
            blocking_booking = %existing.id,
            "Booking rejected: dates unavailable"
        );
        return Err(Error::Conflict(format!(
            "Chalet is already booked between {} and {}",
            existing.check_in, existing.check_out
        )));
    }

    tracing::info!(
        booking_id = %booking.id,
        chalet_id = %booking.chalet_id,
        nights = booking.nights(),
        total_price = booking.total_price,
        "Booking created"
    );
    Ok(booking)
}

/// Whether the chalet has no active booking overlapping the range.
pub async fn is_available(
    store: &RecordStore,
    chalet_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<bool> {
    validate_date_order(check_in, check_out)?;
    Ok(bookings::find_overlapping_bookings(store, chalet_id, check_in, check_out)
        .await?
        .is_empty())
}

pub async fn get_booking(store: &RecordStore, id: &str) -> Result<Booking> {
    bookings::get_booking_by_id_required(store, id).await
}

/// `PENDING -> CONFIRMED`.
///
/// Every transition checks the current status and writes in one store step,
/// so a booking cancelled in the meantime is never revived.
pub async fn confirm_booking(store: &RecordStore, id: &str) -> Result<Booking> {
    let booking = bookings::update_booking(store, id, |booking| {
        if booking.status != BookingStatus::Pending {
            return Err(Error::validation(
                "status",
                format!("Only pending bookings can be confirmed (booking is {})", booking.status),
            ));
        }
        booking.status = BookingStatus::Confirmed;
        Ok(())
    })
    .await?;

    tracing::info!(booking_id = id, "Booking confirmed");
    Ok(booking)
}

/// `PENDING | CONFIRMED -> CANCELLED`; a paid booking is marked refunded.
pub async fn cancel_booking(store: &RecordStore, id: &str) -> Result<Booking> {
    let booking = bookings::update_booking(store, id, |booking| {
        if booking.status == BookingStatus::Cancelled {
            return Err(Error::validation("status", "Booking is already cancelled"));
        }
        booking.status = BookingStatus::Cancelled;
        if booking.payment_status == PaymentStatus::Paid {
            booking.payment_status = PaymentStatus::Refunded;
        }
        Ok(())
    })
    .await?;

    tracing::info!(booking_id = id, payment_status = %booking.payment_status, "Booking cancelled");
    Ok(booking)
}

/// Payment `PENDING -> PAID` for a booking that is not cancelled.
pub async fn mark_booking_paid(store: &RecordStore, id: &str) -> Result<Booking> {
    bookings::update_booking(store, id, |booking| {
        if booking.status == BookingStatus::Cancelled {
            return Err(Error::validation("status", "Cancelled bookings cannot be paid"));
        }
        if booking.payment_status != PaymentStatus::Pending {
            return Err(Error::validation(
                "payment_status",
                format!("Payment is already {}", booking.payment_status),
            ));
        }
        booking.payment_status = PaymentStatus::Paid;
        Ok(())
    })
    .await
}

pub async fn list_bookings(store: &RecordStore) -> Result<Vec<Booking>> {
    bookings::list_bookings(store).await
}

pub async fn list_bookings_for_user(store: &RecordStore, user_id: &str) -> Result<Vec<Booking>> {
    bookings::list_bookings_by_user(store, user_id).await
}

pub async fn list_bookings_for_chalet(store: &RecordStore, chalet_id: &str) -> Result<Vec<Booking>> {
    bookings::list_bookings_by_chalet(store, chalet_id).await
}

/// Bookings across every chalet the owner manages.
pub async fn list_bookings_for_owner(store: &RecordStore, owner_id: &str) -> Result<Vec<Booking>> {
    let filter = ChaletFilter {
        owner_id: Some(owner_id.to_string()),
        ..ChaletFilter::default()
    };
    let chalet_ids: Vec<String> = chalets::find_chalets(store, &filter)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    bookings::list_bookings_by_chalets(store, &chalet_ids).await
}

/// Totals over the owner's confirmed bookings.
pub async fn owner_earnings(store: &RecordStore, owner_id: &str) -> Result<OwnerEarnings> {
    let confirmed = list_bookings_for_owner(store, owner_id)
        .await?
        .into_iter()
        .filter(|b| b.status == BookingStatus::Confirmed);

    let mut earnings = OwnerEarnings {
        owner_id: owner_id.to_string(),
        ..OwnerEarnings::default()
    };
    for booking in confirmed {
        earnings.confirmed_bookings += 1;
        earnings.gross += booking.total_price;
        earnings.commission += booking.commission_fee;
        earnings.net_payout += booking.net_payout;
    }

    Ok(earnings)
}
