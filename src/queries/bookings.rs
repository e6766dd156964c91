use chrono::NaiveDate;

use crate::{
    database::RecordStore,
    error::{Error, Result},
    models::bookings::Booking,
};

/// Applies `apply` to the stored booking in one atomic step, failing with
/// `NotFound` when absent. Nothing is written if `apply` fails.
pub async fn update_booking<F>(store: &RecordStore, id: &str, apply: F) -> Result<Booking>
where
    F: FnOnce(&mut Booking) -> Result<()> + Send,
{
    store
        .update(id, apply)
        .await?
        .map(|(booking, ())| booking)
        .ok_or_else(|| Error::NotFound(format!("Booking with ID {} not found", id)))
}

/// Inserts a booking unless an active booking of the same chalet overlaps its
/// dates. Returns the blocking booking when the insert was refused.
pub async fn insert_booking_if_available(
    store: &RecordStore,
    booking: &Booking,
) -> Result<Option<Booking>> {
    let (chalet_id, check_in, check_out) = (booking.chalet_id.clone(), booking.check_in, booking.check_out);
    store
        .put_unless(booking, move |existing: &Booking| {
            existing.chalet_id == chalet_id
                && existing.status.holds_dates()
                && existing.overlaps(check_in, check_out)
        })
        .await
}

/// Gets a booking by ID, failing with `NotFound` when absent.
pub async fn get_booking_by_id_required(store: &RecordStore, id: &str) -> Result<Booking> {
    store
        .get_by_id::<Booking>(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Booking with ID {} not found", id)))
}

pub async fn list_bookings(store: &RecordStore) -> Result<Vec<Booking>> {
    store.get_all().await
}

pub async fn list_bookings_by_user(store: &RecordStore, user_id: &str) -> Result<Vec<Booking>> {
    store.find::<Booking, _>(|b| b.user_id == user_id).await
}

pub async fn list_bookings_by_chalet(store: &RecordStore, chalet_id: &str) -> Result<Vec<Booking>> {
    store.find::<Booking, _>(|b| b.chalet_id == chalet_id).await
}

/// Bookings belonging to any of the given chalets.
pub async fn list_bookings_by_chalets(store: &RecordStore, chalet_ids: &[String]) -> Result<Vec<Booking>> {
    store
        .find::<Booking, _>(|b| chalet_ids.iter().any(|id| *id == b.chalet_id))
        .await
}

/// Active bookings of a chalet that overlap `[check_in, check_out)`.
pub async fn find_overlapping_bookings(
    store: &RecordStore,
    chalet_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Vec<Booking>> {
    store
        .find::<Booking, _>(|b| {
            b.chalet_id == chalet_id && b.status.holds_dates() && b.overlaps(check_in, check_out)
        })
        .await
}
