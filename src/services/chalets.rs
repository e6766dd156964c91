use chrono::Utc;
use uuid::Uuid;

use crate::{
    database::RecordStore,
    error::{Error, Result},
    models::{
        chalets::{Chalet, ChaletDraft, ChaletFilter, ChaletStatus, ServiceStatus},
        users::UserRole,
    },
    queries::chalets,
    validation::{validate_price, validate_required_string},
};

/// Public catalog when `only_approved`, everything otherwise.
pub async fn list_chalets(store: &RecordStore, only_approved: bool) -> Result<Vec<Chalet>> {
    if only_approved {
        chalets::list_public_chalets(store).await
    } else {
        chalets::list_chalets(store).await
    }
}

/// Exact-match conjunction over the supplied filter fields, insertion order.
pub async fn find_chalets(store: &RecordStore, filter: &ChaletFilter) -> Result<Vec<Chalet>> {
    chalets::find_chalets(store, filter).await
}

pub async fn get_chalet(store: &RecordStore, id: &str) -> Result<Chalet> {
    chalets::get_chalet_by_id_required(store, id).await
}

/// A chalet as a guest may see it; hidden listings read as missing.
pub async fn get_public_chalet(store: &RecordStore, id: &str) -> Result<Chalet> {
    match chalets::get_chalet_by_id(store, id).await? {
        Some(chalet) if chalet.is_public() => Ok(chalet),
        _ => Err(Error::NotFound(format!("Chalet with ID {} not found", id))),
    }
}

fn apply_draft(chalet: &mut Chalet, draft: ChaletDraft) -> Result<()> {
    if let Some(owner_id) = draft.owner_id {
        chalet.owner_id = validate_required_string(&owner_id, "owner_id")?;
    }
    if let Some(name) = draft.name {
        chalet.name = validate_required_string(&name, "name")?;
    }
    if let Some(description) = draft.description {
        chalet.description = description.trim().to_string();
    }
    if let Some(location) = draft.location {
        chalet.location = location.trim().to_string();
    }
    if let Some(price) = draft.price_per_night {
        validate_price(price, "price_per_night")?;
        chalet.price_per_night = price;
    }
    if let Some(bedrooms) = draft.bedrooms {
        chalet.bedrooms = bedrooms;
    }
    if let Some(bathrooms) = draft.bathrooms {
        chalet.bathrooms = bathrooms;
    }
    if let Some(max_guests) = draft.max_guests {
        if max_guests == 0 {
            return Err(Error::validation("max_guests", "A chalet must host at least one guest"));
        }
        chalet.max_guests = max_guests;
    }
    if let Some(amenities) = draft.amenities {
        chalet.amenities = amenities;
    }
    if let Some(images) = draft.images {
        chalet.images = images;
    }
    if let Some(is_live) = draft.is_live {
        chalet.is_live = is_live;
    }
    if let Some(status) = draft.status {
        chalet.status = status;
    }
    if let Some(service_status) = draft.service_status {
        chalet.service_status = service_status;
    }
    Ok(())
}

/// Upsert from a partial chalet.
///
/// An id that names an existing chalet merges the supplied fields into it.
/// Otherwise a new chalet is created (with a generated id when none is given)
/// and defaults to `PENDING`, `READY` and live. New chalets need an owner, a
/// name and a nightly price.
pub async fn save_chalet(store: &RecordStore, draft: ChaletDraft) -> Result<Chalet> {
    let existing = match draft.id.as_deref() {
        Some(id) => chalets::get_chalet_by_id(store, id).await?,
        None => None,
    };

    let chalet = match existing {
        Some(mut chalet) => {
            apply_draft(&mut chalet, draft)?;
            chalet.updated_at = Utc::now();
            chalet
        }
        None => {
            let owner_id = draft
                .owner_id
                .clone()
                .ok_or_else(|| Error::validation("owner_id", "owner_id is required"))?;
            if draft.name.is_none() {
                return Err(Error::validation("name", "name is required"));
            }
            if draft.price_per_night.is_none() {
                return Err(Error::validation("price_per_night", "price_per_night is required"));
            }

            let now = Utc::now();
            let mut chalet = Chalet {
                id: draft.id.clone().unwrap_or_else(|| Uuid::now_v7().to_string()),
                owner_id,
                name: String::new(),
                description: String::new(),
                location: String::new(),
                price_per_night: 0.0,
                bedrooms: 1,
                bathrooms: 1,
                max_guests: 1,
                amenities: Vec::new(),
                images: Vec::new(),
                is_live: true,
                status: ChaletStatus::Pending,
                service_status: ServiceStatus::Ready,
                created_at: now,
                updated_at: now,
            };
            apply_draft(&mut chalet, draft)?;
            chalet
        }
    };

    chalets::save_chalet(store, &chalet).await?;
    tracing::info!(chalet_id = %chalet.id, status = %chalet.status, "Chalet saved");
    Ok(chalet)
}

async fn mutate<F>(store: &RecordStore, id: &str, change: F) -> Result<Chalet>
where
    F: FnOnce(&mut Chalet),
{
    let mut chalet = chalets::get_chalet_by_id_required(store, id).await?;
    change(&mut chalet);
    chalet.updated_at = Utc::now();
    chalets::save_chalet(store, &chalet).await?;
    Ok(chalet)
}

pub async fn set_chalet_approval(store: &RecordStore, id: &str, status: ChaletStatus) -> Result<Chalet> {
    let chalet = mutate(store, id, |c| c.status = status).await?;
    tracing::info!(chalet_id = id, status = %status, "Chalet approval changed");
    Ok(chalet)
}

pub async fn set_chalet_live(store: &RecordStore, id: &str, is_live: bool) -> Result<Chalet> {
    mutate(store, id, |c| c.is_live = is_live).await
}

pub async fn update_service_status(
    store: &RecordStore,
    id: &str,
    service_status: ServiceStatus,
) -> Result<Chalet> {
    mutate(store, id, |c| c.service_status = service_status).await
}

/// Removes a chalet. Deleting an absent chalet is not an error.
pub async fn delete_chalet(store: &RecordStore, id: &str) -> Result<bool> {
    let removed = chalets::delete_chalet(store, id).await?;
    if removed {
        tracing::info!(chalet_id = id, "Chalet deleted");
    }
    Ok(removed)
}

/// Owners manage their own listings; administrators manage every listing.
pub fn ensure_can_manage(chalet: &Chalet, user_id: &str, role: UserRole) -> Result<()> {
    if role == UserRole::Admin || chalet.owner_id == user_id {
        Ok(())
    } else {
        Err(Error::Forbidden("You do not manage this chalet".to_string()))
    }
}
