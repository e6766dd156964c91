use crate::{
    database::RecordStore,
    error::{Error, Result},
    models::chalets::{Chalet, ChaletFilter},
};

pub async fn save_chalet(store: &RecordStore, chalet: &Chalet) -> Result<()> {
    store.put(chalet).await
}

/// Gets a single chalet by its ID. The chalet may not exist.
pub async fn get_chalet_by_id(store: &RecordStore, id: &str) -> Result<Option<Chalet>> {
    store.get_by_id(id).await
}

/// Gets a chalet by ID, failing with `NotFound` when absent.
pub async fn get_chalet_by_id_required(store: &RecordStore, id: &str) -> Result<Chalet> {
    get_chalet_by_id(store, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Chalet with ID {} not found", id)))
}

pub async fn list_chalets(store: &RecordStore) -> Result<Vec<Chalet>> {
    store.get_all().await
}

/// Approved and live chalets only.
pub async fn list_public_chalets(store: &RecordStore) -> Result<Vec<Chalet>> {
    store.find::<Chalet, _>(Chalet::is_public).await
}

pub async fn find_chalets(store: &RecordStore, filter: &ChaletFilter) -> Result<Vec<Chalet>> {
    store.find::<Chalet, _>(|c| filter.matches(c)).await
}

/// Deletes a chalet by its ID. Returns whether it existed.
pub async fn delete_chalet(store: &RecordStore, id: &str) -> Result<bool> {
    store.delete::<Chalet>(id).await
}
