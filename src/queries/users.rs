use crate::{
    database::RecordStore,
    error::{Error, Result},
    models::users::{User, UserRole},
    validation::normalize_email,
};

/// Applies `apply` to the stored user in one atomic step; see
/// [`RecordStore::update`]. `None` when the user does not exist.
pub async fn update_user<T, F>(store: &RecordStore, id: &str, apply: F) -> Result<Option<(User, T)>>
where
    T: Send,
    F: FnOnce(&mut User) -> Result<T> + Send,
{
    store.update(id, apply).await
}

/// Gets a single user by their ID. The user may not exist.
pub async fn get_user_by_id(store: &RecordStore, id: &str) -> Result<Option<User>> {
    store.get_by_id(id).await
}

/// Gets a user by ID, failing with `NotFound` when absent.
pub async fn get_user_by_id_required(store: &RecordStore, id: &str) -> Result<User> {
    get_user_by_id(store, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User with ID {} not found", id)))
}

/// Gets a single user by email, compared case-insensitively. The user may not exist.
pub async fn get_user_by_email(store: &RecordStore, email: &str) -> Result<Option<User>> {
    let email = normalize_email(email);
    let mut matches = store
        .find::<User, _>(|u| normalize_email(&u.email) == email)
        .await?;
    Ok(if matches.is_empty() { None } else { Some(matches.swap_remove(0)) })
}

/// Lists all users in insertion order.
pub async fn list_users(store: &RecordStore) -> Result<Vec<User>> {
    store.get_all().await
}

/// Owners still waiting for an administrator.
pub async fn list_pending_owners(store: &RecordStore) -> Result<Vec<User>> {
    store
        .find::<User, _>(|u| u.role == UserRole::Owner && !u.is_approved)
        .await
}
