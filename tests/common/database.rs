use reva::{config::StorageBackend, load_config, RecordStore};

/// Opens the PostgreSQL record store described by the environment.
///
/// Runs only when `REVA__STORAGE__BACKEND=postgres` is set (with the
/// `REVA__STORAGE__DATABASE__*` connection settings). Otherwise returns `None`
/// and the calling test skips itself.
pub async fn postgres_store() -> Option<RecordStore> {
    let config = load_config().expect("Failed to load config");
    if config.storage.backend != StorageBackend::Postgres {
        eprintln!("skipping: REVA__STORAGE__BACKEND is not postgres");
        return None;
    }

    let store = RecordStore::open(&config.storage)
        .await
        .expect("Failed to connect to database");
    Some(store)
}
