//! Record store over named document collections.
//!
//! Every entity lives in one of three independent collections keyed by a
//! string identifier. Records are stored as JSON documents; the typed API
//! (`get_all`, `get_by_id`, `put`, `delete`, `find`) decodes them through the
//! [`Record`] trait. Two backends are available:
//! - `Memory`: insertion-ordered maps behind an async `RwLock`
//! - `Postgres`: one JSONB row per record in a single `records` table
//!
//! There is no cross-collection transaction. Two compound operations check and
//! write inside one collection atomically: [`RecordStore::put_unless`] for
//! guarded inserts and [`RecordStore::update`] for read-modify-write of a
//! single record.

pub mod memory;
pub mod postgres;
pub mod seed;

use serde::{de::DeserializeOwned, Serialize};
use strum_macros::{Display, EnumString};

use crate::{
    config::{StorageBackend, StorageConfig},
    error::Result,
};

pub use memory::MemoryBackend;
pub use postgres::PgBackend;
pub use seed::{seed_if_empty, SeedReport};

/// Named collections known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Users,
    Chalets,
    Bookings,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Chalets, Collection::Bookings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Chalets => "chalets",
            Collection::Bookings => "bookings",
        }
    }
}

/// An entity persisted in one collection under its own identifier.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
}

fn decode<R: Record>(value: serde_json::Value) -> Result<R> {
    Ok(serde_json::from_value(value)?)
}

/// Persistence primitive shared by every service.
///
/// Cloning is cheap: both backends share their underlying storage.
#[derive(Debug, Clone)]
pub enum RecordStore {
    Memory(MemoryBackend),
    Postgres(PgBackend),
}

impl RecordStore {
    /// An empty in-memory store.
    pub fn in_memory() -> Self {
        Self::Memory(MemoryBackend::new())
    }

    /// Open the backend selected in configuration.
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::Memory => Ok(Self::in_memory()),
            StorageBackend::Postgres => Ok(Self::Postgres(PgBackend::connect(&config.database).await?)),
        }
    }

    /// Every record of the collection, in insertion order.
    pub async fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let values = match self {
            Self::Memory(backend) => backend.all(R::COLLECTION).await?,
            Self::Postgres(backend) => backend.all(R::COLLECTION).await?,
        };
        values.into_iter().map(decode).collect()
    }

    pub async fn get_by_id<R: Record>(&self, id: &str) -> Result<Option<R>> {
        let value = match self {
            Self::Memory(backend) => backend.get(R::COLLECTION, id).await?,
            Self::Postgres(backend) => backend.get(R::COLLECTION, id).await?,
        };
        value.map(decode).transpose()
    }

    /// Upsert keyed by the record's id. Last write wins.
    pub async fn put<R: Record>(&self, record: &R) -> Result<()> {
        let value = serde_json::to_value(record)?;
        match self {
            Self::Memory(backend) => backend.put(R::COLLECTION, record.id(), value).await,
            Self::Postgres(backend) => backend.put(R::COLLECTION, record.id(), value).await,
        }
    }

    /// Remove by id. Returns whether a record was removed; absent ids are not an error.
    pub async fn delete<R: Record>(&self, id: &str) -> Result<bool> {
        match self {
            Self::Memory(backend) => backend.delete(R::COLLECTION, id).await,
            Self::Postgres(backend) => backend.delete(R::COLLECTION, id).await,
        }
    }

    /// Full scan of the collection filtered in memory.
    pub async fn find<R, F>(&self, predicate: F) -> Result<Vec<R>>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        let records = self.get_all::<R>().await?;
        Ok(records.into_iter().filter(|r| predicate(r)).collect())
    }

    pub async fn count<R: Record>(&self) -> Result<usize> {
        match self {
            Self::Memory(backend) => backend.count(R::COLLECTION).await,
            Self::Postgres(backend) => backend.count(R::COLLECTION).await,
        }
    }

    /// Write `record` unless an existing record of the same collection
    /// satisfies `conflicts`. The check and the write happen as one unit, so
    /// two concurrent callers cannot both pass the check.
    ///
    /// Returns `Ok(None)` when written, `Ok(Some(existing))` with the first
    /// conflicting record otherwise.
    pub async fn put_unless<R, F>(&self, record: &R, conflicts: F) -> Result<Option<R>>
    where
        R: Record,
        F: Fn(&R) -> bool + Send + Sync,
    {
        match self {
            Self::Memory(backend) => backend.put_unless(record, conflicts).await,
            Self::Postgres(backend) => backend.put_unless(record, conflicts).await,
        }
    }

    /// Read-modify-write of one record as a single unit.
    ///
    /// `apply` runs against the current stored record. When it returns `Err`
    /// nothing is written and the error is passed through. Returns `Ok(None)`
    /// when no record has that id, otherwise the stored record together with
    /// the closure's output.
    pub async fn update<R, T, F>(&self, id: &str, apply: F) -> Result<Option<(R, T)>>
    where
        R: Record,
        T: Send,
        F: FnOnce(&mut R) -> Result<T> + Send,
    {
        match self {
            Self::Memory(backend) => backend.update(id, apply).await,
            Self::Postgres(backend) => backend.update(id, apply).await,
        }
    }

    /// Shut the store down. Every later operation fails with `StoreUnavailable`.
    pub async fn close(&self) {
        match self {
            Self::Memory(backend) => backend.close(),
            Self::Postgres(backend) => backend.close().await,
        }
    }
}
