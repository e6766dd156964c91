//! In-process record store backend.

use indexmap::IndexMap;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::sync::RwLock;

use super::{decode, Collection, Record};
use crate::error::{Error, Result};

type Collections = HashMap<Collection, IndexMap<String, Value>>;

/// Insertion-ordered collections behind a single async lock.
///
/// Clones share storage and the closed flag.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    collections: Arc<RwLock<Collections>>,
    closed: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::StoreUnavailable("memory store is closed".to_string()));
        }
        Ok(())
    }

    pub(crate) async fn all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.ensure_open()?;
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    pub(crate) async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        self.ensure_open()?;
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).and_then(|records| records.get(id).cloned()))
    }

    pub(crate) async fn put(&self, collection: Collection, id: &str, value: Value) -> Result<()> {
        self.ensure_open()?;
        let mut guard = self.collections.write().await;
        guard.entry(collection).or_default().insert(id.to_string(), value);
        Ok(())
    }

    pub(crate) async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        self.ensure_open()?;
        let mut guard = self.collections.write().await;
        Ok(guard
            .get_mut(&collection)
            .and_then(|records| records.shift_remove(id))
            .is_some())
    }

    pub(crate) async fn count(&self, collection: Collection) -> Result<usize> {
        self.ensure_open()?;
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).map(IndexMap::len).unwrap_or(0))
    }

    /// Check and write under the write lock.
    pub(crate) async fn put_unless<R, F>(&self, record: &R, conflicts: F) -> Result<Option<R>>
    where
        R: Record,
        F: Fn(&R) -> bool + Send + Sync,
    {
        self.ensure_open()?;
        let value = serde_json::to_value(record)?;

        let mut guard = self.collections.write().await;
        let records = guard.entry(R::COLLECTION).or_default();

        for existing in records.values() {
            let existing: R = decode(existing.clone())?;
            if conflicts(&existing) {
                return Ok(Some(existing));
            }
        }

        records.insert(record.id().to_string(), value);
        Ok(None)
    }

    /// Decode, apply and re-encode under the write lock.
    pub(crate) async fn update<R, T, F>(&self, id: &str, apply: F) -> Result<Option<(R, T)>>
    where
        R: Record,
        F: FnOnce(&mut R) -> Result<T>,
    {
        self.ensure_open()?;
        let mut guard = self.collections.write().await;
        let Some(slot) = guard.get_mut(&R::COLLECTION).and_then(|records| records.get_mut(id)) else {
            return Ok(None);
        };

        let mut record: R = decode(slot.clone())?;
        let output = apply(&mut record)?;
        *slot = serde_json::to_value(&record)?;
        Ok(Some((record, output)))
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
