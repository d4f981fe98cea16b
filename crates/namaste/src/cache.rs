//! Query cache shared by every page.
//!
//! Entries are keyed by [`QueryKey`] plus a parameter (the search text, or an
//! empty string for parameterless queries). Invalidating a key drops all of
//! its entries and notifies subscribers of that key so they can refetch.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use namaste_core::query::QueryKey;
use tokio::sync::broadcast;

use crate::prelude::Error;

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<(QueryKey, String), Entry>>>,
    invalidations: broadcast::Sender<QueryKey>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (invalidations, _) = broadcast::channel(64);
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            invalidations,
        }
    }

    /// Cached value for `key`/`param`, if present and of type `T`.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: QueryKey, param: &str) -> Option<T> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(&(key, param.to_string()))
            .and_then(|entry| entry.downcast_ref::<T>())
            .cloned()
    }

    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, param: &str, value: T) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((key, param.to_string()), Arc::new(value));
        }
    }

    /// Return the cached value or run `fetch` and cache its success.
    ///
    /// Errors are never cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, param: &str, fetch: F) -> Result<T, Error>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        if let Some(hit) = self.get::<T>(key, param) {
            log::debug!("cache hit: {key} {param:?}");
            return Ok(hit);
        }

        self.refresh(key, param, fetch).await
    }

    /// Run `fetch` unconditionally and cache its success.
    pub async fn refresh<T, F, Fut>(&self, key: QueryKey, param: &str, fetch: F) -> Result<T, Error>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let value = fetch().await?;
        self.set(key, param, value.clone());
        Ok(value)
    }

    /// Drop every entry under `key` and notify its subscribers.
    pub fn invalidate(&self, key: QueryKey) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|(k, _), _| *k != key);
        }
        log::debug!("invalidated query: {key}");
        // No receivers is fine: nobody is watching this key right now.
        let _ = self.invalidations.send(key);
    }

    pub fn invalidate_all(&self, keys: &[QueryKey]) {
        for key in keys {
            self.invalidate(*key);
        }
    }

    /// Subscribe to invalidations of `key`.
    pub fn subscribe(&self, key: QueryKey) -> CacheSubscription {
        CacheSubscription {
            key,
            receiver: self.invalidations.subscribe(),
        }
    }
}

/// Receives invalidations of one key. Dropping it unsubscribes.
pub struct CacheSubscription {
    key: QueryKey,
    receiver: broadcast::Receiver<QueryKey>,
}

impl CacheSubscription {
    /// Wait for the next invalidation of this key.
    ///
    /// Returns `None` once the cache is gone.
    pub async fn recv(&mut self) -> Option<QueryKey> {
        loop {
            match self.receiver.recv().await {
                Ok(key) if key == self.key => return Some(key),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    log::debug!("cache subscriber for {} lagged by {count}", self.key);
                    // Something was invalidated while we were behind; treat it as ours.
                    return Some(self.key);
                }
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<QueryKey> {
        loop {
            match self.receiver.try_recv() {
                Ok(key) if key == self.key => return Some(key),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => return Some(self.key),
                Err(_) => return None,
            }
        }
    }
}
