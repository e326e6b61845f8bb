//! Address-keyed query cache using Moka

use std::fmt;
use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::CacheError;
use super::keys::{filtered_address_prefix, root_address, CacheAddress};
use crate::config::Config;
use crate::models::Scope;

/// Caches query results by address, coalescing concurrent fetches and
/// supporting prefix invalidation
#[derive(Clone)]
pub struct QueryCacheManager<V> {
    cache: Cache<CacheAddress, V>,
}

impl<V> QueryCacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new query cache manager
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();

        Self { cache }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_max_capacity, config.cache_ttl)
    }

    /// Get a cached result set
    pub async fn get(&self, address: &CacheAddress) -> Option<V> {
        if address.is_empty() {
            return None;
        }
        let result = self.cache.get(address).await;
        if result.is_some() {
            debug!("Cache hit for address: {}", address);
        } else {
            debug!("Cache miss for address: {}", address);
        }
        result
    }

    /// Store a result set. Writes to the empty address are dropped.
    pub async fn insert(&self, address: CacheAddress, value: V) {
        if address.is_empty() {
            debug!("Skipping insert for empty address");
            return;
        }
        debug!("Caching result set for address: {}", address);
        self.cache.insert(address, value).await;
    }

    /// Return the cached value or run `fetch` to produce it.
    ///
    /// Concurrent callers for the same address share one fetch. A failed
    /// fetch is not cached.
    pub async fn get_or_fetch<F, E>(&self, address: CacheAddress, fetch: F) -> Result<V, CacheError>
    where
        F: Future<Output = Result<V, E>>,
        E: fmt::Display + Send + Sync + 'static,
    {
        if address.is_empty() {
            return Err(CacheError::EmptyAddress);
        }

        let label = address.to_string();
        match self.cache.entry(address).or_try_insert_with(fetch).await {
            Ok(entry) => {
                if entry.is_fresh() {
                    debug!("Fetched and cached result set for address: {}", label);
                } else {
                    debug!("Cache hit for address: {}", label);
                }
                Ok(entry.into_value())
            }
            Err(err) => {
                warn!("Fetch failed for address {}: {}", label, err);
                Err(CacheError::Fetch {
                    address: label,
                    message: err.to_string(),
                })
            }
        }
    }

    /// Like `get_or_fetch`, but abandons the fetch once `cancel` fires.
    /// An abandoned fetch writes nothing.
    pub async fn fetch_cancellable<F, E>(
        &self,
        address: CacheAddress,
        fetch: F,
        cancel: &CancellationToken,
    ) -> Result<V, CacheError>
    where
        F: Future<Output = Result<V, E>>,
        E: fmt::Display + Send + Sync + 'static,
    {
        let label = address.to_string();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Discarding superseded fetch for address: {}", label);
                Err(CacheError::Superseded(label))
            }
            result = self.get_or_fetch(address, fetch) => result,
        }
    }

    /// Invalidate one exact address
    pub async fn invalidate(&self, address: &CacheAddress) {
        self.cache.invalidate(address).await;
        debug!("Invalidated cache entry: {}", address);
    }

    /// Invalidate every entry whose address starts with `prefix`.
    ///
    /// Entries present at the time of the call stop being visible at once;
    /// entries inserted afterwards are kept. The empty prefix matches nothing.
    pub fn invalidate_prefix(&self, prefix: &CacheAddress) -> Result<(), CacheError> {
        if prefix.is_empty() {
            debug!("Ignoring invalidation for empty prefix");
            return Ok(());
        }

        // Clone prefix to avoid reference escaping the closure
        let prefix_owned = prefix.clone();
        self.cache
            .invalidate_entries_if(move |address, _| address.starts_with(&prefix_owned))
            .map_err(|e| CacheError::Invalidation(e.to_string()))?;

        info!("Invalidated cache entries under prefix: {}", prefix);
        Ok(())
    }

    /// Invalidate every entry of a scope regardless of filter
    pub fn invalidate_scope(&self, scope: &Scope) -> Result<(), CacheError> {
        self.invalidate_prefix(&root_address(scope))
    }

    /// Invalidate the date-bounded entries of a scope
    pub fn invalidate_filtered(&self, scope: &Scope) -> Result<(), CacheError> {
        self.invalidate_prefix(&filtered_address_prefix(scope))
    }

    /// Number of live entries after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}
