//! Per-scope view state: the current filter and its in-flight fetch

use std::fmt;
use std::future::Future;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::CacheError;
use super::keys::{address, CacheAddress};
use super::store::QueryCacheManager;
use crate::models::{FilterDescriptor, Scope};
use crate::validation::validate_filter;

struct ViewState {
    filter: FilterDescriptor,
    cancel: CancellationToken,
}

/// Holds the filter currently selected for one scope. Changing the filter
/// cancels any fetch started under the previous one, so a late response
/// never lands for a view that no longer asks for it.
pub struct QueryView<V> {
    scope: Scope,
    cache: QueryCacheManager<V>,
    state: Mutex<ViewState>,
}

impl<V> QueryView<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(scope: Scope, cache: QueryCacheManager<V>, filter: FilterDescriptor) -> Self {
        Self {
            scope,
            cache,
            state: Mutex::new(ViewState {
                filter,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub async fn filter(&self) -> FilterDescriptor {
        self.state.lock().await.filter.clone()
    }

    /// Address of the current filter
    pub async fn address(&self) -> CacheAddress {
        let state = self.state.lock().await;
        address(&self.scope, &state.filter)
    }

    /// Replace the current filter. Setting an equal filter is a no-op and
    /// leaves any in-flight fetch running.
    pub async fn set_filter(&self, filter: FilterDescriptor) {
        let mut state = self.state.lock().await;
        if state.filter == filter {
            return;
        }

        state.cancel.cancel();
        state.cancel = CancellationToken::new();
        state.filter = filter;
        info!(
            "Filter changed for scope {}, now at {}",
            self.scope,
            address(&self.scope, &state.filter)
        );
    }

    /// Load the result set for the current filter, fetching through the
    /// shared cache on a miss.
    pub async fn load<F, Fut, E>(&self, fetcher: F) -> Result<V, CacheError>
    where
        F: FnOnce(FilterDescriptor) -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: fmt::Display + Send + Sync + 'static,
    {
        let (filter, cancel) = {
            let state = self.state.lock().await;
            (state.filter.clone(), state.cancel.clone())
        };

        validate_filter(&filter)?;
        let address = address(&self.scope, &filter);
        self.cache
            .fetch_cancellable(address, fetcher(filter), &cancel)
            .await
    }
}
