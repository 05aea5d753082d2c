//! Last-known-good fallback for single-reading sources
//!
//! The previous good value is loaded before the fetch is attempted and is
//! only overwritten after a successful fetch, so a failing run can never
//! replace a good cache entry.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::cache::{StateStore, StateStoreExt};
use crate::error::SourceError;
use crate::status::SourceStatus;

/// A reading that can stand in for a fresh one when its source fails
pub trait LastKnownGood: Clone + Serialize + DeserializeOwned {
    /// Whether a cached copy is worth returning
    fn is_usable(&self) -> bool;

    /// Flag the value as a cached copy rather than a fresh reading
    fn mark_stale(&mut self);
}

/// Await `fetch`, persisting success and falling back to the cache on failure.
///
/// On failure the cached value (if usable) is returned as a stale copy, or
/// `placeholder()` when there is nothing usable. The status reports the
/// failure either way.
#[tracing::instrument(name = "get_or_fallback", level = "debug", skip(store, fetch, placeholder))]
pub async fn get_or_fallback<T, Fut, P>(
    store: &dyn StateStore,
    cache_key: &str,
    fetched_at: DateTime<Utc>,
    fetch: Fut,
    placeholder: P,
) -> (T, SourceStatus)
where
    T: LastKnownGood,
    Fut: Future<Output = Result<T, SourceError>>,
    P: FnOnce() -> T,
{
    let cached: Option<T> = store.load(cache_key);

    match fetch.await {
        Ok(value) => {
            if let Err(e) = store.save(cache_key, &value) {
                tracing::warn!("Could not persist last-known-good value: {}", e);
            }
            (value, SourceStatus::ok(fetched_at))
        }
        Err(err) => {
            let value = match cached.filter(LastKnownGood::is_usable) {
                Some(mut previous) => {
                    tracing::info!("Serving stale cached value after failure: {}", err);
                    previous.mark_stale();
                    previous
                }
                None => {
                    tracing::warn!("No usable cached value after failure: {}", err);
                    placeholder()
                }
            };
            (value, SourceStatus::failed(fetched_at, &err))
        }
    }
}
