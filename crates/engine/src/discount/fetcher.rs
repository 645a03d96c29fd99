//! Debounced, cancellable discount lookups.
//!
//! Every call to [`DiscountFetcher::request`] starts a new generation. The
//! previous pending lookup is aborted, the new one waits out the debounce
//! period and then asks the [`DiscountSource`]. A response is only delivered
//! if its generation is still current when it arrives, so the last request
//! always wins. Responses are cached per key with `moka`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Discount, DiscountKey, DiscountSource, DiscountUpdate};
use crate::config::DiscountSettings;

/// Debounced discount lookups against a [`DiscountSource`].
pub struct DiscountFetcher<S> {
    source: Arc<S>,
    cache: Cache<DiscountKey, Arc<Vec<Discount>>>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    updates: mpsc::UnboundedSender<DiscountUpdate>,
}

impl<S> std::fmt::Debug for DiscountFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscountFetcher")
            .field("debounce", &self.debounce)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: DiscountSource> DiscountFetcher<S> {
    /// Create a fetcher and the receiver its updates are delivered on.
    #[must_use]
    pub fn new(source: S, settings: &DiscountSettings) -> (Self, mpsc::UnboundedReceiver<DiscountUpdate>) {
        let cache = Cache::builder()
            .max_capacity(settings.cache_capacity)
            .time_to_live(settings.cache_ttl)
            .build();
        let (updates, receiver) = mpsc::unbounded_channel();

        let fetcher = Self {
            source: Arc::new(source),
            cache,
            debounce: settings.debounce,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            updates,
        };
        (fetcher, receiver)
    }

    /// Request the discounts for `key`, superseding any pending request.
    ///
    /// Cached keys are answered without waiting for the debounce period.
    /// Returns the generation of this request.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request(&mut self, key: DiscountKey) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_pending();

        let source = Arc::clone(&self.source);
        let cache = self.cache.clone();
        let current = Arc::clone(&self.generation);
        let updates = self.updates.clone();
        let debounce = self.debounce;

        self.pending = Some(tokio::spawn(async move {
            if let Some(discounts) = cache.get(&key).await {
                debug!(product_id = %key.product_id, generation, "Discount cache hit");
                let _ = updates.send(DiscountUpdate {
                    generation,
                    key,
                    discounts,
                    cached: true,
                });
                return;
            }

            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            match source.fetch_discounts(&key).await {
                Ok(discounts) => {
                    let discounts = Arc::new(discounts);
                    cache.insert(key.clone(), Arc::clone(&discounts)).await;

                    if current.load(Ordering::SeqCst) != generation {
                        debug!(
                            product_id = %key.product_id,
                            generation,
                            "Dropping stale discount response"
                        );
                        return;
                    }
                    let _ = updates.send(DiscountUpdate {
                        generation,
                        key,
                        discounts,
                        cached: false,
                    });
                }
                Err(e) => {
                    warn!(
                        product_id = %key.product_id,
                        error = %e,
                        "Discount lookup failed; pricing without discounts"
                    );
                }
            }
        }));

        generation
    }

    /// Abort the pending request, if any.
    ///
    /// Bumps the generation so that an in-flight response is discarded.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending();
    }

    /// Generation of the most recent request.
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `update` answers the most recent request.
    #[must_use]
    pub fn accept(&self, update: &DiscountUpdate) -> bool {
        let current = self.current_generation();
        if update.generation == current {
            return true;
        }
        debug!(
            generation = update.generation,
            current, "Ignoring superseded discount update"
        );
        false
    }

    /// Drop a cached response so the next request for `key` hits the source.
    pub async fn invalidate(&self, key: &DiscountKey) {
        self.cache.invalidate(key).await;
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<S> Drop for DiscountFetcher<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
