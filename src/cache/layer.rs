//! Time-boxed in-memory cache for the admin collections.
//!
//! One slot per resource key holds the last fetched collection, the fetch
//! timestamp and a pending flag. Reads within the TTL window are served from
//! memory; everything else runs the injected fetcher and overwrites the slot.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::catalog::types::{Category, Product, Subcategory, User};

use super::traits::{CacheResult, Clock};

/// How long a fetched collection is served without refetching.
const DEFAULT_TTL_MINUTES: i64 = 5;

/// The fixed, closed set of cacheable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
  Users,
  Products,
  Categories,
  Subcategories,
}

impl ResourceKey {
  pub const ALL: [ResourceKey; 4] = [
    ResourceKey::Users,
    ResourceKey::Products,
    ResourceKey::Categories,
    ResourceKey::Subcategories,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceKey::Users => "users",
      ResourceKey::Products => "products",
      ResourceKey::Categories => "categories",
      ResourceKey::Subcategories => "subcategories",
    }
  }
}

impl fmt::Display for ResourceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One cached collection.
struct Slot<T> {
  data: Option<Arc<Vec<T>>>,
  fetched_at: Option<DateTime<Utc>>,
  pending: bool,
}

impl<T> Slot<T> {
  fn reset(&mut self) {
    self.data = None;
    self.fetched_at = None;
    self.pending = false;
  }
}

impl<T> Default for Slot<T> {
  fn default() -> Self {
    Self {
      data: None,
      fetched_at: None,
      pending: false,
    }
  }
}

/// Per-resource cache of the last fetched collection.
///
/// Explicitly constructed and shared by `Arc`; the clock is injected so tests
/// control expiry, and the network call is injected per-fetch as a closure, so
/// the cache itself never owns a transport.
///
/// Two deliberate simplifications, which callers work around rather than the
/// cache papering over them:
/// - entries are keyed by resource type only. A filtered listing and the
///   unfiltered one share a slot, so callers that change query params must
///   force a refresh.
/// - concurrent fetches for one key are not coalesced. Each call runs its own
///   request and the last completion owns the slot, even if it carries the
///   older response.
pub struct ResourceCache {
  users: Mutex<Slot<User>>,
  products: Mutex<Slot<Product>>,
  categories: Mutex<Slot<Category>>,
  subcategories: Mutex<Slot<Subcategory>>,
  ttl: Duration,
  clock: Arc<dyn Clock>,
}

impl ResourceCache {
  /// Create a cache with the default TTL.
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self {
      users: Mutex::default(),
      products: Mutex::default(),
      categories: Mutex::default(),
      subcategories: Mutex::default(),
      ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
      clock,
    }
  }

  /// Override the TTL.
  #[allow(dead_code)]
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Fetch the user collection through the cache.
  pub async fn fetch_users<F, Fut, E>(
    &self,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Arc<Vec<User>>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<User>, E>>,
  {
    self
      .fetch_slot(ResourceKey::Users, &self.users, force_refresh, fetcher)
      .await
  }

  /// Fetch the product collection through the cache.
  pub async fn fetch_products<F, Fut, E>(
    &self,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Arc<Vec<Product>>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Product>, E>>,
  {
    self
      .fetch_slot(ResourceKey::Products, &self.products, force_refresh, fetcher)
      .await
  }

  /// Fetch the category collection through the cache.
  pub async fn fetch_categories<F, Fut, E>(
    &self,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Arc<Vec<Category>>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Category>, E>>,
  {
    self
      .fetch_slot(
        ResourceKey::Categories,
        &self.categories,
        force_refresh,
        fetcher,
      )
      .await
  }

  /// Fetch the subcategory collection through the cache.
  pub async fn fetch_subcategories<F, Fut, E>(
    &self,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Arc<Vec<Subcategory>>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Subcategory>, E>>,
  {
    self
      .fetch_slot(
        ResourceKey::Subcategories,
        &self.subcategories,
        force_refresh,
        fetcher,
      )
      .await
  }

  async fn fetch_slot<T, F, Fut, E>(
    &self,
    key: ResourceKey,
    slot: &Mutex<Slot<T>>,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Arc<Vec<T>>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    {
      let mut slot = lock(slot);
      if !force_refresh {
        if let (Some(data), Some(at)) = (&slot.data, slot.fetched_at) {
          if self.clock.now() - at < self.ttl {
            tracing::debug!(key = key.as_str(), "serving collection from cache");
            return Ok(CacheResult::from_cache(Arc::clone(data), at));
          }
        }
      }
      slot.pending = true;
    }

    // The lock is not held across the network call. Overlapping fetches for
    // the same key each run their own request; whichever response lands last
    // owns the slot.
    tracing::debug!(key = key.as_str(), force_refresh, "fetching collection");
    let fetched = fetcher().await;

    let mut slot = lock(slot);
    slot.pending = false;
    match fetched {
      Ok(items) => {
        let data = Arc::new(items);
        slot.data = Some(Arc::clone(&data));
        slot.fetched_at = Some(self.clock.now());
        Ok(CacheResult::from_network(data))
      }
      Err(e) => {
        // Prior data and timestamp stay as they were; only pending clears.
        Err(e)
      }
    }
  }

  /// Reset the given entries so the next fetch hits the network.
  ///
  /// An empty slice clears every key. Callers invoke this after each
  /// successful mutation - writes bypass the cache, so this is the only way
  /// the cache learns a collection changed before the TTL runs out. Keys are
  /// cleared one at a time, not as a transaction.
  pub fn invalidate(&self, keys: &[ResourceKey]) {
    if keys.is_empty() {
      for key in ResourceKey::ALL {
        self.reset(key);
      }
    } else {
      for key in keys {
        self.reset(*key);
      }
    }
  }

  fn reset(&self, key: ResourceKey) {
    tracing::debug!(key = key.as_str(), "invalidating cache entry");
    match key {
      ResourceKey::Users => lock(&self.users).reset(),
      ResourceKey::Products => lock(&self.products).reset(),
      ResourceKey::Categories => lock(&self.categories).reset(),
      ResourceKey::Subcategories => lock(&self.subcategories).reset(),
    }
  }

  /// Whether a fetch is currently in flight for the given key.
  pub fn is_loading(&self, key: ResourceKey) -> bool {
    match key {
      ResourceKey::Users => lock(&self.users).pending,
      ResourceKey::Products => lock(&self.products).pending,
      ResourceKey::Categories => lock(&self.categories).pending,
      ResourceKey::Subcategories => lock(&self.subcategories).pending,
    }
  }
}

/// Slot locks are only held for plain field reads and writes, never across an
/// await, so a poisoned lock cannot hide a half-written entry. Recover the
/// guard instead of propagating the poison.
fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
  slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use crate::cache::clock::ManualClock;
  use chrono::TimeZone;
  use std::sync::atomic::{AtomicU32, Ordering};

  fn user(id: i64) -> User {
    User {
      id,
      username: format!("user{id}"),
      email: format!("user{id}@example.com"),
      first_name: String::new(),
      last_name: String::new(),
      phone: String::new(),
      avatar: None,
      company_name: String::new(),
      tax_id: String::new(),
      role: None,
      addresses: Vec::new(),
      is_verified: false,
      date_joined: Utc::now(),
      last_login: None,
    }
  }

  fn category(id: i64) -> Category {
    Category {
      id,
      name: format!("cat{id}"),
      slug: format!("cat-{id}"),
      description: String::new(),
      image: None,
      subcategories: Vec::new(),
    }
  }

  fn subcategory(id: i64) -> Subcategory {
    Subcategory {
      id,
      name: format!("sub{id}"),
      slug: format!("sub-{id}"),
      description: String::new(),
      image: None,
      category: 1,
    }
  }

  fn product(id: i64) -> Product {
    Product {
      id,
      subcategory: 1,
      subcategory_name: String::new(),
      name: format!("product{id}"),
      slug: format!("product-{id}"),
      sku: format!("SKU-{id}"),
      description: String::new(),
      base_price: "10.00".to_string(),
      stock_quantity: 0,
      attributes: Vec::new(),
      print_specs: None,
      meta_title: String::new(),
      meta_description: String::new(),
    }
  }

  fn test_cache() -> (ResourceCache, Arc<ManualClock>) {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::starting_at(start));
    let cache = ResourceCache::new(clock.clone());
    (cache, clock)
  }

  #[tokio::test]
  async fn second_fetch_within_ttl_hits_cache() {
    let (cache, _clock) = test_cache();
    let calls = Arc::new(AtomicU32::new(0));

    let c = calls.clone();
    let first = cache
      .fetch_users(false, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![user(1)])
      })
      .await
      .unwrap();
    assert_eq!(first.source, CacheSource::Network);

    let c = calls.clone();
    let second = cache
      .fetch_users(false, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![user(2)])
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(second.source.is_cache());
    // Same allocation, not a copy.
    assert!(Arc::ptr_eq(&first.data, &second.data));
  }

  #[tokio::test]
  async fn force_refresh_always_fetches() {
    let (cache, _clock) = test_cache();
    let calls = Arc::new(AtomicU32::new(0));

    for _ in 0..2 {
      let c = calls.clone();
      let result = cache
        .fetch_users(true, move || async move {
          c.fetch_add(1, Ordering::SeqCst);
          Ok::<_, String>(vec![user(1)])
        })
        .await
        .unwrap();
      assert_eq!(result.source, CacheSource::Network);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn invalidate_forces_refetch_inside_ttl() {
    let (cache, _clock) = test_cache();
    let calls = Arc::new(AtomicU32::new(0));

    let c = calls.clone();
    cache
      .fetch_users(false, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![user(1)])
      })
      .await
      .unwrap();

    cache.invalidate(&[ResourceKey::Users]);

    let c = calls.clone();
    let result = cache
      .fetch_users(false, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![user(2)])
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data[0].id, 2);
  }

  #[tokio::test]
  async fn invalidate_with_empty_slice_clears_every_key() {
    let (cache, _clock) = test_cache();
    let calls = Arc::new(AtomicU32::new(0));

    macro_rules! fetch_all {
      () => {{
        let c = calls.clone();
        cache
          .fetch_users(false, move || async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec![user(1)])
          })
          .await
          .unwrap();
        let c = calls.clone();
        cache
          .fetch_products(false, move || async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec![product(1)])
          })
          .await
          .unwrap();
        let c = calls.clone();
        cache
          .fetch_categories(false, move || async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec![category(1)])
          })
          .await
          .unwrap();
        let c = calls.clone();
        cache
          .fetch_subcategories(false, move || async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec![subcategory(1)])
          })
          .await
          .unwrap();
      }};
    }

    fetch_all!();
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    // Still within TTL: a second round would be pure cache hits.
    fetch_all!();
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    cache.invalidate(&[]);
    fetch_all!();
    assert_eq!(calls.load(Ordering::SeqCst), 8);
  }

  #[tokio::test]
  async fn ttl_boundary() {
    let (cache, clock) = test_cache();
    let calls = Arc::new(AtomicU32::new(0));

    let c = calls.clone();
    cache
      .fetch_products(false, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![product(1)])
      })
      .await
      .unwrap();

    // One millisecond short of five minutes: still a hit.
    clock.advance(Duration::milliseconds(299_999));
    let c = calls.clone();
    let hit = cache
      .fetch_products(false, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![product(2)])
      })
      .await
      .unwrap();
    assert!(hit.source.is_cache());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Past the boundary: refetch.
    clock.advance(Duration::milliseconds(2));
    let c = calls.clone();
    let miss = cache
      .fetch_products(false, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![product(2)])
      })
      .await
      .unwrap();
    assert_eq!(miss.source, CacheSource::Network);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn failed_fetch_clears_pending_and_keeps_prior_entry() {
    let (cache, _clock) = test_cache();

    cache
      .fetch_users(false, || async { Ok::<_, String>(vec![user(1)]) })
      .await
      .unwrap();

    let err = cache
      .fetch_users(true, || async { Err::<Vec<User>, _>("boom".to_string()) })
      .await
      .unwrap_err();
    assert_eq!(err, "boom");
    assert!(!cache.is_loading(ResourceKey::Users));

    // The entry survives the failed refresh: within TTL the old data is
    // still served.
    let cached = cache
      .fetch_users(false, || async { Ok::<_, String>(vec![user(9)]) })
      .await
      .unwrap();
    assert!(cached.source.is_cache());
    assert_eq!(cached.data[0].id, 1);
  }

  #[tokio::test]
  async fn overlapping_forced_fetches_last_write_wins() {
    let (cache, _clock) = test_cache();
    let cache = Arc::new(cache);
    let calls = Arc::new(AtomicU32::new(0));
    let (gate_tx, gate_rx) = tokio::sync::oneshot::channel::<()>();

    // First fetch parks until released.
    let slow_cache = Arc::clone(&cache);
    let c = calls.clone();
    let slow = tokio::spawn(async move {
      slow_cache
        .fetch_users(true, move || async move {
          c.fetch_add(1, Ordering::SeqCst);
          gate_rx.await.ok();
          Ok::<_, String>(vec![user(1)])
        })
        .await
    });

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(cache.is_loading(ResourceKey::Users));

    // Second forced fetch starts later but completes first. Not coalesced
    // with the one already in flight.
    let c = calls.clone();
    cache
      .fetch_users(true, move || async move {
        c.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![user(2)])
      })
      .await
      .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Release the first fetch; its older response is written last and wins.
    gate_tx.send(()).unwrap();
    slow.await.unwrap().unwrap();
    assert!(!cache.is_loading(ResourceKey::Users));

    let current = cache
      .fetch_users(false, || async { Ok::<_, String>(Vec::new()) })
      .await
      .unwrap();
    assert!(current.source.is_cache());
    assert_eq!(current.data[0].id, 1);
  }
}
