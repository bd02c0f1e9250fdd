//! Catalog client with the shared resource cache in front of collection reads.

use std::sync::Arc;

use crate::cache::{CacheResult, ResourceCache, ResourceKey};

use super::client::{CatalogClient, ListParams};
use super::error::ApiError;
use super::types::{Category, Product, Subcategory, User};

/// Catalog client whose collection reads go through the in-memory cache.
///
/// Reads of the four cached collections consult the cache first; a valid
/// entry short-circuits the network entirely, and on a hit the passed params
/// are ignored - the cache is keyed by resource type alone, so a view that
/// changes its search term passes `force_refresh` instead of expecting a
/// per-params entry.
///
/// Mutations never touch the cache. Use [`inner`](Self::inner) for writes and
/// for the uncached reads (stats, reviews, nested product resources), then
/// call [`invalidate`](Self::invalidate) for the affected keys so the next
/// read refetches.
#[derive(Clone)]
pub struct CachedCatalogClient {
  inner: CatalogClient,
  cache: Arc<ResourceCache>,
}

impl CachedCatalogClient {
  pub fn new(inner: CatalogClient, cache: Arc<ResourceCache>) -> Self {
    Self { inner, cache }
  }

  /// The underlying client, for mutations and uncached reads.
  pub fn inner(&self) -> &CatalogClient {
    &self.inner
  }

  pub async fn fetch_users(
    &self,
    params: &ListParams,
    force_refresh: bool,
  ) -> Result<CacheResult<Arc<Vec<User>>>, ApiError> {
    let inner = self.inner.clone();
    let params = params.clone();
    self
      .cache
      .fetch_users(force_refresh, move || async move {
        inner.list_users(&params).await
      })
      .await
  }

  pub async fn fetch_products(
    &self,
    params: &ListParams,
    force_refresh: bool,
  ) -> Result<CacheResult<Arc<Vec<Product>>>, ApiError> {
    let inner = self.inner.clone();
    let params = params.clone();
    self
      .cache
      .fetch_products(force_refresh, move || async move {
        inner.list_products(&params).await
      })
      .await
  }

  pub async fn fetch_categories(
    &self,
    params: &ListParams,
    force_refresh: bool,
  ) -> Result<CacheResult<Arc<Vec<Category>>>, ApiError> {
    let inner = self.inner.clone();
    let params = params.clone();
    self
      .cache
      .fetch_categories(force_refresh, move || async move {
        inner.list_categories(&params).await
      })
      .await
  }

  pub async fn fetch_subcategories(
    &self,
    params: &ListParams,
    force_refresh: bool,
  ) -> Result<CacheResult<Arc<Vec<Subcategory>>>, ApiError> {
    let inner = self.inner.clone();
    let params = params.clone();
    self
      .cache
      .fetch_subcategories(force_refresh, move || async move {
        inner.list_subcategories(&params).await
      })
      .await
  }

  /// Clear cache entries after a mutation; empty slice clears everything.
  pub fn invalidate(&self, keys: &[ResourceKey]) {
    self.cache.invalidate(keys);
  }

  /// Whether a fetch is in flight for the given key.
  pub fn is_loading(&self, key: ResourceKey) -> bool {
    self.cache.is_loading(key)
  }
}
