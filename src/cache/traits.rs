//! Core types for the resource cache: time source and read results.

use chrono::{DateTime, Utc};

/// Time source for cache validity checks.
///
/// Injected into the cache at construction so tests can drive expiry with a
/// manually advanced clock instead of depending on wall-clock time.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Result of a cache read, including where the data came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was stored (if served from cache)
  pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      fetched_at: None,
    }
  }

  /// Create a result from a valid cached entry.
  pub fn from_cache(data: T, fetched_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      fetched_at: Some(fetched_at),
    }
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the network
  Network,
  /// Data served from a valid cached entry
  Cache,
}

impl CacheSource {
  pub fn is_cache(&self) -> bool {
    matches!(self, CacheSource::Cache)
  }
}
