//! Shared in-memory cache for the admin collections.
//!
//! This module provides the time-boxed memo that sits between the views and
//! the catalog API:
//! - one entry per resource key (users, products, categories, subcategories)
//! - entries expire after a fixed TTL, checked lazily at read time
//! - manual invalidation after mutations, which always bypass the cache
//! - no single-flight coalescing: overlapping fetches each hit the network

mod clock;
mod layer;
mod traits;

pub use clock::{ManualClock, SystemClock};
pub use layer::{ResourceCache, ResourceKey};
pub use traits::{CacheResult, CacheSource, Clock};
