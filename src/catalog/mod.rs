//! Client-side bindings for the catalog admin API.

mod cached_client;
pub mod client;
pub mod error;
pub mod types;

pub use cached_client::CachedCatalogClient;
pub use client::{CatalogClient, ListParams};
pub use error::ApiError;
