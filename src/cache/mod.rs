// Response cache module

pub mod key;
pub mod layer;
pub mod models;
pub mod store;

pub use key::cache_key;
pub use layer::{ResponseCache, ResponseCacheLayer, CACHE_HIT_HEADER};
pub use models::{CacheConfig, CacheEntry, CacheStats};
pub use store::ResponseStore;
