//! Client-side cache
//!
//! `CacheManager` persists JSON files under the user's cache directory, and
//! `RecentLookups` keeps the last few recipe lookups in one of those files so
//! repeated lookups skip the server across runs.

mod manager;
mod recent;

pub use manager::CacheManager;
pub use recent::{RecentLookups, RECENT_CACHE_KEY, RECENT_CAPACITY};
