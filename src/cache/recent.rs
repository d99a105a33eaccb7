//! Bounded list of recent recipe lookups

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::CacheManager;
use crate::data::Recipe;

/// Number of lookups kept
pub const RECENT_CAPACITY: usize = 5;

/// Cache key of the recent lookups file
pub const RECENT_CACHE_KEY: &str = "recent_recipes";

/// Recent `(name as typed, recipe)` lookups, most recent last
///
/// On disk this is a JSON array of `[name, recipe]` pairs. Once full, the
/// oldest entry is evicted first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentLookups {
    entries: VecDeque<(String, Recipe)>,
}

impl RecentLookups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the list from the cache, starting empty if it's missing or unreadable
    pub fn load(cache: &CacheManager) -> Self {
        let mut recent: Self = cache.read(RECENT_CACHE_KEY).unwrap_or_default();
        while recent.entries.len() > RECENT_CAPACITY {
            recent.entries.pop_front();
        }
        recent
    }

    pub fn save(&self, cache: &CacheManager) -> std::io::Result<()> {
        cache.write(RECENT_CACHE_KEY, self)
    }

    /// Finds the most recent lookup made under `name`, ignoring case
    pub fn find(&self, name: &str) -> Option<&Recipe> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .rev()
            .find(|(looked_up, _)| looked_up.to_lowercase() == name)
            .map(|(_, recipe)| recipe)
    }

    /// Records a lookup
    ///
    /// An identical `(name, recipe)` pair already in the list is left where it
    /// is; anything else is appended, evicting the oldest entry when full.
    pub fn record(&mut self, name: &str, recipe: &Recipe) {
        let already_cached = self
            .entries
            .iter()
            .any(|(looked_up, cached)| looked_up == name && cached == recipe);
        if already_cached {
            return;
        }

        if self.entries.len() == RECENT_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back((name.to_string(), recipe.clone()));
    }

    /// Swaps every cached copy of `saved` (same store key) for the saved record
    pub fn replace(&mut self, saved: &Recipe) {
        let key = saved.key();
        for (_, cached) in self.entries.iter_mut() {
            if cached.key() == key {
                *cached = saved.clone();
            }
        }
    }

    /// Up to `count` recipes, most recent first
    pub fn latest(&self, count: usize) -> impl Iterator<Item = &Recipe> {
        self.entries.iter().rev().take(count).map(|(_, recipe)| recipe)
    }

    /// Looked-up names, oldest first
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
