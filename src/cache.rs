use core::hash::BuildHasherDefault;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use seahash::SeaHasher;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{MatchError, Result};
use crate::identity::DataIdentity;
use crate::query::Query;

pub const DEFAULT_CAPACITY: usize = 1024;

pub type CacheHasher = BuildHasherDefault<SeaHasher>;

// ------------- Outcome -------------
/// Result of matching one query against one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    Found(String),
    NotFound,
}
impl MatchOutcome {
    pub const NOT_FOUND: &'static str = "-1";

    pub fn into_string(self) -> String {
        match self {
            MatchOutcome::Found(value) => value,
            MatchOutcome::NotFound => Self::NOT_FOUND.to_string(),
        }
    }
}
impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchOutcome::Found(value) => f.write_str(value),
            MatchOutcome::NotFound => f.write_str(Self::NOT_FOUND),
        }
    }
}

// ------------- Key -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    identity: DataIdentity,
    query: Vec<(String, String)>,
}
impl CacheKey {
    pub fn new(identity: DataIdentity, query: &Query) -> Self {
        Self {
            identity,
            query: query.normalized(),
        }
    }
    pub fn identity(&self) -> &DataIdentity {
        &self.identity
    }
}

// ------------- Cache -------------
/// Fixed-capacity, least-recently-used map from (dataset identity, query)
/// to a single-query outcome. Every access goes through one mutex.
pub struct MatchCache {
    entries: Mutex<LruCache<CacheKey, MatchOutcome, CacheHasher>>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::with_hasher(capacity, CacheHasher::default())),
        }
    }
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_capacity(config.cache_capacity)
    }
    /// A hit promotes the entry to most recently used.
    pub fn get(&self, key: &CacheKey) -> Result<Option<MatchOutcome>> {
        let mut entries = self.lock()?;
        let hit = entries.get(key).cloned();
        debug!(identity = %key.identity(), hit = hit.is_some(), "cache lookup");
        Ok(hit)
    }
    /// Inserts or refreshes an entry, evicting the least recently used one when full.
    pub fn put(&self, key: CacheKey, outcome: MatchOutcome) -> Result<()> {
        let mut entries = self.lock()?;
        debug!(identity = %key.identity(), %outcome, "cache store");
        if let Some((evicted, _)) = entries.push(key, outcome) {
            if entries.contains(&evicted) {
                // same key refreshed, nothing left the cache
                return Ok(());
            }
            debug!(identity = %evicted.identity(), "cache eviction");
        }
        Ok(())
    }
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
    /// Size and capacity stay readable after a panic poisoned the lock.
    pub fn len(&self) -> usize {
        self.recovered().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn capacity(&self) -> usize {
        self.recovered().cap().get()
    }
    fn lock(&self) -> Result<MutexGuard<'_, LruCache<CacheKey, MatchOutcome, CacheHasher>>> {
        self.entries
            .lock()
            .map_err(|e| MatchError::Lock(e.to_string()))
    }
    fn recovered(&self) -> MutexGuard<'_, LruCache<CacheKey, MatchOutcome, CacheHasher>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MatchCache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MatchCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
