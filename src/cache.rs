use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::error::FetchError;
use crate::models::{SearchCategory, SearchHit};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Two lookups differing in any field are distinct cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub query: String,
    pub category: SearchCategory,
    pub limit: u32,
}

impl SearchKey {
    pub fn new(query: impl Into<String>, category: SearchCategory, limit: u32) -> Self {
        Self {
            query: query.into(),
            category,
            limit,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<SearchHit>,
    fetched_at: SystemTime,
}

/// Time-boxed memo of search results. Expiry is lazy: an aged entry is
/// treated as absent on the next lookup, there is no background sweep and no
/// size bound. `stats()` exposes growth for callers that care.
#[derive(Debug)]
pub struct SearchCache {
    ttl: Duration,
    entries: HashMap<SearchKey, CacheEntry>,
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub keys: Vec<SearchKey>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value when a fresh entry exists, otherwise invokes
    /// `fetcher` and stores the result only on success. Failures propagate
    /// and are never cached, so the next call fetches again.
    pub fn get_or_fetch<F>(
        &mut self,
        key: &SearchKey,
        now: SystemTime,
        fetcher: F,
    ) -> Result<Vec<SearchHit>, FetchError>
    where
        F: FnOnce() -> Result<Vec<SearchHit>, FetchError>,
    {
        if let Some(entry) = self.entries.get(key)
            && is_fresh(entry.fetched_at, now, self.ttl)
        {
            tracing::debug!(query = %key.query, "search cache hit");
            return Ok(entry.value.clone());
        }

        let value = fetcher()?;
        self.entries.insert(
            key.clone(),
            CacheEntry {
                value: value.clone(),
                fetched_at: now,
            },
        );
        tracing::debug!(query = %key.query, results = value.len(), "search cache filled");
        Ok(value)
    }

    /// Fresh-entry peek without fetching; expired entries read as absent.
    pub fn peek(&self, key: &SearchKey, now: SystemTime) -> Option<&[SearchHit]> {
        self.entries
            .get(key)
            .filter(|entry| is_fresh(entry.fetched_at, now, self.ttl))
            .map(|entry| entry.value.as_slice())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            keys: self.entries.keys().cloned().collect(),
        }
    }
}

fn is_fresh(fetched_at: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    // An entry from the future (clock rewound) counts as fresh.
    now.duration_since(fetched_at)
        .map(|age| age < ttl)
        .unwrap_or(true)
}
