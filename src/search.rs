use std::env;
use std::time::{Duration, Instant, SystemTime};

use crate::cache::{CacheStats, SearchCache, SearchKey};
use crate::debounce::Debouncer;
use crate::error::FetchError;
use crate::models::{SearchCategory, SearchHit, Suggestion, SuggestionRecord};
use crate::suggest::{self, MAX_SUGGESTIONS, MIN_QUERY_LEN};

const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Orchestrates the type-ahead pipeline: keystrokes go through the debouncer,
/// quiesced queries through the TTL cache, cached or fetched hits through the
/// suggestion formatter. Fetching itself is injected per call so the session
/// owns no network state.
#[derive(Debug)]
pub struct SearchSession {
    cache: SearchCache,
    debouncer: Debouncer<SearchKey>,
    min_query_len: usize,
    max_suggestions: usize,
}

impl SearchSession {
    /// TTL from `SEARCH_CACHE_TTL_SECS`, debounce delay from
    /// `SEARCH_DEBOUNCE_MS`; defaults of 300 s and 300 ms otherwise.
    pub fn from_env() -> Self {
        let ttl = env::var("SEARCH_CACHE_TTL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(|secs| secs.clamp(1, 86_400))
            .map(Duration::from_secs)
            .unwrap_or(crate::cache::DEFAULT_TTL);
        let debounce = env::var("SEARCH_DEBOUNCE_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(|ms| ms.clamp(0, 10_000))
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_DEBOUNCE_MS));
        Self::with_settings(ttl, debounce)
    }

    pub fn with_settings(ttl: Duration, debounce: Duration) -> Self {
        Self {
            cache: SearchCache::with_ttl(ttl),
            debouncer: Debouncer::new(debounce),
            min_query_len: MIN_QUERY_LEN,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    /// Feeds one input-field change into the debouncer. Queries shorter than
    /// the minimum (after trimming) cancel any pending lookup and return
    /// false, which tells the caller to close its dropdown.
    pub fn on_input(
        &mut self,
        query: &str,
        category: SearchCategory,
        limit: u32,
        now: Instant,
    ) -> bool {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_query_len {
            self.debouncer.cancel();
            return false;
        }
        self.debouncer
            .submit(SearchKey::new(trimmed, category, limit), now);
        true
    }

    /// Returns the quiesced query once the debounce delay has elapsed.
    pub fn poll_due(&mut self, now: Instant) -> Option<SearchKey> {
        self.debouncer.poll(now)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.debouncer.next_due()
    }

    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }

    /// Resolves a due query against the cache, calling `fetcher` only on a
    /// miss or expired entry.
    pub fn run<F>(
        &mut self,
        key: &SearchKey,
        now: SystemTime,
        fetcher: F,
    ) -> Result<Vec<SearchHit>, FetchError>
    where
        F: FnOnce() -> Result<Vec<SearchHit>, FetchError>,
    {
        self.cache.get_or_fetch(key, now, fetcher)
    }

    /// Display-ready suggestion rows from raw search hits, highlighted
    /// against the query and capped at the suggestion limit.
    pub fn suggest_from_hits(&self, hits: &[SearchHit], query: &str) -> Vec<SuggestionRecord> {
        let raw: Vec<Suggestion> = hits.iter().map(Suggestion::from).collect();
        suggest::format_suggestions(&raw, query, self.max_suggestions)
    }

    pub fn suggestions(&self, raw: &[Suggestion], query: &str) -> Vec<SuggestionRecord> {
        suggest::format_suggestions(raw, query, self.max_suggestions)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::from_env()
    }
}
