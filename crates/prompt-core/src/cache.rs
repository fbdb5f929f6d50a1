//! Cache Port (spec.md §4.15, supplement). Grounded in
//! `original_source/hemdov/domain/ports/cache_port.py`. The domain
//! layer depends only on this trait; `prompt-infra` supplies an
//! in-process implementation used to memoize OPRO/IFEval results.
//! Cache failures never fail a request — callers log and set a
//! degradation flag rather than propagating.

pub const DEFAULT_TTL_SECONDS: u64 = 86_400;

pub trait CachePort: Send + Sync {
    /// Returns the cached JSON value for `key`, or `None` if absent or
    /// expired.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Stores `value` under `key` for `ttl_seconds`.
    fn set(&self, key: &str, value: serde_json::Value, ttl_seconds: u64);

    /// Invalidates every entry tagged with `version` (used when the
    /// catalog is reloaded, since cached few-shot-conditioned results
    /// become stale).
    fn invalidate_by_version(&self, version: &str);
}

/// Builds the cache key OPRO/IFEval memoization uses: a stable hash of
/// the template plus its constraints, so identical inputs never
/// re-run the optimizer.
pub fn memo_key(template: &str, constraints_fingerprint: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    template.hash(&mut hasher);
    constraints_fingerprint.hash(&mut hasher);
    format!("opro:{:x}", hasher.finish())
}
