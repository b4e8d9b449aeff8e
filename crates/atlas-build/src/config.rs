//! # Build Configuration
//!
//! Plain data, constructed at build start and passed by reference.
//! Nothing here reads the environment; connection strings and
//! credentials live behind the `Repository` and `Publisher`
//! capabilities.

use atlas_ingest::RetryPolicy;
use atlas_merkle::BatchConfig;

/// Tunables for one build invocation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Pair-hash batch sizing.
    pub batch: BatchConfig,
    /// Hash worker pool size; `None` means one worker per core.
    /// Clamped to `1..=available cores` when set.
    pub hash_workers: Option<usize>,
    /// Upstream retry policy.
    pub retry: RetryPolicy,
    /// Concurrent in-flight requests per origin.
    pub fetch_concurrency: usize,
    /// How long the superseded root stays acceptable after a
    /// redistricting event takes effect, in days.
    pub dual_validity_days: i64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            hash_workers: None,
            retry: RetryPolicy::default(),
            fetch_concurrency: 5,
            dual_validity_days: 30,
        }
    }
}

impl BuildConfig {
    /// The effective hash worker count.
    pub fn effective_workers(&self) -> usize {
        let cores = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        match self.hash_workers {
            Some(n) => n.clamp(1, cores),
            None => cores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_tunables() {
        let c = BuildConfig::default();
        assert_eq!(c.batch.batch_size, 64);
        assert_eq!(c.fetch_concurrency, 5);
        assert_eq!(c.dual_validity_days, 30);
        assert_eq!(c.retry.attempts, 3);
    }

    #[test]
    fn worker_count_is_clamped_to_cores() {
        let mut c = BuildConfig::default();
        c.hash_workers = Some(0);
        assert!(c.effective_workers() >= 1);
        c.hash_workers = Some(usize::MAX);
        assert!(c.effective_workers() >= 1);
    }
}
