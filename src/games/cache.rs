//! TTL cache with single-flight refresh in front of the aggregation
//! pipeline.
//!
//! At most one aggregation pass runs at any time: the first caller to find
//! the entry stale (or absent) starts a refresh, and every caller arriving
//! while it is in flight attaches to the same pending result instead of
//! starting its own. A failed refresh serves the previous entry unchanged
//! ("stale") when one exists; only a failure with nothing to fall back on
//! surfaces an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use super::aggregator::Aggregator;
use super::models::DisplayRecord;
use crate::error::{CacheError, RefreshError};

/// How a response was satisfied, surfaced as the `X-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Miss,
    Stale,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Fresh => "fresh",
            CacheStatus::Miss => "miss",
            CacheStatus::Stale => "stale",
        }
    }
}

/// One materialised aggregation result.
#[derive(Debug)]
pub struct CacheEntry {
    pub records: Vec<DisplayRecord>,
    pub fetched_at: Instant,
}

type RefreshOutcome = Result<Arc<CacheEntry>, Arc<RefreshError>>;

struct Inner {
    entry: Option<Arc<CacheEntry>>,
    /// Present while a refresh is in flight; new callers subscribe instead
    /// of starting another run.
    in_flight: Option<watch::Receiver<Option<RefreshOutcome>>>,
}

/// Shared games cache. Cheap to clone; all clones share one entry and one
/// in-flight marker.
#[derive(Clone)]
pub struct GamesCache {
    aggregator: Arc<Aggregator>,
    ttl: Duration,
    refresh_timeout: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl GamesCache {
    pub fn new(aggregator: Aggregator, ttl: Duration, refresh_timeout: Duration) -> Self {
        GamesCache {
            aggregator: Arc::new(aggregator),
            ttl,
            refresh_timeout,
            inner: Arc::new(Mutex::new(Inner {
                entry: None,
                in_flight: None,
            })),
        }
    }

    /// Serve the current games list, refreshing through the aggregation
    /// pipeline when the entry has aged out.
    pub async fn get(&self) -> Result<(Arc<CacheEntry>, CacheStatus), CacheError> {
        let mut rx = {
            let mut inner = self.inner.lock().await;

            if let Some(entry) = &inner.entry {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok((Arc::clone(entry), CacheStatus::Fresh));
                }
            }

            match &inner.in_flight {
                Some(rx) => rx.clone(),
                None => {
                    let (tx, rx) = watch::channel(None);
                    inner.in_flight = Some(rx.clone());
                    let cache = self.clone();
                    // Detached so a run that outlives its callers still
                    // lands in the cache for whoever comes next.
                    tokio::spawn(async move { cache.run_refresh(tx).await });
                    rx
                }
            }
        };

        let outcome = loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                break outcome;
            }
            if rx.changed().await.is_err() {
                // Refresh task died without reporting; treat as a failed
                // refresh.
                break Err(Arc::new(RefreshError::Timeout(self.refresh_timeout)));
            }
        };

        match outcome {
            Ok(entry) => Ok((entry, CacheStatus::Miss)),
            Err(err) => {
                let inner = self.inner.lock().await;
                match &inner.entry {
                    Some(entry) => Ok((Arc::clone(entry), CacheStatus::Stale)),
                    None => Err(CacheError::Unavailable { source: err }),
                }
            }
        }
    }

    async fn run_refresh(&self, tx: watch::Sender<Option<RefreshOutcome>>) {
        let result = tokio::time::timeout(self.refresh_timeout, self.aggregator.current_games())
            .await
            .map_err(|_| RefreshError::Timeout(self.refresh_timeout))
            .and_then(|r| r.map_err(RefreshError::from));

        let outcome: RefreshOutcome = {
            let mut inner = self.inner.lock().await;
            inner.in_flight = None;
            match result {
                Ok(records) => {
                    let entry = Arc::new(CacheEntry {
                        records,
                        fetched_at: Instant::now(),
                    });
                    inner.entry = Some(Arc::clone(&entry));
                    info!("Games cache refreshed: {} records", entry.records.len());
                    Ok(entry)
                }
                Err(err) => {
                    // The previous entry, if any, stays untouched so it can
                    // be served stale.
                    warn!("Games refresh failed: {}", err);
                    Err(Arc::new(err))
                }
            }
        };

        let _ = tx.send(Some(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::games::models::{GameSummary, RawGame, TeamRef};
    use crate::games::provider::GameProvider;
    use crate::games::retry::RetryPolicy;
    use async_trait::async_trait;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct CountingProvider {
        schedule_calls: Arc<AtomicU32>,
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl GameProvider for CountingProvider {
        async fn fetch_schedule(&self) -> Result<Vec<RawGame>, ProviderError> {
            self.schedule_calls.fetch_add(1, Ordering::SeqCst);
            // Yield so concurrent callers genuinely overlap the refresh.
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(ProviderError::Http {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    url: "http://test/schedule".into(),
                });
            }
            Ok(vec![RawGame {
                id: "g1".into(),
                status: "closed".into(),
                scheduled: Some(Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap()),
                home: TeamRef::default(),
                away: TeamRef::default(),
                home_points: Some(110),
                away_points: Some(102),
            }])
        }

        async fn fetch_summary(&self, _game_id: &str) -> Result<GameSummary, ProviderError> {
            Err(ProviderError::NotFound {
                url: "http://test/summary".into(),
            })
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct Handles {
        cache: GamesCache,
        schedule_calls: Arc<AtomicU32>,
        fail: Arc<AtomicBool>,
    }

    fn build_cache(ttl: Duration) -> Handles {
        let schedule_calls = Arc::new(AtomicU32::new(0));
        let fail = Arc::new(AtomicBool::new(false));
        let provider = CountingProvider {
            schedule_calls: Arc::clone(&schedule_calls),
            fail: Arc::clone(&fail),
        };
        let aggregator = Aggregator::new(
            Arc::new(provider),
            5,
            FixedOffset::west_opt(5 * 3600).unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()),
            RetryPolicy::none(),
            RetryPolicy::none(),
        );
        Handles {
            cache: GamesCache::new(aggregator, ttl, Duration::from_secs(5)),
            schedule_calls,
            fail,
        }
    }

    #[tokio::test]
    async fn cold_start_burst_triggers_exactly_one_refresh() {
        let h = build_cache(Duration::from_secs(30));
        let mut tasks = Vec::new();
        for _ in 0..50 {
            let cache = h.cache.clone();
            tasks.push(tokio::spawn(async move { cache.get().await }));
        }
        for task in tasks {
            let (entry, status) = task.await.unwrap().unwrap();
            assert_eq!(entry.records.len(), 1);
            assert!(matches!(status, CacheStatus::Miss | CacheStatus::Fresh));
        }
        assert_eq!(h.schedule_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_entry_is_served_without_upstream_calls() {
        let h = build_cache(Duration::from_secs(30));
        let (_, first) = h.cache.get().await.unwrap();
        assert_eq!(first, CacheStatus::Miss);

        let (entry, second) = h.cache.get().await.unwrap();
        assert_eq!(second, CacheStatus::Fresh);
        assert_eq!(entry.records[0].score, "102-110 Final");
        assert_eq!(h.schedule_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_serves_stale_with_unchanged_entry() {
        let h = build_cache(Duration::ZERO);
        let (first_entry, status) = h.cache.get().await.unwrap();
        assert_eq!(status, CacheStatus::Miss);
        let first_fetched_at = first_entry.fetched_at;

        h.fail.store(true, Ordering::SeqCst);
        let (entry, status) = h.cache.get().await.unwrap();
        assert_eq!(status, CacheStatus::Stale);
        assert_eq!(entry.records, first_entry.records);
        assert_eq!(
            entry.fetched_at, first_fetched_at,
            "stale serve must not advance the entry timestamp"
        );
    }

    #[tokio::test]
    async fn cold_start_failure_surfaces_unavailable() {
        let h = build_cache(Duration::from_secs(30));
        h.fail.store(true, Ordering::SeqCst);
        let err = h.cache.get().await.unwrap_err();
        assert!(matches!(err, CacheError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn cache_recovers_after_failed_refresh() {
        let h = build_cache(Duration::ZERO);
        h.fail.store(true, Ordering::SeqCst);
        assert!(h.cache.get().await.is_err());

        h.fail.store(false, Ordering::SeqCst);
        let (entry, status) = h.cache.get().await.unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(entry.records.len(), 1);
    }

    #[tokio::test]
    async fn expired_entry_triggers_a_new_refresh() {
        let h = build_cache(Duration::ZERO);
        let (_, first) = h.cache.get().await.unwrap();
        assert_eq!(first, CacheStatus::Miss);
        let (_, second) = h.cache.get().await.unwrap();
        assert_eq!(second, CacheStatus::Miss);
        assert_eq!(h.schedule_calls.load(Ordering::SeqCst), 2);
    }
}
